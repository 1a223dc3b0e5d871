use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::channel::MessageChannel;
use crate::console::Console;
use crate::error::{ProtocolError, Result};
use crate::message::Message;

/*
    The client side of a session: a single sequential loop that receives one
    message, reacts to it through the local console, and replies when the
    kind calls for one, until a result message ends the match.
 */

pub struct GameClient<S> {
    channel: MessageChannel<S>,
}

impl GameClient<TcpStream> {
    /// Connects to a server and wraps the socket in a framed channel.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        info!(peer = %stream.peer_addr()?, "connected");
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> GameClient<S> {
    pub fn new(stream: S) -> Self {
        Self { channel: MessageChannel::new(stream) }
    }

    /// Runs the receive/react loop until the server announces a result.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<()> {
        loop {
            match self.channel.receive()? {
                Message::Name { prompt } => {
                    let name = console.prompt_line(&prompt)?;
                    self.channel.send(&Message::NameReply { name })?;
                }
                Message::Player { player } => {
                    console.display(&format!(
                        "you are player {}: {} playing {}",
                        player.id, player.name, player.sign
                    ));
                }
                Message::Board { board, size } => {
                    let rail = "=".repeat(size as usize * 5);
                    console.display(&format!("{rail}{board}{rail}"));
                }
                Message::Choice { prompt } => self.reply_with_choice(&prompt, console)?,
                Message::Error { prompt, message } => {
                    // An error shares the choice reply path: show the
                    // explanation, then answer the fresh prompt.
                    console.display(&message);
                    self.reply_with_choice(&prompt, console)?;
                }
                Message::Info { prompt } => console.display(&prompt),
                Message::Result { message } => {
                    console.display(&message);
                    debug!("session over");
                    return Ok(());
                }
                // Reply kinds only ever travel toward the server.
                other => return Err(ProtocolError::UnexpectedMessage(other.kind())),
            }
        }
    }

    fn reply_with_choice(&mut self, prompt: &str, console: &mut dyn Console) -> Result<()> {
        let choice = console.prompt_int(prompt)?;
        self.channel.send(&Message::ChoiceReply { choice })
    }
}
