use std::fmt;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::channel::MessageChannel;
use crate::console::Console;
use crate::error::{ProtocolError, Result};
use crate::game::{Mark, Match, Turn};
use crate::message::{Message, PlayerInfo};

/*
    The session orchestrator. One sequential control flow owns both player
    channels and the match: onboard two players in connection order, take
    the board size from the local operator, then alternate turns until a win
    or a tie ends the session. The idle connection is only ever written to,
    never read from, during a turn.
 */

/// A registered player: identity plus the owned channel to its socket.
/// The peer address is kept for diagnostics only.
struct Player {
    id: u8,
    name: String,
    sign: Mark,
    channel: MessageChannel<TcpStream>,
    addr: SocketAddr,
}

impl Player {
    fn info(&self) -> PlayerInfo {
        PlayerInfo { id: self.id, name: self.name.clone(), sign: self.sign }
    }
}

/// How a completed session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Win { winner: String },
    Tie,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Win { winner } => write!(f, "{winner} won"),
            MatchOutcome::Tie => write!(f, "tie"),
        }
    }
}

pub struct GameServer {
    listener: TcpListener,
    move_timeout: Option<Duration>,
}

impl GameServer {
    /// Binds on all interfaces. Port 0 asks the OS for an ephemeral port;
    /// `local_addr` reports the one chosen.
    pub fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        info!(addr = %listener.local_addr()?, "server is ready");
        Ok(Self { listener, move_timeout: None })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Bounds every read from a player socket. Expiry is fatal to the
    /// session, like any other failed read. Defaults to unbounded, matching
    /// the protocol's blocking turn-taking contract.
    pub fn with_move_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.move_timeout = timeout;
        self
    }

    /// Runs one full session and reports how the match ended.
    pub fn run(&self, console: &mut dyn Console) -> Result<MatchOutcome> {
        let session = Uuid::new_v4();
        info!(%session, "waiting for two players");

        let mut first = self.onboard_player(1)?;
        let second = match self.onboard_player(2) {
            Ok(player) => player,
            Err(err) => {
                error!(%session, %err, "onboarding failed");
                abort_player(&mut first);
                return Err(err);
            }
        };
        let mut players = [first, second];

        match self.run_match(&mut players, console) {
            Ok(outcome) => {
                info!(%session, %outcome, "game over");
                Ok(outcome)
            }
            Err(err) => {
                error!(%session, %err, "session aborted");
                for player in players.iter_mut() {
                    abort_player(player);
                }
                Err(err)
            }
        }
    }

    // Accepts the next connection in order and negotiates its identity.
    // After the second player no further connections are accepted.
    fn onboard_player(&self, id: u8) -> Result<Player> {
        let (stream, addr) = self.listener.accept()?;
        if let Some(timeout) = self.move_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }
        let mut channel = MessageChannel::new(stream);

        channel.send(&Message::Name { prompt: format!("Enter player {id} name: ") })?;
        let name = match channel.receive()? {
            Message::NameReply { name } => name,
            other => return Err(ProtocolError::UnexpectedMessage(other.kind())),
        };

        let mut player = Player { id, name, sign: Mark::for_player(id), channel, addr };
        info!(player = %player.name, addr = %player.addr, "player connected");

        let announcement = Message::Player { player: player.info() };
        player.channel.send(&announcement)?;
        Ok(player)
    }

    fn run_match(
        &self,
        players: &mut [Player; 2],
        console: &mut dyn Console,
    ) -> Result<MatchOutcome> {
        let size = loop {
            let size = console.prompt_int("Enter the board size: ")?;
            if size >= 1 {
                break size;
            }
            console.display("board size must be at least 1");
        };
        let mut game = Match::new(size as usize);

        broadcast(players, &Message::Board { board: game.render(), size })?;

        loop {
            let (cur, idle) = match game.turn() {
                Turn::PlayerOne => (0, 1),
                Turn::PlayerTwo => (1, 0),
            };

            let prompt =
                format!("{}'s turn\nChoose (1-{}): ", players[cur].name, game.cell_count());
            players[cur].channel.send(&Message::Choice { prompt: prompt.clone() })?;
            players[idle].channel.send(&Message::Info {
                prompt: format!("waiting for {}'s move..", players[cur].name),
            })?;

            // Only the current player's channel is read. Invalid choices are
            // answered inline; the idle player is not re-notified.
            loop {
                let choice = match players[cur].channel.receive()? {
                    Message::ChoiceReply { choice } => choice,
                    other => return Err(ProtocolError::UnexpectedMessage(other.kind())),
                };
                match game.try_apply(choice, players[cur].sign) {
                    Ok(()) => break,
                    Err(ProtocolError::InvalidMove { choice }) => {
                        warn!(player = %players[cur].name, choice, "rejected move");
                        players[cur].channel.send(&Message::Error {
                            prompt: prompt.clone(),
                            message: "invalid choice, please enter a valid choice\n".to_string(),
                        })?;
                    }
                    Err(other) => return Err(other),
                }
            }

            broadcast(players, &Message::Board { board: game.render(), size })?;

            // Win takes precedence over tie: a winning final move is a win
            // even though it also fills the board.
            if game.check_win(players[cur].sign) {
                let message = format!("{} won the game!!", players[cur].name);
                broadcast(players, &Message::Result { message })?;
                return Ok(MatchOutcome::Win { winner: players[cur].name.clone() });
            }
            if game.check_tie() {
                broadcast(players, &Message::Result {
                    message: "damn, it's a tie..".to_string(),
                })?;
                return Ok(MatchOutcome::Tie);
            }
            game.switch_turn();
        }
    }
}

fn broadcast(players: &mut [Player; 2], message: &Message) -> Result<()> {
    for player in players.iter_mut() {
        player.channel.send(message)?;
    }
    Ok(())
}

// Best-effort notice so a surviving peer is not left blocking on a dead
// session. The write is bounded by a short timeout and failures are ignored.
fn abort_player(player: &mut Player) {
    let _ = player.channel.get_ref().set_write_timeout(Some(Duration::from_secs(1)));
    let _ = player.channel.send(&Message::Result {
        message: "session aborted: the match cannot continue".to_string(),
    });
}
