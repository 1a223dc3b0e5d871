use std::collections::VecDeque;
use std::io;
use std::net::TcpStream;
use std::thread::{self, JoinHandle};

use match_protocol::channel::MessageChannel;
use match_protocol::console::Console;
use match_protocol::error::ProtocolError;
use match_protocol::message::Message;
use match_protocol::{GameClient, GameServer, MatchOutcome};

/*
    End-to-end sessions over real sockets. Both client streams are connected
    up front from the test thread, so the accept order (and with it who is
    player 1) is deterministic.
 */

/// Console fed from a script instead of an operator.
struct ScriptedConsole {
    inputs: VecDeque<String>,
    seen: Vec<String>,
}

impl ScriptedConsole {
    fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            seen: Vec::new(),
        }
    }
}

impl Console for ScriptedConsole {
    fn prompt_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn prompt_int(&mut self, prompt: &str) -> io::Result<u32> {
        let line = self.prompt_line(prompt)?;
        line.trim()
            .parse()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-numeric script entry"))
    }

    fn display(&mut self, text: &str) {
        self.seen.push(text.to_string());
    }
}

type ClientRun = (Result<(), ProtocolError>, Vec<String>);

fn spawn_client(stream: TcpStream, inputs: &[&str]) -> JoinHandle<ClientRun> {
    let mut console = ScriptedConsole::new(inputs);
    thread::spawn(move || {
        let mut client = GameClient::new(stream);
        let result = client.run(&mut console);
        (result, console.seen)
    })
}

fn rendered(board: &str, size: usize) -> String {
    let rail = "=".repeat(size * 5);
    format!("{rail}{board}{rail}")
}

#[test]
fn a_completed_row_ends_the_session_with_the_winner_named() {
    let server = GameServer::bind(0).unwrap();
    let addr = server.local_addr().unwrap();

    let first = TcpStream::connect(addr).unwrap();
    let second = TcpStream::connect(addr).unwrap();

    let server_thread = thread::spawn(move || {
        let mut console = ScriptedConsole::new(&["3"]);
        server.run(&mut console)
    });

    // Alice takes the whole top row while Bob answers in the middle row.
    let alice = spawn_client(first, &["alice", "1", "2", "3"]);
    let bob = spawn_client(second, &["bob", "4", "5"]);

    let outcome = server_thread.join().unwrap().unwrap();
    assert_eq!(outcome, MatchOutcome::Win { winner: "alice".to_string() });

    let (result, seen) = alice.join().unwrap();
    result.unwrap();
    assert!(seen.contains(&"you are player 1: alice playing X".to_string()));
    assert!(seen.contains(&rendered(
        "\n - | - | - \n------------\n - | - | - \n------------\n - | - | - \n",
        3,
    )));
    assert!(seen.contains(&"alice won the game!!".to_string()));

    let (result, seen) = bob.join().unwrap();
    result.unwrap();
    assert!(seen.contains(&"you are player 2: bob playing O".to_string()));
    assert!(seen.contains(&"waiting for alice's move..".to_string()));
    assert!(seen.contains(&"alice won the game!!".to_string()));
}

#[test]
fn a_full_board_without_a_line_is_announced_as_a_tie() {
    let server = GameServer::bind(0).unwrap();
    let addr = server.local_addr().unwrap();

    let first = TcpStream::connect(addr).unwrap();
    let second = TcpStream::connect(addr).unwrap();

    let server_thread = thread::spawn(move || {
        let mut console = ScriptedConsole::new(&["3"]);
        server.run(&mut console)
    });

    // Nine alternating moves that never complete a line:
    //   X O X
    //   X O O
    //   O X X
    let alice = spawn_client(first, &["alice", "1", "4", "8", "9", "3"]);
    let bob = spawn_client(second, &["bob", "2", "5", "6", "7"]);

    let outcome = server_thread.join().unwrap().unwrap();
    assert_eq!(outcome, MatchOutcome::Tie);

    for handle in [alice, bob] {
        let (result, seen) = handle.join().unwrap();
        result.unwrap();
        assert!(seen.contains(&"damn, it's a tie..".to_string()));
    }
}

#[test]
fn out_of_range_choices_are_re_prompted_without_touching_the_board() {
    let server = GameServer::bind(0).unwrap();
    let addr = server.local_addr().unwrap();

    let first = TcpStream::connect(addr).unwrap();
    let second = TcpStream::connect(addr).unwrap();

    let server_thread = thread::spawn(move || {
        let mut console = ScriptedConsole::new(&["3"]);
        server.run(&mut console)
    });

    // Alice tries 0 and 10 (both off the board) before playing the center,
    // then wins on the anti-diagonal 3-5-7.
    let alice = spawn_client(first, &["alice", "0", "10", "5", "3", "7"]);
    let bob = spawn_client(second, &["bob", "1", "2"]);

    let outcome = server_thread.join().unwrap().unwrap();
    assert_eq!(outcome, MatchOutcome::Win { winner: "alice".to_string() });

    let (result, seen) = alice.join().unwrap();
    result.unwrap();

    let rejections = seen
        .iter()
        .filter(|line| *line == "invalid choice, please enter a valid choice\n")
        .count();
    assert_eq!(rejections, 2);

    // The first board broadcast after the retries shows exactly the one
    // accepted move; the rejected choices never touched the grid.
    let empty = rendered(
        "\n - | - | - \n------------\n - | - | - \n------------\n - | - | - \n",
        3,
    );
    let after_first_move = rendered(
        "\n - | - | - \n------------\n - | X | - \n------------\n - | - | - \n",
        3,
    );
    let boards: Vec<&String> = seen.iter().filter(|line| line.contains('|')).collect();
    assert_eq!(boards[0], &empty);
    assert_eq!(boards[1], &after_first_move);

    let (result, _) = bob.join().unwrap();
    result.unwrap();
}

#[test]
fn a_mid_match_disconnect_aborts_the_session_with_a_notice() {
    let server = GameServer::bind(0).unwrap();
    let addr = server.local_addr().unwrap();

    let dropper = TcpStream::connect(addr).unwrap();
    let survivor = TcpStream::connect(addr).unwrap();

    let server_thread = thread::spawn(move || {
        let mut console = ScriptedConsole::new(&["3"]);
        server.run(&mut console)
    });

    // The first player onboards by hand, then vanishes instead of moving.
    let dropper_thread = thread::spawn(move || {
        let mut channel = MessageChannel::new(dropper);
        loop {
            match channel.receive().unwrap() {
                Message::Name { .. } => {
                    channel.send(&Message::NameReply { name: "ghost".to_string() }).unwrap();
                }
                Message::Choice { .. } => break,
                _ => {}
            }
        }
    });

    let survivor_thread = spawn_client(survivor, &["bob"]);

    match server_thread.join().unwrap() {
        Err(ProtocolError::ChannelClosed) => {}
        other => panic!("expected ChannelClosed, got {other:?}"),
    }
    dropper_thread.join().unwrap();

    // The surviving peer got the best-effort notice and terminated cleanly.
    let (result, seen) = survivor_thread.join().unwrap();
    result.unwrap();
    assert!(seen.iter().any(|line| line.contains("session aborted")));
}
