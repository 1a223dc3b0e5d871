pub use client::GameClient;
pub use server::{GameServer, MatchOutcome};
pub mod channel;
pub mod console;
pub mod error;
pub mod game;
pub mod message;

mod client;
mod server;
