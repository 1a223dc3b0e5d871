use std::io;
use thiserror::Error;

/// Errors produced by the match protocol.
///
/// `InvalidMove` is the only recoverable variant: the orchestrator answers
/// it with an `error` message and re-prompts the same player. Everything
/// else ends the session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("peer closed the connection")]
    ChannelClosed,

    #[error("invalid move: choice {choice} is out of range or targets a taken cell")]
    InvalidMove { choice: u32 },

    #[error("unrecognized message kind `{0}`")]
    UnknownMessageKind(String),

    #[error("message kind `{0}` is not valid at this point in the session")]
    UnexpectedMessage(&'static str),

    #[error("malformed message payload: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
