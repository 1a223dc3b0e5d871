use std::io::{self, Read, Write};
use std::str;

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::error::{ProtocolError, Result};
use crate::message::Message;

/// Width of the ASCII decimal length prefix on every frame.
pub const HEADER_SIZE: usize = 10;

/// Turns a raw byte stream into discrete messages in both directions.
///
/// Every frame is a length prefix of [`HEADER_SIZE`] ASCII digits,
/// left-justified and space-padded, followed by that many payload bytes.
/// The payload is the JSON form of a [`Message`].
pub struct MessageChannel<S> {
    stream: S,
}

impl<S> MessageChannel<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: Read + Write> MessageChannel<S> {
    pub fn send(&mut self, message: &Message) -> Result<()> {
        let payload = serde_json::to_vec(message)?;
        let header = format!("{:<width$}", payload.len(), width = HEADER_SIZE);
        trace!(kind = message.kind(), bytes = payload.len(), "sending frame");

        self.stream.write_all(header.as_bytes()).map_err(closed_or_io)?;
        self.stream.write_all(&payload).map_err(closed_or_io)?;
        self.stream.flush().map_err(closed_or_io)?;
        Ok(())
    }

    /// Blocks until one whole frame has been read, then decodes it.
    ///
    /// `read_exact` keeps retrying short reads until the target length is
    /// reached; a read of zero bytes before that surfaces as `UnexpectedEof`
    /// and is reported as `ChannelClosed`. A prefix that does not parse as a
    /// decimal length is treated the same way, since the stream can no
    /// longer be framed after it.
    pub fn receive(&mut self) -> Result<Message> {
        let mut header = [0u8; HEADER_SIZE];
        self.stream.read_exact(&mut header).map_err(closed_or_io)?;

        let length: usize = str::from_utf8(&header)
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .ok_or(ProtocolError::ChannelClosed)?;

        let mut payload = vec![0u8; length];
        self.stream.read_exact(&mut payload).map_err(closed_or_io)?;

        let message = decode(&payload)?;
        trace!(kind = message.kind(), bytes = length, "received frame");
        Ok(message)
    }
}

// Tells a torn-down connection apart from other socket failures.
fn closed_or_io(error: io::Error) -> ProtocolError {
    match error.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => ProtocolError::ChannelClosed,
        _ => ProtocolError::Io(error),
    }
}

// Decode a payload, rejecting tags outside the vocabulary explicitly
// instead of folding them into a generic parse failure.
fn decode(payload: &[u8]) -> Result<Message> {
    let value: Value = serde_json::from_slice(payload)?;

    if let Some(kind) = value.get("kind").and_then(Value::as_str) {
        if !Message::is_known_kind(kind) {
            return Err(ProtocolError::UnknownMessageKind(kind.to_string()));
        }
    }

    Message::deserialize(&value).map_err(ProtocolError::from)
}
