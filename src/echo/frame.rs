//! Frame classification for the echo handler.

use std::io::ErrorKind;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error, Message};

/// What the handler does with one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reply to a payload, rendered as text.
    Echo(String),
    /// No reply. `kind` names the frame for logging.
    Ignore { kind: &'static str },
    /// The peer sent a close frame.
    Close,
}

/// Decide how to handle an inbound message.
pub fn classify(message: Message) -> Action {
    match message {
        Message::Text(text) => Action::Echo(text),
        Message::Binary(data) => Action::Echo(bytes_repr(&data)),
        Message::Ping(_) => Action::Ignore { kind: "ping" },
        Message::Pong(_) => Action::Ignore { kind: "pong" },
        Message::Frame(_) => Action::Ignore { kind: "frame" },
        Message::Close(_) => Action::Close,
    }
}

/// Build the reply for a text payload.
pub fn echo_reply(prefix: &str, message: &str) -> String {
    let mut reply = String::with_capacity(prefix.len() + message.len());
    reply.push_str(prefix);
    reply.push_str(message);
    reply
}

/// Render a binary payload as a bytes literal, e.g. `b'hi\x00'`.
///
/// Single quotes are used unless the payload contains `'` and no `"`.
pub fn bytes_repr(data: &[u8]) -> String {
    let quote = if data.contains(&b'\'') && !data.contains(&b'"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(data.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in data {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if b as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push(quote);
    out
}

/// Whether an error means the peer went away rather than a real fault.
///
/// Covers a completed close handshake, a drop without one, and the socket
/// level resets seen when a client disappears mid-write.
pub fn is_closed_signal(err: &Error) -> bool {
    match err {
        Error::ConnectionClosed | Error::AlreadyClosed => true,
        Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => true,
        Error::Io(e) => matches!(
            e.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}
