//! WebSocket echo protocol.
//!
//! Every text frame received from a client is answered with one text frame
//! carrying the configured prefix followed by the original payload:
//!
//! ```text
//! Client:  hello
//! Server:  Echo: hello
//! ```
//!
//! ## Connection Lifecycle
//!
//! A handler has two states. It starts **Open** once the upgrade handshake
//! completes and waits for the next frame; each text frame is logged and
//! answered before the following frame is read, so replies on one
//! connection keep the order of the requests. When the peer closes the
//! connection (close frame, end of stream, or reset) the handler moves to
//! **Closed** and returns.
//!
//! Binary frames are answered the same way, with the payload rendered as a
//! bytes literal (`b'hi'`). Ping and pong frames produce no reply; pings are
//! still answered with pongs by the protocol layer.
//!
//! ## Standard Output
//!
//! Written to the console handle given to the handler (stdout in the
//! server). Write failures are traced and otherwise ignored.
//!
//! ```text
//! Client connected!
//! Received: hello
//! Client disconnected
//! ```

pub mod frame;
pub mod handler;

pub use handler::{handle_connection, EchoSettings};
