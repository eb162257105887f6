//! Echo protocol handler for the Tokio runtime.

use futures_util::{SinkExt, StreamExt};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async_with_config, WebSocketStream};
use tracing::{debug, trace};

use super::frame::{classify, echo_reply, is_closed_signal, Action};
use crate::config::Config;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Per-connection echo settings, shared read-only by every handler.
#[derive(Debug, Clone)]
pub struct EchoSettings {
    /// Text prepended to each reply.
    pub prefix: String,
    /// Largest message the protocol layer will assemble.
    pub max_message_size: usize,
}

impl EchoSettings {
    fn websocket_config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(self.max_message_size);
        config.max_frame_size = Some(self.max_message_size);
        config
    }
}

impl From<&Config> for EchoSettings {
    fn from(config: &Config) -> Self {
        Self {
            prefix: config.prefix.clone(),
            max_message_size: config.max_message_size,
        }
    }
}

/// Handle a WebSocket connection: upgrade the stream, then echo until the
/// peer goes away. Connection lines are written to `console`.
pub async fn handle_connection<S, W>(
    stream: S,
    peer: SocketAddr,
    settings: Arc<EchoSettings>,
    console: W,
) -> HandlerResult
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    let ws = accept_async_with_config(stream, Some(settings.websocket_config())).await?;
    debug!(%peer, "WebSocket handshake complete");

    serve_websocket(ws, peer, &settings, console).await
}

/// Run the echo loop on an upgraded connection.
///
/// Returns `Ok(())` when the peer closes the connection. Any other failure
/// is returned as an error and ends the loop.
pub async fn serve_websocket<S, W>(
    mut ws: WebSocketStream<S>,
    peer: SocketAddr,
    settings: &EchoSettings,
    mut console: W,
) -> HandlerResult
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    emit(&mut console, peer, "Client connected!");

    loop {
        let message = match ws.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) if is_closed_signal(&e) => {
                trace!(%peer, error = %e, "Transport closed");
                break;
            }
            Some(Err(e)) => return Err(e.into()),
            None => break,
        };

        match classify(message) {
            Action::Echo(text) => {
                emit(&mut console, peer, &format!("Received: {text}"));
                trace!(%peer, len = text.len(), "Echoing message");

                let reply = Message::text(echo_reply(&settings.prefix, &text));
                match ws.send(reply).await {
                    Ok(()) => {}
                    Err(e) if is_closed_signal(&e) => {
                        trace!(%peer, error = %e, "Transport closed during send");
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Action::Ignore { kind } => {
                debug!(%peer, kind, "Ignoring control frame");
            }
            Action::Close => {
                // Flushes the close reply queued by the protocol layer.
                if let Err(e) = ws.close(None).await {
                    trace!(%peer, error = %e, "Close reply not sent");
                }
                break;
            }
        }
    }

    emit(&mut console, peer, "Client disconnected");
    debug!(%peer, "Connection closed");
    Ok(())
}

/// Write one connection line. A closed or broken console never ends the
/// connection.
fn emit<W: Write>(console: &mut W, peer: SocketAddr, line: &str) {
    if let Err(e) = writeln!(console, "{line}").and_then(|()| console.flush()) {
        trace!(%peer, error = %e, "Console write failed");
    }
}
