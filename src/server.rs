//! TCP server for accepting WebSocket echo connections.
//!
//! Binds the listening socket once at startup and spawns an independent
//! task per accepted client. Handlers share nothing but read-only
//! settings, so a failing connection never affects the others.

use crate::config::Config;
use crate::echo::{handle_connection, EchoSettings};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Server instance
pub struct Server {
    listener: TcpListener,
    settings: Arc<EchoSettings>,
}

impl Server {
    /// Bind the listening socket described by `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let listener = create_listener(config.listen, config.backlog)?;
        let listener = TcpListener::from_std(listener)?;
        info!(address = %listener.local_addr()?, "Server listening");

        Ok(Server {
            listener,
            settings: Arc::new(EchoSettings::from(config)),
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the process exits.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "New connection");

                    let settings = Arc::clone(&self.settings);

                    tokio::spawn(async move {
                        let console = std::io::stdout();
                        if let Err(e) = handle_connection(stream, peer, settings, console).await {
                            debug!(%peer, error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Create a non-blocking TCP listener with address reuse enabled.
fn create_listener(addr: SocketAddr, backlog: i32) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}
