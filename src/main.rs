//! echo-socket: A WebSocket echo server
//!
//! Every text message a client sends is printed and answered with a copy
//! prefixed by `"Echo: "`.
//!
//! Features:
//! - One independent task per connection, replies kept in request order
//! - Listens on 0.0.0.0:81 by default
//! - Configuration via CLI arguments or TOML file

mod config;
mod echo;
mod server;

use config::Config;
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging. Standard output carries the connection log lines.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(
        listen = %config.listen,
        workers = ?config.workers,
        prefix = %config.prefix,
        max_message_size = config.max_message_size,
        "Starting echo-socket server"
    );

    let runtime = build_runtime(config.workers)?;
    runtime.block_on(async {
        let server = Server::bind(&config)?;
        server.run().await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Single-threaded scheduler unless a worker count is configured.
fn build_runtime(workers: Option<usize>) -> std::io::Result<tokio::runtime::Runtime> {
    match workers {
        Some(n) => {
            info!(workers = n, "Using multi-thread runtime");
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(n)
                .enable_all()
                .build()
        }
        None => {
            info!("Using current-thread runtime");
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
        }
    }
}
