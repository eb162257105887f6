//! Configuration module for the echo-socket server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values, and everything
//! has a default so the server runs with no arguments at all.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for the echo server
#[derive(Parser, Debug, Default)]
#[command(name = "echo-socket")]
#[command(author = "echo-socket authors")]
#[command(version = "0.1.0")]
#[command(about = "A WebSocket echo server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 0.0.0.0:81)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Number of worker threads (single-threaded runtime when unset)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Text prepended to every echoed message
    #[arg(long)]
    pub prefix: Option<String>,

    /// Largest accepted message in bytes
    #[arg(long)]
    pub max_message_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub echo: EchoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Number of worker threads
    pub workers: Option<usize>,
    /// Pending connection queue length passed to listen(2)
    #[serde(default = "default_backlog")]
    pub backlog: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            workers: None,
            backlog: default_backlog(),
        }
    }
}

/// Echo behaviour configuration
#[derive(Debug, Deserialize)]
pub struct EchoConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            max_message_size: default_max_message_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:81".to_string()
}

fn default_backlog() -> i32 {
    1024
}

fn default_prefix() -> String {
    "Echo: ".to_string()
}

fn default_max_message_size() -> usize {
    1 << 20 // 1 MiB
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub backlog: i32,
    pub workers: Option<usize>,
    pub prefix: String,
    pub max_message_size: usize,
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process arguments and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Merge parsed CLI args with the TOML file they point at, if any.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let listen = cli.listen.unwrap_or(toml_config.server.listen);
        let listen = listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(listen))?;

        Ok(Config {
            listen,
            backlog: toml_config.server.backlog,
            // Zero workers means the single-threaded runtime.
            workers: cli
                .workers
                .or(toml_config.server.workers)
                .filter(|&n| n > 0),
            prefix: cli.prefix.unwrap_or(toml_config.echo.prefix),
            max_message_size: cli
                .max_message_size
                .unwrap_or(toml_config.echo.max_message_size),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    InvalidListen(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidListen(addr) => {
                write!(f, "Invalid listen address '{addr}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli() -> CliArgs {
        CliArgs {
            log_level: "info".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_args(cli()).unwrap();
        assert_eq!(config.listen, "0.0.0.0:81".parse().unwrap());
        assert_eq!(config.prefix, "Echo: ");
        assert_eq!(config.workers, None);
        assert_eq!(config.backlog, 1024);
        assert_eq!(config.max_message_size, 1024 * 1024);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen = "127.0.0.1:9001"
            workers = 4
            backlog = 128

            [echo]
            prefix = "> "
            max_message_size = 4096

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9001");
        assert_eq!(config.server.workers, Some(4));
        assert_eq!(config.server.backlog, 128);
        assert_eq!(config.echo.prefix, "> ");
        assert_eq!(config.echo.max_message_size, 4096);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str("[echo]\nprefix = \"re: \"\n").unwrap();
        assert_eq!(config.echo.prefix, "re: ");
        assert_eq!(config.server.listen, "0.0.0.0:81");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_overrides_file() {
        let path = std::env::temp_dir().join(format!("echo-socket-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nlisten = \"127.0.0.1:7000\"\nworkers = 2").unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();

        let config = Config::from_args(CliArgs {
            config: Some(path.clone()),
            listen: Some("127.0.0.1:7001".to_string()),
            ..cli()
        })
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.listen, "127.0.0.1:7001".parse().unwrap());
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_zero_workers_is_single_threaded() {
        let config = Config::from_args(CliArgs {
            workers: Some(0),
            ..cli()
        })
        .unwrap();
        assert_eq!(config.workers, None);
    }

    #[test]
    fn test_invalid_listen() {
        let err = Config::from_args(CliArgs {
            listen: Some("not-an-address".to_string()),
            ..cli()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListen(ref a) if a == "not-an-address"));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_args(CliArgs {
            config: Some(PathBuf::from("/nonexistent/echo-socket.toml")),
            ..cli()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(..)));
    }
}
