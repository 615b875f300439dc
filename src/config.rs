//! Process configuration.
//!
//! Every option is a command-line flag with an environment variable
//! fallback, so the same binary runs from a shell or a container.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Address to bind the HTTP listener to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// HTTP port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Deadline applied to every HTTP request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub database: DatabaseConfig,
}

impl Config {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.bind, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Connection pool settings. Kept small: SQLite serializes writers anyway.
#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// Database connection string
    #[arg(long = "database-url", env = "DB_URL", default_value = "sqlite:mini-ledger.db?mode=rwc")]
    pub url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    #[arg(long, env = "DB_MIN_CONNECTIONS", default_value_t = 2)]
    pub min_connections: u32,

    #[arg(long, env = "DB_IDLE_TIMEOUT_SECS", default_value_t = 300)]
    pub idle_timeout_secs: u64,

    #[arg(long, env = "DB_MAX_LIFETIME_SECS", default_value_t = 1800)]
    pub max_lifetime_secs: u64,

    /// How long a caller waits for a free connection before failing
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 2)]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Defaults for a database at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
            acquire_timeout_secs: 2,
        }
    }

    /// Defaults for a SQLite file at `path`, created on first use.
    pub fn sqlite_file(path: &str) -> Self {
        Self::new(format!("sqlite:{}?mode=rwc", path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["mini-ledger"]).unwrap();
        assert_eq!(cli.config.request_timeout(), Duration::from_secs(10));
        assert_eq!(cli.config.database.max_connections, 10);
        assert_eq!(cli.config.database.acquire_timeout_secs, 2);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "mini-ledger",
            "--port",
            "9090",
            "--database-url",
            "sqlite::memory:",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.config.port, 9090);
        assert_eq!(cli.config.database.url, "sqlite::memory:");
        assert_eq!(cli.config.log_format, LogFormat::Json);
        assert_eq!(
            cli.config.listen_addr().unwrap().to_string(),
            "0.0.0.0:9090"
        );
    }
}
