//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::SessionSettings;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "lazy-sleep")]
#[command(about = "Schedule a delayed shutdown and watch it count down")]
#[command(version)]
pub struct Config {
    /// Port for the control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the saved theme (defaults to the user config dir)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Log shutdown commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds before an unanswered confirmation counts as "no"
    #[arg(long, default_value = "60")]
    pub prompt_timeout: u64,

    /// Seconds to wait after the countdown expires before returning to idle
    #[arg(long, default_value = "120")]
    pub fire_grace: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lazy-sleep")
        })
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            fire_grace: Duration::from_secs(self.fire_grace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["lazy-sleep"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert!(!config.dry_run);
        assert_eq!(config.prompt_timeout(), Duration::from_secs(60));
        assert_eq!(config.session_settings().fire_grace, Duration::from_secs(120));
        assert!(config.config_dir().ends_with("lazy-sleep"));
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "lazy-sleep", "-p", "9000", "--dry-run", "--fire-grace", "5", "--config-dir", "/tmp/ls", "-v",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.dry_run);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.session_settings().fire_grace, Duration::from_secs(5));
        assert_eq!(config.config_dir(), PathBuf::from("/tmp/ls"));
    }
}
