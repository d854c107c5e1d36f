//! Command-line interface for ttto_server.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ttto_server::{RejectionPolicy, ServerConfig};

/// ttto relay server - rooms and move validation for networked tic-tac-toe
#[derive(Parser, Debug)]
#[command(name = "ttto_server")]
#[command(about = "Relay server for networked grid tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the relay server
    Serve(Overrides),

    /// Print the effective configuration as TOML and exit
    Config(Overrides),
}

/// Settings that override the config file and environment.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Whether refused moves get an error reply
    #[arg(long, value_enum)]
    pub rejection_policy: Option<RejectionPolicy>,

    /// Maximum number of live rooms
    #[arg(long)]
    pub max_rooms: Option<usize>,
}

impl Overrides {
    /// Layers the flags over `config`.
    pub fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config = config.with_host(host);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(policy) = self.rejection_policy {
            config = config.with_rejection_policy(policy);
        }
        if let Some(max_rooms) = self.max_rooms {
            config = config.with_max_rooms(max_rooms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "ttto_server",
            "serve",
            "--port",
            "9000",
            "--rejection-policy",
            "notify",
        ]);
        let Command::Serve(overrides) = cli.command else {
            panic!("expected serve");
        };
        let config = overrides.apply(ServerConfig::default().with_max_rooms(7));
        assert_eq!(*config.port(), 9000);
        assert_eq!(*config.rejection_policy(), RejectionPolicy::Notify);
        assert_eq!(*config.max_rooms(), 7);
        assert_eq!(config.host(), "127.0.0.1");
    }
}
