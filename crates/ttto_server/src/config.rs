//! Server configuration.
//!
//! Values come from an optional TOML file, then the `PORT` environment
//! variable, then command-line flags, each layer overriding the last.

use crate::error::ConfigError;
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// What a participant hears when its in-room request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RejectionPolicy {
    /// Refused moves, restarts and resizes are dropped without a reply.
    #[default]
    Silent,
    /// The requester alone gets an `error_message`.
    Notify,
}

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    #[setters(into)]
    host: String,

    /// Port to bind.
    port: u16,

    /// Reply behaviour for refused in-room requests.
    rejection_policy: RejectionPolicy,

    /// Cap on simultaneously live rooms.
    max_rooms: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            rejection_policy: RejectionPolicy::default(),
            max_rooms: 1024,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    ///
    /// Keys missing from the file keep their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            host = %config.host,
            port = config.port,
            policy = ?config.rejection_policy,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Applies a `PORT` value from the environment.
    ///
    /// Unparseable values are logged and ignored.
    #[instrument(skip(self))]
    pub fn with_port_var(self, value: Option<String>) -> Self {
        let Some(raw) = value else {
            return self;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => {
                debug!(port, "Port taken from environment");
                self.with_port(port)
            }
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring unparseable PORT");
                self
            }
        }
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
