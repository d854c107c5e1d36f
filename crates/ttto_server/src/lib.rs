//! Relay server for networked grid tic-tac-toe.
//!
//! The server owns every networked game. Clients connect over WebSocket,
//! exchange the JSON messages defined in [`ttto_game::ClientMessage`] and
//! [`ttto_game::ServerMessage`], and only ever see moves the server has
//! validated.
//!
//! # Architecture
//!
//! - **Registry**: live rooms, seat assignment and move validation
//! - **Relay**: routes frames from connections into the registry and back
//! - **Server**: axum router with the WebSocket endpoint and a room listing
//! - **Config**: TOML file, environment and flag layering
//!
//! # Example
//!
//! ```no_run
//! use ttto_server::{Relay, ServerConfig, run};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//! run(listener, Relay::new(&config)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod registry;
mod relay;
mod server;

pub use config::{RejectionPolicy, ServerConfig};
pub use error::{ConfigError, RegistryError};
pub use registry::{Outbound, ParticipantId, Room, RoomRegistry, RoomState, RoomSummary};
pub use relay::Relay;
pub use server::{router, run};
