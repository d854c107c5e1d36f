//! ttto relay server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, Overrides};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ttto_server::{Relay, ServerConfig, run};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(overrides) => serve(resolve(overrides)?).await,
        Command::Config(overrides) => {
            print!("{}", toml::to_string(&resolve(overrides)?)?);
            Ok(())
        }
    }
}

/// Config file, then `PORT`, then flags.
fn resolve(overrides: Overrides) -> Result<ServerConfig> {
    let config = ServerConfig::load(overrides.config.as_deref())?
        .with_port_var(std::env::var("PORT").ok());
    Ok(overrides.apply(config))
}

/// Run the relay server
async fn serve(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ttto_server=debug")),
        )
        .init();

    info!(
        policy = ?config.rejection_policy(),
        max_rooms = config.max_rooms(),
        "Starting ttto relay server"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server ready at ws://{}/ws", config.bind_addr());

    run(listener, Relay::new(&config)).await?;
    Ok(())
}
