//! Quadro Server — application entry point.
//!
//! Wires the SurrealDB store, the credential service, and the event
//! bus into the API layer, then waits for shutdown. Transport bindings
//! attach to the [`quadro_api::Api`] handle built here.

mod config;

use quadro_api::{Api, EventBus};
use quadro_db::DbManager;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("quadro=info".parse().expect("static directive")),
        )
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting Quadro server...");

    let config = ServerConfig::from_env()?;

    // connect() also brings the schema up to date.
    let manager = DbManager::connect(&config.db).await?;

    let store = manager.store();
    let events = EventBus::new(config.event_bus_capacity);
    let api = Api::new(store, config.auth.clone(), events);

    tracing::info!(
        event_bus_capacity = config.event_bus_capacity,
        "Quadro server ready"
    );

    // The API handle stays alive for transport layers; shut down on
    // ctrl-c.
    tokio::signal::ctrl_c().await?;
    drop(api);

    tracing::info!("Quadro server stopped.");
    Ok(())
}
