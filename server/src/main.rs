use pong_server::config::{load_config, DEFAULT_CONFIG_PATH};
use pong_server::logger::init_from_config;
use pong_server::registry::SessionRegistry;
use pong_server::transport::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path)?;
    init_from_config(&config.tracing)?;
    info!(config = %path, bind = %config.bind, tick_ms = config.tick_ms, "Starting pong server");

    let registry = Arc::new(SessionRegistry::from_config(&config));
    for match_config in &config.matches {
        registry.create(match_config)?;
    }

    let listener = TcpListener::bind(&config.bind).await?;
    tokio::select! {
        result = serve(listener, registry.clone(), config.codec) => {
            if let Err(e) = result {
                error!(error = %e, "Listener failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    registry.close_all();
    Ok(())
}
