//! Multi-room TCP Chat Server - Entry Point
//!
//! Binds the listener and serves connections until Ctrl+C.

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use room_chat_server::config::{ServerConfig, DEFAULT_LOG_FILTER};
use room_chat_server::{serve, AppError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=room_chat_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env();

    let listener = match TcpListener::bind(&config.addr).await {
        Ok(listener) => listener,
        Err(source) => {
            let err = AppError::Bind {
                addr: config.addr,
                source,
            };
            error!("{}", err);
            return Err(err.into());
        }
    };
    info!("Chat server listening on {}", config.addr);

    serve(listener, shutdown_signal()).await?;

    info!("Chat server stopped");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received, shutting down");
}
