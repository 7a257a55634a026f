//! vote-relay - HTTP trigger endpoint for the vote publish function.
//!
//! Serves `POST /` for store events and `GET /health`.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vote_relay_function::{create_router, InvocationController, RelaySettings};
use vote_relay_publisher::WsGatewayPublisher;
use vote_relay_store::HttpDocumentStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vote_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting vote-relay");

    let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    // Settings are re-read per invocation; warn early so a bad deploy is visible.
    if let Err(err) = RelaySettings::from_env().validate() {
        tracing::warn!(error = %err, "Configuration incomplete, invocations will fail");
    }

    let controller = Arc::new(InvocationController::from_env(
        Arc::new(HttpDocumentStore::new()),
        Arc::new(WsGatewayPublisher::new()),
    ));

    let app = create_router(controller);

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
