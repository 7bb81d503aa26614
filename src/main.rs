use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod handlers;
mod models;
mod routes;
mod services;

use handlers::gateway_handlers::GatewayState;
use services::object_store::{ObjectStore, S3Store};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Load config from the positional CLI argument ---
    let args = config::Args::parse();
    let cfg = config::GatewayConfig::load(&args.config)?;

    tracing::info!(
        "Starting bucket-gateway for bucket `{}` at `{}`",
        cfg.bucket,
        cfg.endpoint
    );

    // --- Construct the store client ---
    // A failed construction does not abort: every request then answers the
    // fixed backend-unavailable body instead.
    let store: Option<Arc<dyn ObjectStore>> = match S3Store::connect(&cfg) {
        Ok(store) => Some(Arc::new(store)),
        Err(err) => {
            tracing::error!("failed to construct store client: {}", err);
            None
        }
    };

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(GatewayState::new(store));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
