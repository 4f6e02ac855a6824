//! Flight delay prediction service
//!
//! Loads (or trains) the delay classifier and feature pipeline, then
//! serves batch predictions over HTTP.

use anyhow::Result;
use delay_lib::{
    health::{components, HealthRegistry},
    model,
    observability::ServiceMetrics,
};
use delay_server::{api, config};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting delay-server");

    let config = config::ServiceConfig::load()?;
    info!(model_dir = %config.model_dir, data_path = %config.data_path, "Service configured");

    // Load the persisted artifacts, training from the raw dataset on
    // first start
    let assets = model::load_or_train(Path::new(&config.model_dir), Path::new(&config.data_path))?;

    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    if assets.pipeline.is_some() {
        health_registry.register(components::PIPELINE).await;
    } else {
        health_registry
            .set_degraded(components::PIPELINE, "saved pipeline unavailable")
            .await;
    }

    let metrics = ServiceMetrics::new();
    metrics.set_model_version(model::MODEL_VERSION);

    let app_state = Arc::new(api::AppState::new(
        assets.pipeline.map(Arc::new),
        Arc::new(assets.classifier),
        health_registry.clone(),
        metrics,
    ));

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.http_port, app_state));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    api_handle.abort();

    Ok(())
}
