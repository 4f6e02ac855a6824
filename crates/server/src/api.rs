//! HTTP API: prediction, health and metrics endpoints

use delay_lib::{
    health::{ComponentStatus, HealthRegistry},
    model::DelayPredictor,
    pipeline::{manual_features, FeaturePipeline, FEATURE_COLUMNS, PLACEHOLDER_TIMESTAMP},
    models::{FlightRecord, PredictRequest, PredictResponse},
    observability::ServiceMetrics,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

/// Shared application state
pub struct AppState {
    pub pipeline: Option<Arc<FeaturePipeline>>,
    pub predictor: Arc<dyn DelayPredictor>,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
}

impl AppState {
    pub fn new(
        pipeline: Option<Arc<FeaturePipeline>>,
        predictor: Arc<dyn DelayPredictor>,
        health_registry: HealthRegistry,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            pipeline,
            predictor,
            health_registry,
            metrics,
        }
    }

    /// Encode request flights into model feature rows, preferring the
    /// saved pipeline and falling back to manual encoding when it is
    /// unavailable or fails.
    fn encode_features(&self, request: &PredictRequest) -> Vec<Vec<f32>> {
        match &self.pipeline {
            Some(pipeline) => {
                let records: Vec<FlightRecord> = request
                    .flights
                    .iter()
                    .map(|f| f.to_record(PLACEHOLDER_TIMESTAMP))
                    .collect();

                match pipeline
                    .transform(&records)
                    .and_then(|batch| batch.select(&FEATURE_COLUMNS))
                {
                    Ok(rows) => return rows,
                    Err(e) => {
                        warn!(error = %e, "Pipeline transform failed, using manual encoding")
                    }
                }
            }
            None => debug!("No pipeline loaded, using manual encoding"),
        }
        self.metrics.inc_fallback_encodings();
        manual_features(&request.flights)
    }
}

/// Batch delay prediction: one 0/1 class per input flight
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<serde_json::Value>)> {
    let started = Instant::now();
    let features = state.encode_features(&request);

    match state.predictor.predict(&features) {
        Ok(predict) => {
            state
                .metrics
                .observe_prediction_latency(started.elapsed().as_secs_f64());
            state.metrics.inc_predictions(predict.len() as u64);
            Ok(Json(PredictResponse { predict }))
        }
        Err(e) => {
            error!(error = %e, flights = request.flights.len(), "Prediction failed");
            state.metrics.inc_prediction_errors();
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "prediction failed" })),
            ))
        }
    }
}

/// Health check - 200 while operational, 503 once a component fails
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check - 503 until the model is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router. CORS is fully permissive, which also
/// answers preflight requests for `/predict`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

/// Start the API server.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
