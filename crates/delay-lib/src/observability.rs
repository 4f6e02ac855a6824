//! Prometheus metrics for the prediction service

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, GaugeVec, Histogram, IntCounter,
};
use std::sync::OnceLock;

/// Histogram buckets for prediction latency (seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once per process)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    fallback_encodings_total: IntCounter,
    prediction_errors_total: IntCounter,
    model_version_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "delay_api_prediction_latency_seconds",
                "Time spent handling one prediction request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "delay_api_predictions_total",
                "Total number of flights scored"
            )
            .expect("Failed to register predictions_total"),

            fallback_encodings_total: register_int_counter!(
                "delay_api_fallback_encodings_total",
                "Requests served with manual feature encoding instead of the saved pipeline"
            )
            .expect("Failed to register fallback_encodings_total"),

            prediction_errors_total: register_int_counter!(
                "delay_api_prediction_errors_total",
                "Requests that failed during model inference"
            )
            .expect("Failed to register prediction_errors_total"),

            model_version_info: register_gauge_vec!(
                "delay_api_model_version_info",
                "Information about the currently loaded model",
                &["version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Lightweight handle to the global metrics; clones share the same
/// underlying instruments.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, count: u64) {
        self.inner().predictions_total.inc_by(count);
    }

    pub fn inc_fallback_encodings(&self) {
        self.inner().fallback_encodings_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn set_model_version(&self, version: &str) {
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        let a = ServiceMetrics::new();
        let b = ServiceMetrics::new();

        a.inc_predictions(2);
        b.inc_predictions(3);
        a.observe_prediction_latency(0.002);
        b.set_model_version("gbdt-v1");
        // shared global state: no panic from double registration
        a.inc_fallback_encodings();
        a.inc_prediction_errors();
    }
}
