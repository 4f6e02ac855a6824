//! Delay prediction model

mod classifier;
mod training;

pub use classifier::{GbdtClassifier, MODEL_VERSION, NUM_FEATURES};
pub use training::load_dataset;

use crate::models::EncodedBatch;
use crate::pipeline::{FeaturePipeline, FEATURE_COLUMNS};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Minutes past schedule after which a departure counts as delayed
pub const DELAY_THRESHOLD_MINUTES: f64 = 15.0;

/// File name of the persisted classifier inside the model directory
pub const MODEL_FILE: &str = "delay_model.gbdt";

/// File name of the persisted pipeline inside the model directory
pub const PIPELINE_FILE: &str = "pipeline.json";

/// Trait for delay prediction implementations
pub trait DelayPredictor: Send + Sync {
    /// Predict a 0/1 delay class per encoded feature row
    fn predict(&self, features: &[Vec<f32>]) -> Result<Vec<i32>>;

    /// Version label of the underlying model
    fn model_version(&self) -> &str;
}

/// Derive 0/1 delay labels from the minute differences of an encoded
/// batch.
pub fn delay_labels(batch: &EncodedBatch) -> Vec<u8> {
    batch
        .derived
        .iter()
        .map(|d| u8::from(d.min_diff > DELAY_THRESHOLD_MINUTES))
        .collect()
}

/// Everything the serving path needs: the classifier, and the fitted
/// pipeline when it could be loaded. A missing pipeline switches the
/// API to manual fallback encoding.
pub struct ModelAssets {
    pub pipeline: Option<FeaturePipeline>,
    pub classifier: GbdtClassifier,
}

/// Load the saved classifier and pipeline from `model_dir`, or train
/// from the raw dataset at `data_path` when no saved model exists,
/// persisting both artifacts afterwards.
pub fn load_or_train(model_dir: &Path, data_path: &Path) -> Result<ModelAssets> {
    let model_path = model_dir.join(MODEL_FILE);
    let pipeline_path = model_dir.join(PIPELINE_FILE);

    if model_path.exists() {
        let classifier = GbdtClassifier::load(&model_path)?;
        info!(path = %model_path.display(), "Model loaded");

        let pipeline = match FeaturePipeline::load(&pipeline_path) {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                warn!(error = %e, "Saved pipeline unavailable, serving with manual encoding");
                None
            }
        };
        return Ok(ModelAssets {
            pipeline,
            classifier,
        });
    }

    info!(path = %data_path.display(), "No saved model, training from dataset");
    let records = load_dataset(data_path)?;

    let (pipeline, batch) =
        FeaturePipeline::fit_transform(&records).context("failed to encode training dataset")?;
    let labels = delay_labels(&batch);
    let features = batch
        .select(&FEATURE_COLUMNS)
        .context("training dataset does not cover the model feature columns")?;

    let classifier = GbdtClassifier::train(&features, &labels)?;

    pipeline
        .save(&pipeline_path)
        .context("failed to persist fitted pipeline")?;
    classifier.save(&model_path)?;

    Ok(ModelAssets {
        pipeline: Some(pipeline),
        classifier,
    })
}
