//! Gradient-boosted delay classifier
//!
//! Thin wrapper around the `gbdt` crate: deterministic shuffle and
//! train/test split, class-imbalance weighting on the positive class,
//! logistic-loss boosting, and native model persistence.

use super::DelayPredictor;
use anyhow::{Context, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;

/// Number of input features expected by the model
pub const NUM_FEATURES: usize = 10;

/// Version label reported alongside predictions
pub const MODEL_VERSION: &str = "gbdt-v1";

const LEARNING_RATE: ValueType = 0.01;
const ITERATIONS: usize = 100;
const MAX_DEPTH: u32 = 6;
const TEST_FRACTION: f64 = 0.33;
const SHUFFLE_SEED: u64 = 111;

/// Decision threshold on the predicted delay probability
const PROBABILITY_THRESHOLD: ValueType = 0.5;

/// Trained gradient-boosted binary classifier
pub struct GbdtClassifier {
    model: GBDT,
}

impl GbdtClassifier {
    /// Train on encoded feature rows and 0/1 labels.
    ///
    /// The frame is shuffled with a fixed seed and split 67/33; the
    /// held-out part is only used to log accuracy. Positive samples
    /// are weighted by the negative/positive ratio of the training
    /// part, the XGBoost `scale_pos_weight` scheme.
    pub fn train(features: &[Vec<f32>], labels: &[u8]) -> Result<Self> {
        anyhow::ensure!(
            features.len() == labels.len(),
            "feature rows ({}) and labels ({}) differ in length",
            features.len(),
            labels.len()
        );
        anyhow::ensure!(!features.is_empty(), "cannot train on an empty dataset");

        let mut indices: Vec<usize> = (0..features.len()).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));

        let test_len = (indices.len() as f64 * TEST_FRACTION).round() as usize;
        let (train_idx, test_idx) = indices.split_at(indices.len() - test_len);

        let positives = train_idx.iter().filter(|&&i| labels[i] == 1).count();
        let negatives = train_idx.len() - positives;
        anyhow::ensure!(
            positives > 0 && negatives > 0,
            "training data must contain both delayed and on-time flights"
        );
        let scale = negatives as ValueType / positives as ValueType;

        let mut train_data: DataVec = train_idx
            .iter()
            .map(|&i| {
                let weight = if labels[i] == 1 { scale } else { 1.0 };
                Data::new_training_data(features[i].clone(), weight, signed_label(labels[i]), None)
            })
            .collect();

        let mut config = Config::new();
        config.set_feature_size(NUM_FEATURES);
        config.set_max_depth(MAX_DEPTH);
        config.set_iterations(ITERATIONS);
        config.set_shrinkage(LEARNING_RATE);
        config.set_loss("LogLikelyhood");
        config.set_training_optimization_level(2);

        let mut model = GBDT::new(&config);
        model.fit(&mut train_data);

        let classifier = Self { model };

        if !test_idx.is_empty() {
            let test_features: Vec<Vec<f32>> =
                test_idx.iter().map(|&i| features[i].clone()).collect();
            let predicted = classifier.predict_classes(&test_features);
            let correct = predicted
                .iter()
                .zip(test_idx.iter())
                .filter(|&(&p, &i)| p == i32::from(labels[i]))
                .count();
            info!(
                train_rows = train_idx.len(),
                test_rows = test_idx.len(),
                scale_pos_weight = scale,
                accuracy = correct as f64 / test_idx.len() as f64,
                "Classifier trained"
            );
        }

        Ok(classifier)
    }

    /// Delay probability per feature row.
    pub fn predict_proba(&self, features: &[Vec<f32>]) -> Vec<ValueType> {
        if features.is_empty() {
            return Vec::new();
        }
        let batch: DataVec = features
            .iter()
            .map(|row| Data::new_test_data(row.clone(), None))
            .collect();
        self.model.predict(&batch)
    }

    fn predict_classes(&self, features: &[Vec<f32>]) -> Vec<i32> {
        self.predict_proba(features)
            .iter()
            .map(|&p| i32::from(p > PROBABILITY_THRESHOLD))
            .collect()
    }

    /// Persist via the gbdt crate's native format.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create model directory {:?}", parent))?;
        }
        let path = path
            .to_str()
            .context("model path is not valid UTF-8")?;
        self.model
            .save_model(path)
            .map_err(|e| anyhow::anyhow!("failed to save model to {}: {}", path, e))?;
        info!(path, "Model saved");
        Ok(())
    }

    /// Load a previously saved model.
    pub fn load(path: &Path) -> Result<Self> {
        let path = path
            .to_str()
            .context("model path is not valid UTF-8")?;
        let model = GBDT::load_model(path)
            .map_err(|e| anyhow::anyhow!("failed to load model from {}: {}", path, e))?;
        Ok(Self { model })
    }
}

impl DelayPredictor for GbdtClassifier {
    fn predict(&self, features: &[Vec<f32>]) -> Result<Vec<i32>> {
        Ok(self.predict_classes(features))
    }

    fn model_version(&self) -> &str {
        MODEL_VERSION
    }
}

/// The logistic loss in gbdt expects labels in {-1, 1}.
fn signed_label(label: u8) -> ValueType {
    if label == 1 {
        1.0
    } else {
        -1.0
    }
}
