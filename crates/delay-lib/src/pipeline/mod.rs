//! Feature-engineering pipeline
//!
//! Combines one-hot encoding of the categorical flight columns with
//! the date-derived features, and persists the fitted encoder state as
//! JSON so serving never re-fits categories.

mod dates;
mod encoder;

pub use dates::{derive, is_high_season, minute_diff, period_of_day, TIMESTAMP_FORMAT};
pub use encoder::OneHotEncoder;

use crate::error::PipelineError;
use crate::models::{EncodedBatch, Flight, FlightRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// The ten feature columns consumed by the classifier, in model order
pub const FEATURE_COLUMNS: [&str; 10] = [
    "OPERA_Latin American Wings",
    "MES_7",
    "MES_10",
    "OPERA_Grupo LATAM",
    "MES_12",
    "TIPOVUELO_I",
    "MES_4",
    "MES_11",
    "OPERA_Sky Airline",
    "OPERA_Copa Air",
];

/// Placeholder timestamp for serving requests, which carry no date
/// columns
pub const PLACEHOLDER_TIMESTAMP: &str = "2023-01-01 00:00:00";

/// Fitted feature pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    encoder: OneHotEncoder,
}

impl FeaturePipeline {
    /// Fit the encoder over the raw records.
    pub fn fit(records: &[FlightRecord]) -> Self {
        Self {
            encoder: OneHotEncoder::fit(records),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.encoder.is_fitted()
    }

    /// Names of the one-hot columns the fitted pipeline produces.
    pub fn feature_names(&self) -> Vec<String> {
        self.encoder.feature_names()
    }

    /// Encode a batch of records against the fitted categories.
    pub fn transform(&self, records: &[FlightRecord]) -> Result<EncodedBatch, PipelineError> {
        let rows = records.iter().map(|r| self.encoder.encode(r)).collect();
        let derived = records
            .iter()
            .map(dates::derive)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EncodedBatch {
            columns: self.encoder.feature_names(),
            rows,
            derived,
        })
    }

    /// Fit on the records, then encode them.
    pub fn fit_transform(
        records: &[FlightRecord],
    ) -> Result<(Self, EncodedBatch), PipelineError> {
        let pipeline = Self::fit(records);
        let batch = pipeline.transform(records)?;
        Ok((pipeline, batch))
    }

    /// Persist the fitted state as JSON.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|source| PipelineError::Format {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, json).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "Pipeline saved");
        Ok(())
    }

    /// Load a previously saved pipeline.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let bytes = fs::read(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| PipelineError::Format {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Manual fallback encoding used when the saved pipeline is
/// unavailable: each model column is matched directly against the
/// flight's airline, type or month.
pub fn manual_features(flights: &[Flight]) -> Vec<Vec<f32>> {
    flights
        .iter()
        .map(|flight| {
            FEATURE_COLUMNS
                .iter()
                .map(|column| {
                    let hit = if let Some(airline) = column.strip_prefix("OPERA_") {
                        airline == flight.airline
                    } else if let Some(flight_type) = column.strip_prefix("TIPOVUELO_") {
                        flight_type == flight.flight_type
                    } else if let Some(month) = column.strip_prefix("MES_") {
                        month.parse() == Ok(flight.month)
                    } else {
                        false
                    };
                    f32::from(hit)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayPeriod;

    fn record(airline: &str, flight_type: &str, month: u32) -> FlightRecord {
        FlightRecord {
            scheduled_at: format!("2017-{:02}-01 14:00:00", month),
            operated_at: format!("2017-{:02}-01 14:20:00", month),
            airline: airline.to_string(),
            flight_type: flight_type.to_string(),
            month,
        }
    }

    fn training_records() -> Vec<FlightRecord> {
        vec![
            record("Latin American Wings", "I", 7),
            record("Grupo LATAM", "N", 10),
            record("Sky Airline", "I", 12),
            record("Copa Air", "N", 4),
            record("Grupo LATAM", "I", 11),
        ]
    }

    #[test]
    fn test_fit_transform_produces_model_columns() {
        let (pipeline, batch) = FeaturePipeline::fit_transform(&training_records()).unwrap();
        assert!(pipeline.is_fitted());

        let selected = batch.select(&FEATURE_COLUMNS).unwrap();
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|row| row.len() == FEATURE_COLUMNS.len()));

        // First record is a July Latin American Wings international flight
        assert_eq!(
            selected[0],
            vec![1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_transform_carries_derived_features() {
        let (_, batch) = FeaturePipeline::fit_transform(&training_records()).unwrap();
        for derived in &batch.derived {
            assert_eq!(derived.period_day, DayPeriod::Afternoon);
            assert_eq!(derived.min_diff, 20.0);
        }
        // July 1st is off season, December 1st too
        assert!(!batch.derived[0].high_season);
    }

    #[test]
    fn test_transform_rejects_bad_timestamps() {
        let pipeline = FeaturePipeline::fit(&training_records());
        let mut bad = training_records();
        bad[0].scheduled_at = "yesterday".to_string();
        assert!(pipeline.transform(&bad).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("pipeline.json");

        let pipeline = FeaturePipeline::fit(&training_records());
        pipeline.save(&path).unwrap();

        let loaded = FeaturePipeline::load(&path).unwrap();
        assert_eq!(loaded, pipeline);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = FeaturePipeline::load(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_manual_features_match_pipeline_columns() {
        let flight = Flight {
            airline: "Sky Airline".to_string(),
            flight_type: "I".to_string(),
            month: 10,
        };
        let rows = manual_features(std::slice::from_ref(&flight));
        assert_eq!(
            rows[0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_manual_features_unknown_values_encode_zero() {
        let flight = Flight {
            airline: "Unknown Air".to_string(),
            flight_type: "X".to_string(),
            month: 2,
        };
        let rows = manual_features(&[flight]);
        assert_eq!(rows[0], vec![0.0; FEATURE_COLUMNS.len()]);
    }

    #[test]
    fn test_manual_month_one_does_not_match_month_ten() {
        let flight = Flight {
            airline: "Copa Air".to_string(),
            flight_type: "N".to_string(),
            month: 1,
        };
        let rows = manual_features(&[flight]);
        // MES_10, MES_11, MES_12 must stay zero for month 1
        assert_eq!(
            rows[0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]
        );
    }
}
