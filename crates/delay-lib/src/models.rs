//! Core data models for the delay prediction service

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// A historical flight record as read from the training dataset.
///
/// Field names follow the upstream dataset columns; extra CSV columns
/// are ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Scheduled departure timestamp (`YYYY-MM-DD HH:MM:SS`)
    #[serde(rename = "Fecha-I")]
    pub scheduled_at: String,
    /// Operated departure timestamp (`YYYY-MM-DD HH:MM:SS`)
    #[serde(rename = "Fecha-O")]
    pub operated_at: String,
    /// Operating airline
    #[serde(rename = "OPERA")]
    pub airline: String,
    /// Flight type: `I` international, `N` national
    #[serde(rename = "TIPOVUELO")]
    pub flight_type: String,
    /// Scheduled month, 1-12
    #[serde(rename = "MES")]
    pub month: u32,
}

/// A flight as submitted to the prediction endpoint.
///
/// Serving input carries no timestamps; the handler fills the date
/// columns with a placeholder before running the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    #[serde(rename = "OPERA")]
    pub airline: String,
    #[serde(rename = "TIPOVUELO")]
    pub flight_type: String,
    #[serde(rename = "MES")]
    pub month: u32,
}

impl Flight {
    /// Expand into a full record, filling both date columns with the
    /// given placeholder timestamp.
    pub fn to_record(&self, timestamp: &str) -> FlightRecord {
        FlightRecord {
            scheduled_at: timestamp.to_string(),
            operated_at: timestamp.to_string(),
            airline: self.airline.clone(),
            flight_type: self.flight_type.clone(),
            month: self.month,
        }
    }
}

/// Request body for `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub flights: Vec<Flight>,
}

/// Response body for `POST /predict`: one 0/1 class per input flight,
/// input order preserved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predict: Vec<i32>,
}

/// Period of the day a scheduled departure falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Night,
}

/// Date-derived features for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub period_day: DayPeriod,
    pub high_season: bool,
    /// Operated minus scheduled departure, in minutes. Negative when
    /// the flight left early.
    pub min_diff: f64,
}

/// A batch of encoded flights: named one-hot columns plus the
/// date-derived features per row
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f32>>,
    pub derived: Vec<DerivedFeatures>,
}

impl EncodedBatch {
    /// Project the batch onto the given columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let indices = columns
            .iter()
            .map(|name| {
                self.columns
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
