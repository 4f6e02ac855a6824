//! One-hot encoding of the categorical flight columns
//!
//! Mirrors the fitted-encoder semantics the model was trained against:
//! categories are collected sorted at fit time, and values unseen at
//! fit time encode as all zeros for their column group.

use crate::models::FlightRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fitted one-hot encoder over airline, flight type and month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    airlines: Vec<String>,
    flight_types: Vec<String>,
    months: Vec<u32>,
}

impl OneHotEncoder {
    /// Collect sorted distinct categories per column.
    pub fn fit(records: &[FlightRecord]) -> Self {
        let airlines: BTreeSet<String> = records.iter().map(|r| r.airline.clone()).collect();
        let flight_types: BTreeSet<String> =
            records.iter().map(|r| r.flight_type.clone()).collect();
        let months: BTreeSet<u32> = records.iter().map(|r| r.month).collect();

        Self {
            airlines: airlines.into_iter().collect(),
            flight_types: flight_types.into_iter().collect(),
            months: months.into_iter().collect(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.airlines.is_empty()
    }

    /// Indicator column names, one per fitted category, in encode order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        names.extend(self.airlines.iter().map(|a| format!("OPERA_{}", a)));
        names.extend(self.flight_types.iter().map(|t| format!("TIPOVUELO_{}", t)));
        names.extend(self.months.iter().map(|m| format!("MES_{}", m)));
        names
    }

    /// Total number of indicator columns.
    pub fn width(&self) -> usize {
        self.airlines.len() + self.flight_types.len() + self.months.len()
    }

    /// Encode one record as 0/1 indicators in `feature_names` order.
    pub fn encode(&self, record: &FlightRecord) -> Vec<f32> {
        let mut row = Vec::with_capacity(self.width());
        row.extend(
            self.airlines
                .iter()
                .map(|a| f32::from(*a == record.airline)),
        );
        row.extend(
            self.flight_types
                .iter()
                .map(|t| f32::from(*t == record.flight_type)),
        );
        row.extend(self.months.iter().map(|m| f32::from(*m == record.month)));
        row
    }
}
