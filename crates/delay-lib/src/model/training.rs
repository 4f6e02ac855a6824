//! Training dataset loading

use crate::models::FlightRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Read the historical flights CSV. Only the columns backing
/// `FlightRecord` are kept; everything else in the file is ignored.
pub fn load_dataset(path: &Path) -> Result<Vec<FlightRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open training dataset {:?}", path))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: FlightRecord =
            row.with_context(|| format!("malformed row in training dataset {:?}", path))?;
        records.push(record);
    }
    anyhow::ensure!(!records.is_empty(), "training dataset {:?} is empty", path);

    info!(rows = records.len(), path = %path.display(), "Training dataset loaded");
    Ok(records)
}
