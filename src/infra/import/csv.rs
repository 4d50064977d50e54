use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::entities::record::Record;

/// Reads a headed CSV file into records keyed by header.
///
/// Cells stay strings; typed columns coerce them when filtering and sorting.
/// Short rows leave their trailing accessors absent.
pub fn load_csv_records(csv_path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("failed to parse csv record {}", row_idx + 1))?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
            .collect();
        records.push(record);
    }

    tracing::debug!(path = %csv_path.display(), rows = records.len(), "loaded csv");
    Ok(records)
}
