use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Number, Value};

use crate::domain::entities::record::Record;

/// Maps one spreadsheet cell onto a JSON value. Empty cells become `null`.
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::String(v) => Value::String(v.clone()),
        Data::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        Data::Int(v) => Value::from(*v),
        Data::Bool(v) => Value::Bool(*v),
        Data::DateTime(v) => v
            .as_datetime()
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or_else(|| Value::String(v.to_string())),
        Data::DateTimeIso(v) => Value::String(v.clone()),
        Data::DurationIso(v) => Value::String(v.clone()),
        Data::Error(v) => Value::String(format!("{v:?}")),
        Data::Empty => Value::Null,
    }
}

/// Reads one worksheet (the first one when `sheet` is `None`). The first
/// row holds the headers; blank header cells drop their column.
pub fn load_xlsx_records(xlsx_path: &Path, sheet: Option<&str>) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .with_context(|| format!("workbook has no sheets: {}", xlsx_path.display()))?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    if headers.iter().all(String::is_empty) {
        anyhow::bail!("sheet {sheet_name} has no header row")
    }

    let records: Vec<Record> = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), cell_to_value(cell)))
                .collect()
        })
        .collect();

    tracing::debug!(path = %xlsx_path.display(), sheet = %sheet_name, rows = records.len(), "loaded xlsx");
    Ok(records)
}
