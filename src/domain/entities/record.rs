use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::predicate::FilterWarning;

pub type Record = Map<String, Value>;

/// Text shown for a cell whose accessor is absent from the record.
pub const MISSING_CELL: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub rows: Vec<Record>,
    pub total_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FilterWarning>,
}

pub fn cell_text(record: &Record, accessor: &str) -> String {
    match record.get(accessor) {
        None => MISSING_CELL.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

pub fn record_from<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
