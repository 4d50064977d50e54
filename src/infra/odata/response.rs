use serde::Deserialize;

use crate::domain::entities::record::{QueryResult, Record};
use crate::error::FetchError;

/// A missing `value` reads as no rows and a missing count as zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ODataPage {
    #[serde(default)]
    pub value: Vec<Record>,
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
}

impl ODataPage {
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body).map_err(|err| FetchError::decode(err.to_string()))
    }

    pub fn into_result(self) -> QueryResult {
        QueryResult {
            rows: self.value,
            total_count: self.count.unwrap_or_default() as usize,
            warnings: Vec::new(),
        }
    }
}
