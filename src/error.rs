use std::time::Duration;

use crate::domain::entities::criteria::{CriteriaKind, FilterOperator};
use crate::domain::entities::schema::ColumnType;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while editing criteria or planning a page. Each one is
/// scoped to a single edit or resolution and leaves the table usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Duplicate accessor '{accessor}' in schema")]
    DuplicateAccessor { accessor: String },

    #[error("Column '{field}' not found in schema")]
    UnknownColumn { field: String },

    #[error("Column '{field}' is not {kind}-eligible")]
    ColumnNotEligible { field: String, kind: CriteriaKind },

    #[error("{kind} criterion index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: CriteriaKind,
        index: usize,
        len: usize,
    },

    #[error("Operator '{operator}' is not supported for {column_type} column '{field}'")]
    UnsupportedOperatorForType {
        field: String,
        operator: FilterOperator,
        column_type: ColumnType,
    },

    #[error("Unknown filter operator '{name}'")]
    UnknownOperator { name: String },

    #[error("Page size {size} is not one of {allowed:?}")]
    InvalidPageSize { size: usize, allowed: Vec<usize> },

    #[error("Action '{action}' is not available on column '{column}'")]
    ActionUnavailable { column: String, action: String },

    #[error("Row {index} out of range for page with {len} rows")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Failures of a remote page fetch. These travel in
/// `Outcome::Failed` and are kept on the view, never raised from planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to fetch data: {message}")]
    Transport { message: String },

    #[error("Failed to fetch data: HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },
}

impl Error {
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    pub fn unknown_column(field: impl Into<String>) -> Self {
        Self::UnknownColumn {
            field: field.into(),
        }
    }
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
