//! Headless tabular data engine.
//!
//! A column [`Schema`] plus committed sort and filter criteria resolve into
//! one page of rows, either by transforming a static dataset in memory or by
//! querying an OData collection endpoint. Both paths compile criteria once
//! and agree on the result.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod platform;
pub mod ui;
pub mod usecase;

pub use config::{TableConfig, TableOptions};
pub use domain::entities::criteria::{
    CriteriaKind, FilterCriterion, FilterOperator, SortCriterion, SortDirection,
};
pub use domain::entities::pagination::{PageWindow, Pagination};
pub use domain::entities::record::{cell_text, QueryResult, Record};
pub use domain::entities::schema::{CellRenderer, Column, ColumnType, Schema};
pub use error::{Error, FetchError, Result};
pub use ui::state::table_state::{ResolveTask, TableState};
pub use usecase::ports::source::PageSource;
pub use usecase::services::planner::DataSource;
