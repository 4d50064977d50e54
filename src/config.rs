use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::domain::entities::pagination::DEFAULT_PAGE_SIZES;
use crate::domain::entities::record::Record;
use crate::domain::entities::schema::{Column, Schema};
use crate::infra::import::csv::load_csv_records;
use crate::infra::import::xlsx::load_xlsx_records;
use crate::infra::odata::http::HttpPageSource;
use crate::ui::state::table_state::TableState;
use crate::usecase::services::orchestrator::DEFAULT_REQUEST_TIMEOUT;
use crate::usecase::services::planner::DataSource;

pub const CONFIG_FILE_NAME: &str = "table.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// The first entry is the initial page size.
    pub page_size_options: Vec<usize>,
    pub show_sort_popup: bool,
    pub show_filter_popup: bool,
    pub show_pagination: bool,
    pub request_timeout_secs: u64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZES.to_vec(),
            show_sort_popup: true,
            show_filter_popup: true,
            show_pagination: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl TableOptions {
    /// Drops zero page sizes and falls back to the defaults when nothing is left.
    pub fn normalized(mut self) -> Self {
        self.page_size_options.retain(|size| *size > 0);
        if self.page_size_options.is_empty() {
            self.page_size_options = DEFAULT_PAGE_SIZES.to_vec();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT.as_secs();
        }
        self
    }

    pub fn default_page_size(&self) -> usize {
        self.page_size_options
            .first()
            .copied()
            .unwrap_or(DEFAULT_PAGE_SIZES[0])
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where a configured table reads its rows from.
///
/// File paths are resolved against the directory of the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceConfig {
    Remote {
        #[serde(rename = "apiUrl")]
        api_url: String,
    },
    Inline {
        #[serde(default)]
        data: Vec<Record>,
    },
    Csv {
        path: PathBuf,
    },
    Xlsx {
        path: PathBuf,
        #[serde(default)]
        sheet: Option<String>,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Inline { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub columns: Vec<Column>,
    #[serde(flatten)]
    pub options: TableOptions,
    #[serde(default)]
    pub source: SourceConfig,
}

impl TableConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse table config")
    }

    /// Relative file paths are resolved against `base_dir`.
    pub fn into_state(self, base_dir: &Path) -> Result<TableState> {
        let schema = Schema::new(self.columns).context("invalid table columns")?;
        let source = match self.source {
            SourceConfig::Remote { api_url } => {
                let http = HttpPageSource::new().context("failed to set up remote source")?;
                DataSource::remote(api_url, Arc::new(http))
            }
            SourceConfig::Inline { data } => DataSource::from_records(data),
            SourceConfig::Csv { path } => {
                DataSource::from_records(load_csv_records(&base_dir.join(path))?)
            }
            SourceConfig::Xlsx { path, sheet } => DataSource::from_records(load_xlsx_records(
                &base_dir.join(path),
                sheet.as_deref(),
            )?),
        };
        tracing::debug!(?source, columns = schema.columns().len(), "table configured");
        Ok(TableState::new(Arc::new(schema), source, self.options))
    }
}

pub fn load_config(path: &Path) -> Result<TableConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    TableConfig::from_json(&text).with_context(|| format!("in config: {}", path.display()))
}

pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "hellhbbd", "dyntable")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
}
