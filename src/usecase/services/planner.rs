use std::fmt;
use std::sync::Arc;

use crate::domain::entities::criteria::{FilterCriterion, SortCriterion};
use crate::domain::entities::pagination::PageWindow;
use crate::domain::entities::record::Record;
use crate::domain::entities::schema::Schema;
use crate::domain::predicate::{CompiledCriteria, FilterWarning};
use crate::error::Result;
use crate::infra::odata::query::{render_query, request_url};
use crate::usecase::ports::source::PageSource;

/// Where rows come from. A remote endpoint takes precedence over any
/// static dataset the caller also holds.
#[derive(Clone)]
pub enum DataSource {
    Static(Arc<Vec<Record>>),
    Remote {
        base_url: String,
        source: Arc<dyn PageSource>,
    },
}

impl DataSource {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::Static(Arc::new(records))
    }

    pub fn remote(base_url: impl Into<String>, source: Arc<dyn PageSource>) -> Self {
        Self::Remote {
            base_url: base_url.into(),
            source,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(records) => f.debug_tuple("Static").field(&records.len()).finish(),
            Self::Remote { base_url, .. } => f
                .debug_struct("Remote")
                .field("base_url", base_url)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone)]
pub enum ResolutionPlan {
    Local {
        records: Arc<Vec<Record>>,
        compiled: CompiledCriteria,
        window: PageWindow,
        paginate: bool,
    },
    Remote {
        url: String,
        source: Arc<dyn PageSource>,
        warnings: Vec<FilterWarning>,
    },
}

impl ResolutionPlan {
    /// The percent-encoded request URL of a remote plan.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Remote { url, .. } => Some(url),
            Self::Local { .. } => None,
        }
    }
}

impl fmt::Debug for ResolutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                records,
                compiled,
                window,
                paginate,
            } => f
                .debug_struct("Local")
                .field("records", &records.len())
                .field("compiled", compiled)
                .field("window", window)
                .field("paginate", paginate)
                .finish(),
            Self::Remote { url, warnings, .. } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("warnings", warnings)
                .finish_non_exhaustive(),
        }
    }
}

/// Compiles committed criteria once and picks the resolution path.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    schema: Arc<Schema>,
    source: DataSource,
    paginate: bool,
}

impl QueryPlanner {
    pub fn new(schema: Arc<Schema>, source: DataSource, paginate: bool) -> Self {
        Self {
            schema,
            source,
            paginate,
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn plan(
        &self,
        sorts: &[SortCriterion],
        filters: &[FilterCriterion],
        window: PageWindow,
    ) -> Result<ResolutionPlan> {
        let compiled = CompiledCriteria::compile(&self.schema, filters, sorts)?;
        let plan = match &self.source {
            DataSource::Static(records) => ResolutionPlan::Local {
                records: Arc::clone(records),
                compiled,
                window,
                paginate: self.paginate,
            },
            DataSource::Remote { base_url, source } => {
                let url = request_url(base_url, &self.schema, window, &compiled)?;
                tracing::debug!(
                    query = %render_query(base_url, &self.schema, window, &compiled),
                    "remote query"
                );
                ResolutionPlan::Remote {
                    url: url.into(),
                    source: Arc::clone(source),
                    warnings: compiled.warnings,
                }
            }
        };
        tracing::debug!(?plan, "planned resolution");
        Ok(plan)
    }
}
