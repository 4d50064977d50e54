use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::entities::actions::RowActions;
use crate::domain::entities::criteria::{CriteriaKind, FilterOperator};
use crate::domain::entities::record::{cell_text, Record};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Date,
}

impl ColumnType {
    /// Operators offered by the filter editor for this type, in menu order.
    pub fn operators(self) -> &'static [FilterOperator] {
        match self {
            ColumnType::String => &FilterOperator::TEXT,
            ColumnType::Number | ColumnType::Date => &FilterOperator::ORDERED,
        }
    }

    pub fn supports(self, operator: FilterOperator) -> bool {
        self.operators().contains(&operator)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub value: String,
    pub label: String,
}

/// Display text for a whole row, for cells composed from several fields.
#[derive(Clone)]
pub struct CellRenderer(Arc<dyn Fn(&Record) -> String + Send + Sync>);

impl CellRenderer {
    pub fn new(render: impl Fn(&Record) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(render))
    }

    pub fn render(&self, record: &Record) -> String {
        (self.0)(record)
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellRenderer(..)")
    }
}

fn default_true() -> bool {
    true
}

/// A column that carries [`RowActions`] is an action column: it has no
/// backing field, so it is never sorted, filtered or selected remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub header: String,
    pub accessor: String,
    #[serde(rename = "type", default = "default_column_type")]
    pub column_type: ColumnType,
    #[serde(default = "default_true")]
    pub is_sortable: bool,
    #[serde(default = "default_true")]
    pub is_filterable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ColumnOption>>,
    #[serde(skip)]
    pub actions: Option<RowActions>,
    #[serde(skip)]
    pub render: Option<CellRenderer>,
}

fn default_column_type() -> ColumnType {
    ColumnType::String
}

impl Column {
    pub fn new(
        header: impl Into<String>,
        accessor: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            header: header.into(),
            accessor: accessor.into(),
            column_type,
            is_sortable: true,
            is_filterable: true,
            options: None,
            actions: None,
            render: None,
        }
    }

    pub fn string(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self::new(header, accessor, ColumnType::String)
    }

    pub fn number(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self::new(header, accessor, ColumnType::Number)
    }

    pub fn date(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self::new(header, accessor, ColumnType::Date)
    }

    /// Builds an action column. Its accessor only identifies the column.
    pub fn action_column(
        header: impl Into<String>,
        accessor: impl Into<String>,
        actions: RowActions,
    ) -> Self {
        Self {
            actions: Some(actions),
            is_sortable: false,
            is_filterable: false,
            ..Self::string(header, accessor)
        }
    }

    pub fn sortable(mut self, is_sortable: bool) -> Self {
        self.is_sortable = is_sortable;
        self
    }

    pub fn filterable(mut self, is_filterable: bool) -> Self {
        self.is_filterable = is_filterable;
        self
    }

    pub fn with_options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = Some(
            options
                .into_iter()
                .map(|(value, label)| ColumnOption {
                    value: value.into(),
                    label: label.into(),
                })
                .collect(),
        );
        self
    }

    /// Renders this column's cells from the whole record instead of the
    /// accessor's value. Sorting and filtering still use the accessor.
    pub fn with_render(
        mut self,
        render: impl Fn(&Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(CellRenderer::new(render));
        self
    }

    pub fn cell_text(&self, record: &Record) -> String {
        match &self.render {
            Some(renderer) => renderer.render(record),
            None => cell_text(record, &self.accessor),
        }
    }

    pub fn is_action_column(&self) -> bool {
        self.actions.is_some()
    }

    pub fn is_eligible(&self, kind: CriteriaKind) -> bool {
        if self.is_action_column() {
            return false;
        }
        match kind {
            CriteriaKind::Sort => self.is_sortable,
            CriteriaKind::Filter => self.is_filterable,
        }
    }

    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .as_deref()?
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.accessor.trim().is_empty() {
                return Err(Error::invalid_schema(format!(
                    "column '{}' has an empty accessor",
                    column.header
                )));
            }
            if !seen.insert(column.accessor.as_str()) {
                return Err(Error::DuplicateAccessor {
                    accessor: column.accessor.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, accessor: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.accessor == accessor)
    }

    pub fn require(&self, accessor: &str) -> Result<&Column> {
        self.column(accessor)
            .ok_or_else(|| Error::unknown_column(accessor))
    }

    pub fn eligible(&self, kind: CriteriaKind) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(move |column| column.is_eligible(kind))
    }

    pub fn data_accessors(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| !column.is_action_column())
            .map(|column| column.accessor.as_str())
    }
}
