use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriteriaKind {
    Sort,
    Filter,
}

impl fmt::Display for CriteriaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaKind::Sort => f.write_str("sort"),
            CriteriaKind::Filter => f.write_str("filter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Filter comparison. Which operators apply depends on the column type,
/// see [`ColumnType::operators`](crate::domain::entities::schema::ColumnType::operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    #[default]
    Equals,
    StartsWith,
    EndsWith,
    Includes,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl FilterOperator {
    pub const TEXT: [FilterOperator; 4] = [
        FilterOperator::Equals,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::Includes,
    ];

    pub const ORDERED: [FilterOperator; 5] = [
        FilterOperator::Equals,
        FilterOperator::Greater,
        FilterOperator::Less,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessOrEqual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Includes => "includes",
            FilterOperator::Greater => "greater",
            FilterOperator::Less => "less",
            FilterOperator::GreaterOrEqual => "greaterOrEqual",
            FilterOperator::LessOrEqual => "lessOrEqual",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::TEXT
            .iter()
            .chain(Self::ORDERED.iter())
            .copied()
            .find(|operator| operator.as_str() == value)
            .ok_or_else(|| Error::UnknownOperator {
                name: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterCriterion {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Empty (or whitespace-only) values never constrain the result.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}
