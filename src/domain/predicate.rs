//! Committed criteria compiled against the schema.
//!
//! Both resolution paths consume this form: the local engine evaluates it
//! against records and the OData renderer prints it, so an operator means
//! the same thing on either side.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entities::criteria::{
    CriteriaKind, FilterCriterion, FilterOperator, SortCriterion, SortDirection,
};
use crate::domain::entities::schema::{Column, ColumnType, Schema};
use crate::domain::value::{parse_date, parse_number, DateLiteral};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    pub fn odata(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Gt => "gt",
            CompareOp::Lt => "lt",
            CompareOp::Ge => "ge",
            CompareOp::Le => "le",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Number(f64),
    Date(DateLiteral),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive text match. `needle` is the value as typed.
    Text {
        field: String,
        op: TextOp,
        needle: String,
    },
    Compare {
        field: String,
        op: CompareOp,
        operand: Operand,
    },
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Text { field, .. } | Predicate::Compare { field, .. } => field,
        }
    }
}

/// A filter criterion that was skipped instead of failing the resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterWarning {
    InvalidFilterValue {
        field: String,
        value: String,
        column_type: ColumnType,
    },
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterWarning::InvalidFilterValue {
                field,
                value,
                column_type,
            } => write!(
                f,
                "ignored filter on '{field}': '{value}' is not a valid {column_type}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub column_type: ColumnType,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledCriteria {
    pub predicates: Vec<Predicate>,
    pub sort_keys: Vec<SortKey>,
    pub warnings: Vec<FilterWarning>,
}

impl CompiledCriteria {
    pub fn compile(
        schema: &Schema,
        filters: &[FilterCriterion],
        sorts: &[SortCriterion],
    ) -> Result<Self> {
        let mut compiled = Self {
            sort_keys: compile_sorts(schema, sorts)?,
            ..Self::default()
        };
        for criterion in filters {
            match compile_filter(schema, criterion)? {
                Compiled::Predicate(predicate) => compiled.predicates.push(predicate),
                Compiled::Skipped(warning) => {
                    tracing::warn!(%warning, "skipping filter criterion");
                    compiled.warnings.push(warning);
                }
                Compiled::Blank => {}
            }
        }
        Ok(compiled)
    }
}

enum Compiled {
    Predicate(Predicate),
    Skipped(FilterWarning),
    Blank,
}

pub fn eligible_column<'a>(
    schema: &'a Schema,
    field: &str,
    kind: CriteriaKind,
) -> Result<&'a Column> {
    let column = schema.require(field)?;
    if !column.is_eligible(kind) {
        return Err(Error::ColumnNotEligible {
            field: field.to_string(),
            kind,
        });
    }
    Ok(column)
}

pub fn check_operator(column: &Column, operator: FilterOperator) -> Result<()> {
    if column.column_type.supports(operator) {
        Ok(())
    } else {
        Err(Error::UnsupportedOperatorForType {
            field: column.accessor.clone(),
            operator,
            column_type: column.column_type,
        })
    }
}

fn compile_filter(schema: &Schema, criterion: &FilterCriterion) -> Result<Compiled> {
    // Blank criteria are inert, even when they would fail validation.
    if criterion.is_blank() {
        return Ok(Compiled::Blank);
    }
    let column = eligible_column(schema, &criterion.field, CriteriaKind::Filter)?;
    check_operator(column, criterion.operator)?;

    let field = criterion.field.clone();
    if column.column_type == ColumnType::String {
        let op = match criterion.operator {
            FilterOperator::StartsWith => TextOp::StartsWith,
            FilterOperator::EndsWith => TextOp::EndsWith,
            FilterOperator::Includes => TextOp::Contains,
            _ => TextOp::Equals,
        };
        return Ok(Compiled::Predicate(Predicate::Text {
            field,
            op,
            needle: criterion.value.clone(),
        }));
    }

    let operand = match column.column_type {
        ColumnType::Number => parse_number(&criterion.value).map(Operand::Number),
        _ => parse_date(&criterion.value).map(Operand::Date),
    };
    let Some(operand) = operand else {
        return Ok(Compiled::Skipped(FilterWarning::InvalidFilterValue {
            field,
            value: criterion.value.clone(),
            column_type: column.column_type,
        }));
    };
    let op = match criterion.operator {
        FilterOperator::Greater => CompareOp::Gt,
        FilterOperator::Less => CompareOp::Lt,
        FilterOperator::GreaterOrEqual => CompareOp::Ge,
        FilterOperator::LessOrEqual => CompareOp::Le,
        _ => CompareOp::Eq,
    };
    Ok(Compiled::Predicate(Predicate::Compare { field, op, operand }))
}

fn compile_sorts(schema: &Schema, sorts: &[SortCriterion]) -> Result<Vec<SortKey>> {
    sorts
        .iter()
        .map(|criterion| {
            let column = eligible_column(schema, &criterion.field, CriteriaKind::Sort)?;
            Ok(SortKey {
                field: criterion.field.clone(),
                column_type: column.column_type,
                direction: criterion.direction,
            })
        })
        .collect()
}
