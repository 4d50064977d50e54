use std::cmp::Ordering;

use crate::domain::entities::criteria::{FilterCriterion, SortCriterion, SortDirection};
use crate::domain::entities::pagination::PageWindow;
use crate::domain::entities::record::{QueryResult, Record};
use crate::domain::entities::schema::{ColumnType, Schema};
use crate::domain::predicate::{CompareOp, CompiledCriteria, Operand, Predicate, SortKey, TextOp};
use crate::domain::value::{date_millis_of, number_of, text_of};
use crate::error::Result;

/// Filters, sorts and pages `records` in memory.
///
/// With `paginate` off every surviving row is returned; `total_count` is the
/// filtered row count either way.
pub fn resolve_local(
    schema: &Schema,
    records: &[Record],
    filters: &[FilterCriterion],
    sorts: &[SortCriterion],
    window: PageWindow,
    paginate: bool,
) -> Result<QueryResult> {
    let compiled = CompiledCriteria::compile(schema, filters, sorts)?;
    Ok(apply_compiled(records, &compiled, window, paginate))
}

pub fn apply_compiled(
    records: &[Record],
    compiled: &CompiledCriteria,
    window: PageWindow,
    paginate: bool,
) -> QueryResult {
    let mut rows: Vec<&Record> = records
        .iter()
        .filter(|record| compiled.predicates.iter().all(|p| matches(p, record)))
        .collect();

    if !compiled.sort_keys.is_empty() {
        // `sort_by` is stable: rows tied on every key keep their input order.
        rows.sort_by(|a, b| compare_records(a, b, &compiled.sort_keys));
    }

    let total_count = rows.len();
    let rows = if paginate {
        let window = window.clamped(total_count);
        rows.into_iter()
            .skip(window.offset())
            .take(window.items_per_page)
            .cloned()
            .collect()
    } else {
        rows.into_iter().cloned().collect()
    };

    tracing::debug!(total_count, paginate, "resolved local page");
    QueryResult {
        rows,
        total_count,
        warnings: compiled.warnings.clone(),
    }
}

/// A missing, null or uncoercible record value never satisfies a predicate.
pub fn matches(predicate: &Predicate, record: &Record) -> bool {
    let Some(value) = record.get(predicate.field()) else {
        return false;
    };
    match predicate {
        Predicate::Text { op, needle, .. } => {
            let Some(text) = text_of(value) else {
                return false;
            };
            let haystack = text.to_lowercase();
            let needle = needle.to_lowercase();
            match op {
                TextOp::Equals => haystack == needle,
                TextOp::StartsWith => haystack.starts_with(&needle),
                TextOp::EndsWith => haystack.ends_with(&needle),
                TextOp::Contains => haystack.contains(&needle),
            }
        }
        Predicate::Compare { op, operand, .. } => {
            let ordering = match operand {
                Operand::Number(expected) => {
                    number_of(value).and_then(|actual| actual.partial_cmp(expected))
                }
                Operand::Date(expected) => date_millis_of(value)
                    .map(|actual| actual.cmp(&expected.timestamp_millis())),
            };
            ordering.is_some_and(|ordering| compare_holds(*op, ordering))
        }
    }
}

fn compare_holds(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortValue {
    Text(String),
    Number(f64),
    Date(i64),
}

fn sort_value(record: &Record, key: &SortKey) -> Option<SortValue> {
    let value = record.get(&key.field)?;
    match key.column_type {
        ColumnType::String => text_of(value).map(SortValue::Text),
        ColumnType::Number => number_of(value).map(SortValue::Number),
        ColumnType::Date => date_millis_of(value).map(SortValue::Date),
    }
}

fn compare_values(a: &Option<SortValue>, b: &Option<SortValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        // Absent values sort before present ones, as OData orders nulls.
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_records(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(&sort_value(a, key), &sort_value(b, key));
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
