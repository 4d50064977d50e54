//! OData v4 query rendering.
//!
//! Options are produced once as `(name, value)` pairs. [`request_url`]
//! percent-encodes them for the wire; [`render_query`] joins them unescaped
//! for logs and display only.

use reqwest::Url;

use crate::domain::entities::criteria::{FilterCriterion, SortCriterion};
use crate::domain::entities::pagination::PageWindow;
use crate::domain::entities::schema::Schema;
use crate::domain::predicate::{CompiledCriteria, Operand, Predicate, SortKey, TextOp};
use crate::domain::value::format_number;
use crate::error::{Error, Result};

pub fn build_query(
    base_url: &str,
    schema: &Schema,
    window: PageWindow,
    sorts: &[SortCriterion],
    filters: &[FilterCriterion],
) -> Result<Url> {
    let compiled = CompiledCriteria::compile(schema, filters, sorts)?;
    request_url(base_url, schema, window, &compiled)
}

/// System query options in request order, values unescaped.
pub fn query_options(
    schema: &Schema,
    window: PageWindow,
    compiled: &CompiledCriteria,
) -> Vec<(&'static str, String)> {
    let select = schema.data_accessors().collect::<Vec<_>>().join(",");
    let mut options = vec![
        ("$top", window.items_per_page.to_string()),
        ("$skip", window.offset().to_string()),
        ("$select", select),
        ("$count", "true".to_string()),
    ];
    if let Some(order_by) = render_order_by(&compiled.sort_keys) {
        options.push(("$orderby", order_by));
    }
    if let Some(filter) = render_filter(&compiled.predicates) {
        options.push(("$filter", filter));
    }
    options
}

/// The request URL. Options are appended to any query the base URL
/// already carries.
pub fn request_url(
    base_url: &str,
    schema: &Schema,
    window: PageWindow,
    compiled: &CompiledCriteria,
) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|err| Error::InvalidUrl {
        url: base_url.to_string(),
        message: err.to_string(),
    })?;
    url.query_pairs_mut()
        .extend_pairs(query_options(schema, window, compiled));
    Ok(url)
}

/// Readable form, e.g. `People?$top=10&$orderby=UserName desc`. Not safe to send.
pub fn render_query(
    base_url: &str,
    schema: &Schema,
    window: PageWindow,
    compiled: &CompiledCriteria,
) -> String {
    let query = query_options(schema, window, compiled)
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base_url}?{query}")
}

pub fn render_order_by(keys: &[SortKey]) -> Option<String> {
    if keys.is_empty() {
        return None;
    }
    Some(
        keys.iter()
            .map(|key| format!("{} {}", key.field, key.direction.as_str()))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Predicates joined with `and`, or `None` when every criterion was dropped.
pub fn render_filter(predicates: &[Predicate]) -> Option<String> {
    if predicates.is_empty() {
        return None;
    }
    Some(
        predicates
            .iter()
            .map(render_predicate)
            .collect::<Vec<_>>()
            .join(" and "),
    )
}

pub fn render_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Text { field, op, needle } => {
            let literal = quote_string(needle);
            match op {
                TextOp::Equals => format!("tolower({field}) eq tolower({literal})"),
                TextOp::StartsWith => format!("startswith(tolower({field}), tolower({literal}))"),
                TextOp::EndsWith => format!("endswith(tolower({field}), tolower({literal}))"),
                TextOp::Contains => format!("contains(tolower({field}), tolower({literal}))"),
            }
        }
        Predicate::Compare { field, op, operand } => {
            let literal = match operand {
                Operand::Number(number) => format_number(*number),
                Operand::Date(date) => date.odata_literal(),
            };
            format!("{field} {} {literal}", op.odata())
        }
    }
}

/// Single-quoted string literal; embedded quotes are doubled.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
