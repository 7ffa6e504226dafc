//! Predicate pushdown for on-demand-sync collections.
//!
//! Translates a structured filter/sort/limit request into the flat
//! parameter map a REST-style backend understands. Pushdown is an
//! optimization, not a correctness requirement: a predicate that fails to
//! translate is dropped (and reported through the warnings channel) and the
//! caller filters client-side instead.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Warning;

/// A structured subset request, as produced by a collection's query layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubsetOptions {
    /// Field predicates.
    pub filters: Vec<FilterClause>,
    /// Sort directives, in priority order.
    pub sorts: Vec<SortClause>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
}

/// One field predicate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterClause {
    /// Field path, outermost segment first.
    pub field: Vec<String>,
    /// Comparison operator.
    pub operator: FilterOp,
    /// Comparison value.
    pub value: Value,
}

/// Comparison operators with a parameter translation, plus a carrier for
/// everything else.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOp {
    /// Equality: the bare field path is the parameter name.
    Eq,
    /// Less than (`_lt` suffix).
    Lt,
    /// Less than or equal (`_lte` suffix).
    Lte,
    /// Greater than (`_gt` suffix).
    Gt,
    /// Greater than or equal (`_gte` suffix).
    Gte,
    /// Membership (`_in` suffix).
    In,
    /// Any operator without a translation; dropped at translation time.
    #[serde(untagged)]
    Other(String),
}

/// One sort directive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortClause {
    /// Field path, outermost segment first.
    pub field: Vec<String>,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Translate a subset request into a flat parameter map.
///
/// `offset` is sourced from the original request rather than the parsed
/// filter set: offset is a pagination primitive, not a predicate. The map
/// is order-insensitive except for the serialized sort string.
pub fn translate_subset(
    options: &SubsetOptions,
    offset: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> IndexMap<String, Value> {
    let mut params = IndexMap::new();

    for filter in &options.filters {
        let path = filter.field.join(".");
        let key = match &filter.operator {
            FilterOp::Eq => path,
            FilterOp::Lt => format!("{path}_lt"),
            FilterOp::Lte => format!("{path}_lte"),
            FilterOp::Gt => format!("{path}_gt"),
            FilterOp::Gte => format!("{path}_gte"),
            FilterOp::In => format!("{path}_in"),
            FilterOp::Other(op) => {
                warnings.push(Warning::UnsupportedFilterOperator {
                    operator: op.clone(),
                });
                continue;
            }
        };
        params.insert(key, filter.value.clone());
    }

    if !options.sorts.is_empty() {
        let sort = options
            .sorts
            .iter()
            .map(|s| {
                let path = s.field.join(".");
                match s.direction {
                    SortDirection::Asc => path,
                    SortDirection::Desc => format!("-{path}"),
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        params.insert("sort".to_string(), Value::String(sort));
    }

    if let Some(limit) = options.limit {
        params.insert("limit".to_string(), Value::from(limit));
    }
    if let Some(offset) = offset {
        params.insert("offset".to_string(), Value::from(offset));
    }

    params
}
