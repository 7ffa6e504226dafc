//! Pagination capability analysis.
//!
//! Classifies a query operation's argument set into a pagination parameter
//! style and its response shape into a next-page accessor strategy, using
//! type introspection rather than naming heuristics on the document. An
//! operation that cannot be classified is excluded from infinite-query
//! generation with a warning, never guessed.

use serde::Serialize;
use serde_json::{Value, json};

use crate::config::PaginationOverride;
use crate::error::Warning;
use crate::ir::{NamedSchemaIR, PropertyIR, SchemaIR, SchemaKind};
use crate::operation::{ArgumentInfo, OperationInfo, OperationKind};
use crate::session::CompileSession;

/// How the operation accepts pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamStyle {
    /// `limit` + `offset` numeric window.
    Offset,
    /// `page` + page-size numeric window.
    Page,
    /// A single opaque cursor argument.
    Cursor,
    /// Relay connection arguments (`after` / `before`+`first`+`last`).
    Relay,
}

/// Where the next-page signal lives in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStyle {
    /// No response signal; the consumer stops on an empty page.
    None,
    /// A boolean has-more flag.
    HasMore,
    /// An opaque next-page cursor field.
    Cursor,
    /// A Relay connection (`pageInfo.hasNextPage` / `pageInfo.endCursor`).
    Relay,
}

/// Pagination capability of one query operation.
///
/// Computed once per compile pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Parameter style.
    pub param_style: ParamStyle,
    /// Response style.
    pub response_style: ResponseStyle,
    /// Document-side variable to set when requesting the next page.
    pub page_param_name: String,
    /// Initial value for the page parameter. `None` is the unset sentinel
    /// for cursor styles; the consumer types it compatibly with the page
    /// parameter.
    pub initial_page_param: Option<Value>,
    /// Accessor path to the has-more flag, from the response root.
    pub has_more_path: Option<Vec<String>>,
    /// Accessor path to the next-page cursor, from the response root.
    pub next_cursor_path: Option<Vec<String>>,
}

/// Argument names recognized as a standalone cursor.
const CURSOR_ARG_NAMES: [&str; 7] = [
    "cursor",
    "nextcursor",
    "pagetoken",
    "nexttoken",
    "nextpagetoken",
    "startingafter",
    "next",
];

/// Page-size companions for the `page` style.
const PAGE_SIZE_ARG_NAMES: [&str; 4] = ["pagesize", "perpage", "size", "limit"];

/// Boolean has-more response fields.
const HAS_MORE_FIELDS: [&str; 4] = ["has_more", "hasMore", "hasNextPage", "has_next_page"];

/// Opaque next-cursor response fields.
const NEXT_CURSOR_FIELDS: [&str; 6] = [
    "next_cursor",
    "nextCursor",
    "next_page_token",
    "nextPageToken",
    "next_token",
    "nextToken",
];

/// Classify one operation, pushing a warning when a paginated-looking
/// operation cannot be classified. Returns `None` for operations excluded
/// from infinite-query generation.
pub fn analyze_operation(
    op: &OperationInfo,
    session: &mut CompileSession,
) -> Option<PaginationInfo> {
    if op.kind != OperationKind::Query {
        return None;
    }

    let overrides = session.config().pagination_override(&op.name).cloned();
    if overrides.as_ref().is_some_and(|o| o.disabled) {
        return None;
    }

    let (param_style, page_param_name) = classify_params(&op.arguments)?;

    let (response_style, has_more_path, next_cursor_path) =
        match classify_response(op, overrides.as_ref(), session.registry()) {
            Ok(classified) => classified,
            Err(reason) => {
                session.push_warning(Warning::UnclassifiablePagination {
                    operation: op.name.clone(),
                    reason,
                });
                return None;
            }
        };

    let initial_page_param = overrides
        .and_then(|o| o.initial_page_param)
        .or_else(|| match param_style {
            ParamStyle::Offset => Some(json!(0)),
            ParamStyle::Page => Some(json!(1)),
            ParamStyle::Cursor | ParamStyle::Relay => None,
        });

    Some(PaginationInfo {
        param_style,
        response_style,
        page_param_name,
        initial_page_param,
        has_more_path,
        next_cursor_path,
    })
}

/// Match the schema-defined argument set against the known styles, then map
/// the matched argument back to the variable the document actually binds.
/// A schema argument the document never passes fails classification.
fn classify_params(arguments: &[ArgumentInfo]) -> Option<(ParamStyle, String)> {
    let has = |wanted: &str| arguments.iter().any(|a| normalize(&a.name) == wanted);
    let find = |wanted: &str| arguments.iter().find(|a| normalize(&a.name) == wanted);

    let (style, matched) = if has("limit") && has("offset") {
        (ParamStyle::Offset, find("offset"))
    } else if has("page") && PAGE_SIZE_ARG_NAMES.iter().any(|n| has(n)) {
        (ParamStyle::Page, find("page"))
    } else if has("after") {
        (ParamStyle::Relay, find("after"))
    } else if has("before") && has("first") && has("last") {
        (ParamStyle::Relay, find("before"))
    } else if let Some(arg) = arguments
        .iter()
        .find(|a| CURSOR_ARG_NAMES.contains(&normalize(&a.name).as_str()))
    {
        (ParamStyle::Cursor, Some(arg))
    } else {
        return None;
    };

    // The matched schema argument must be bound to a document variable; the
    // call site may alias names or not pass the argument at all.
    let variable = matched.and_then(|a| a.variable.clone())?;
    Some((style, variable))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

type ResponsePaths = (ResponseStyle, Option<Vec<String>>, Option<Vec<String>>);

/// Classify the response shape. Cursor-fed styles must find their signal or
/// fail with a reason; window styles degrade to `ResponseStyle::None`
/// because the consumer can stop on an empty page.
fn classify_response(
    op: &OperationInfo,
    overrides: Option<&PaginationOverride>,
    registry: &indexmap::IndexMap<String, NamedSchemaIR>,
) -> Result<ResponsePaths, String> {
    // An explicit accessor path takes precedence over inference.
    if let Some(path) = overrides.and_then(|o| o.next_page_param_path.clone()) {
        return Ok((ResponseStyle::Cursor, None, Some(path)));
    }

    let needs_cursor = matches!(
        classify_params(&op.arguments),
        Some((ParamStyle::Cursor | ParamStyle::Relay, _))
    );

    let Some(response) = &op.response else {
        return if needs_cursor {
            Err("operation has no response schema".to_string())
        } else {
            Ok((ResponseStyle::None, None, None))
        };
    };

    // GraphQL responses are keyed by field or alias name; descend into the
    // top-level selection and prefix all paths with it.
    let mut prefix: Vec<String> = Vec::new();
    let mut shape = resolve(response, registry);
    if let Some(key) = &op.response_key {
        match find_property(shape, key) {
            Some(prop) => {
                prefix.push(key.clone());
                shape = resolve(&prop.schema, registry);
            }
            None => return Err(format!("response has no top-level key '{key}'")),
        }
    }

    if let Some((has_more, end_cursor)) = relay_connection_paths(shape, registry) {
        let mut has_more_path = prefix.clone();
        has_more_path.extend(has_more);
        let next_cursor_path = end_cursor.map(|tail| {
            let mut path = prefix.clone();
            path.extend(tail);
            path
        });
        return Ok((ResponseStyle::Relay, Some(has_more_path), next_cursor_path));
    }

    if let Some(field) = HAS_MORE_FIELDS
        .iter()
        .find(|f| find_property(shape, f).is_some())
    {
        let mut path = prefix.clone();
        path.push((*field).to_string());
        return Ok((ResponseStyle::HasMore, Some(path), None));
    }

    if let Some(field) = NEXT_CURSOR_FIELDS
        .iter()
        .find(|f| find_property(shape, f).is_some())
    {
        let mut path = prefix;
        path.push((*field).to_string());
        return Ok((ResponseStyle::Cursor, None, Some(path)));
    }

    if needs_cursor {
        Err("response shape carries no next-page signal".to_string())
    } else {
        Ok((ResponseStyle::None, None, None))
    }
}

/// Detect a Relay connection by structure: an `edges` list whose element
/// object carries `node`, and a `pageInfo` object with `hasNextPage`.
/// Returns the paths (relative to the connection) to the has-more flag and,
/// when present, the end cursor.
fn relay_connection_paths(
    shape: &SchemaIR,
    registry: &indexmap::IndexMap<String, NamedSchemaIR>,
) -> Option<(Vec<String>, Option<Vec<String>>)> {
    let edges = find_property(shape, "edges")?;
    let edges_schema = resolve(&edges.schema, registry);
    let SchemaKind::Array(element) = &edges_schema.kind else {
        return None;
    };
    find_property(resolve(element, registry), "node")?;

    let page_info = find_property(shape, "pageInfo")?;
    let page_info_schema = resolve(&page_info.schema, registry);
    find_property(page_info_schema, "hasNextPage")?;

    let has_more = vec!["pageInfo".to_string(), "hasNextPage".to_string()];
    let end_cursor = find_property(page_info_schema, "endCursor")
        .map(|_| vec!["pageInfo".to_string(), "endCursor".to_string()]);
    Some((has_more, end_cursor))
}

/// Follow `Ref` nodes through the registry, bounded against reference
/// cycles.
fn resolve<'a>(
    schema: &'a SchemaIR,
    registry: &'a indexmap::IndexMap<String, NamedSchemaIR>,
) -> &'a SchemaIR {
    let mut current = schema;
    for _ in 0..16 {
        match current.ref_name() {
            Some(name) => match registry.get(name) {
                Some(named) => current = &named.schema,
                None => return current,
            },
            None => return current,
        }
    }
    current
}

fn find_property<'a>(schema: &'a SchemaIR, name: &str) -> Option<&'a PropertyIR> {
    match &schema.kind {
        SchemaKind::Object { properties, .. } => properties.iter().find(|p| p.name == name),
        _ => None,
    }
}
