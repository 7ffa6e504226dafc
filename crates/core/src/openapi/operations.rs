//! Operation extraction from OpenAPI path items.
//!
//! GET operations become queries; POST, PUT, PATCH, and DELETE become
//! mutations. Cookie parameters are skipped, operation-level parameters
//! override path-level ones, and each operation registers its
//! operation-scoped schemas (params and inline response) on the session.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::error::CompileError;
use crate::ir::{NamedSchemaIR, PropertyIR, SchemaCategory, SchemaIR, SchemaKind};
use crate::operation::{ArgumentInfo, OperationInfo, OperationKind};
use crate::session::CompileSession;
use crate::util::{capitalize_first, sanitize_identifier};

use super::map::map_schema;
use super::spec::{MediaType, OpenApiDocument, Operation, Parameter, Schema};

/// Success statuses checked in priority order.
const RESPONSE_STATUS_PRIORITY: [&str; 8] =
    ["200", "201", "202", "203", "206", "207", "default", "2XX"];

/// HTTP methods and the operation kind they normalize to.
const METHODS: [(&str, OperationKind); 5] = [
    ("get", OperationKind::Query),
    ("post", OperationKind::Mutation),
    ("put", OperationKind::Mutation),
    ("patch", OperationKind::Mutation),
    ("delete", OperationKind::Mutation),
];

/// Extract every operation from the document, registering operation-scoped
/// named schemas along the way.
pub fn extract_operations(
    document: &OpenApiDocument,
    components: &IndexMap<String, Schema>,
    session: &mut CompileSession,
) -> Result<Vec<OperationInfo>, CompileError> {
    let mut operations = Vec::new();
    let mut seen_names = HashSet::new();

    for (path, item) in &document.paths {
        let path_params = item.parameters.as_ref();
        for (method, kind) in METHODS {
            let op = match method {
                "get" => item.get.as_ref(),
                "post" => item.post.as_ref(),
                "put" => item.put.as_ref(),
                "patch" => item.patch.as_ref(),
                _ => item.delete.as_ref(),
            };
            let Some(op) = op else { continue };

            let info = extract_operation(path, method, kind, op, path_params, components, session)?;
            if !seen_names.insert(info.name.clone()) {
                return Err(CompileError::DuplicateOperation(info.name));
            }
            operations.push(info);
        }
    }

    Ok(operations)
}

fn extract_operation(
    path: &str,
    method: &str,
    kind: OperationKind,
    op: &Operation,
    path_params: Option<&Vec<Parameter>>,
    components: &IndexMap<String, Schema>,
    session: &mut CompileSession,
) -> Result<OperationInfo, CompileError> {
    let name = operation_name(path, method, op);

    let params = merge_params(path_params, op.parameters.as_ref())?;
    let mapped: Vec<(&Parameter, SchemaIR)> = params
        .iter()
        .map(|p| (*p, param_schema(p, components, session, &name)))
        .collect();
    register_params_schema(&name, &mapped, session);

    let arguments = mapped
        .iter()
        .filter(|(p, _)| p.location == "query")
        .map(|(p, schema)| ArgumentInfo {
            name: p.name.clone(),
            variable: Some(p.name.clone()),
            schema: schema.clone(),
            required: p.required,
        })
        .collect();

    register_body_schema(&name, op, components, session);

    let response = extract_response(op, &name, components, session);
    register_response_schema(&name, response.as_ref(), session);

    Ok(OperationInfo {
        name,
        kind,
        arguments,
        response,
        response_key: None,
        pagination: None,
    })
}

/// Derive the operation identifier: the sanitized operationId when present,
/// otherwise method plus the static path segments.
fn operation_name(path: &str, method: &str, op: &Operation) -> String {
    if let Some(id) = &op.operation_id {
        return sanitize_identifier(id);
    }
    let base = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .collect::<Vec<_>>()
        .join(" ");
    sanitize_identifier(&format!("{method} {base}"))
}

/// Merge path-level and operation-level parameters. Parameter identity is
/// the (name, location) pair: a path and a query parameter may share a name.
/// Cookie parameters are skipped; operation-level entries override
/// path-level ones; duplicates within one list are a hard error.
fn merge_params<'a>(
    path_params: Option<&'a Vec<Parameter>>,
    op_params: Option<&'a Vec<Parameter>>,
) -> Result<Vec<&'a Parameter>, CompileError> {
    let mut merged: Vec<&Parameter> = Vec::new();

    if let Some(params) = path_params {
        check_duplicates(params, "path-level")?;
        merged.extend(params.iter().filter(|p| p.location != "cookie"));
    }
    if let Some(params) = op_params {
        check_duplicates(params, "operation-level")?;
        for p in params {
            if p.location == "cookie" {
                continue;
            }
            merged.retain(|existing| existing.name != p.name || existing.location != p.location);
            merged.push(p);
        }
    }

    Ok(merged)
}

fn check_duplicates(params: &[Parameter], location: &str) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for p in params {
        if p.location == "cookie" {
            continue;
        }
        if !seen.insert((&p.name, &p.location)) {
            return Err(CompileError::DuplicateParameter {
                name: p.name.clone(),
                location: location.to_string(),
            });
        }
    }
    Ok(())
}

fn param_schema(
    param: &Parameter,
    components: &IndexMap<String, Schema>,
    session: &mut CompileSession,
    op_name: &str,
) -> SchemaIR {
    param.schema.as_ref().map_or_else(SchemaIR::string, |s| {
        map_schema(
            s,
            session,
            components,
            &format!("parameter '{}' of {op_name}", param.name),
        )
    })
}

/// Register the `<Op>Params` operation-scoped schema when the operation has
/// parameters.
fn register_params_schema(
    op_name: &str,
    params: &[(&Parameter, SchemaIR)],
    session: &mut CompileSession,
) {
    if params.is_empty() {
        return;
    }
    let properties = params
        .iter()
        .map(|(p, schema)| PropertyIR {
            name: p.name.clone(),
            schema: schema.clone(),
            required: p.required,
        })
        .collect();
    let name = format!("{}Params", capitalize_first(op_name));
    session.register(NamedSchemaIR::new(
        name,
        SchemaIR::object(properties),
        SchemaCategory::Operation,
    ));
}

/// Pick the schema of the preferred media type: JSON first, then the first
/// by name for determinism.
fn json_schema(content: &HashMap<String, MediaType>) -> Option<&Schema> {
    let mut media_types: Vec<_> = content.iter().collect();
    media_types.sort_by_key(|(media, _)| *media);
    let preferred = media_types
        .iter()
        .find(|(media, _)| media.as_str() == "application/json" || media.ends_with("+json"))
        .or_else(|| media_types.first())?;
    preferred.1.schema.as_ref()
}

/// Register the `<Op>Body` operation-scoped schema for inline JSON request
/// bodies.
fn register_body_schema(
    op_name: &str,
    op: &Operation,
    components: &IndexMap<String, Schema>,
    session: &mut CompileSession,
) {
    let Some(schema) = op
        .request_body
        .as_ref()
        .and_then(|body| body.content.as_ref())
        .and_then(json_schema)
    else {
        return;
    };
    let ir = map_schema(
        schema,
        session,
        components,
        &format!("request body of {op_name}"),
    );
    if matches!(ir.kind, SchemaKind::Ref(_)) {
        return;
    }
    session.register(NamedSchemaIR::new(
        format!("{}Body", capitalize_first(op_name)),
        ir,
        SchemaCategory::Operation,
    ));
}

/// Pick the success response schema: first matching status in priority
/// order, preferring JSON media types. A 204-only operation has no
/// response schema.
fn extract_response(
    op: &Operation,
    op_name: &str,
    components: &IndexMap<String, Schema>,
    session: &mut CompileSession,
) -> Option<SchemaIR> {
    for status in RESPONSE_STATUS_PRIORITY {
        let Some(response) = op.responses.get(status) else {
            continue;
        };
        let Some(content) = &response.content else {
            continue;
        };
        if let Some(schema) = json_schema(content) {
            return Some(map_schema(
                schema,
                session,
                components,
                &format!("response of {op_name}"),
            ));
        }
    }
    None
}

/// Register the `<Op>Response` operation-scoped schema for inline response
/// shapes. A bare `Ref` response already has a named schema; re-wrapping it
/// would only add noise.
fn register_response_schema(
    op_name: &str,
    response: Option<&SchemaIR>,
    session: &mut CompileSession,
) {
    let Some(response) = response else { return };
    if matches!(response.kind, SchemaKind::Ref(_)) {
        return;
    }
    let name = format!("{}Response", capitalize_first(op_name));
    session.register(NamedSchemaIR::new(
        name,
        response.clone(),
        SchemaCategory::Operation,
    ));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::CompileConfig;

    fn document(json: serde_json::Value) -> OpenApiDocument {
        serde_json::from_value(json).unwrap()
    }

    fn extract(json: serde_json::Value) -> (Vec<OperationInfo>, CompileSession) {
        let doc = document(json);
        let mut session = CompileSession::new(CompileConfig::default());
        let components = IndexMap::new();
        let ops = extract_operations(&doc, &components, &mut session).unwrap();
        (ops, session)
    }

    #[test]
    fn test_get_is_query_others_are_mutations() {
        let (ops, _) = extract(serde_json::json!({
            "paths": {
                "/items": {
                    "get": { "operationId": "listItems", "responses": {} },
                    "post": { "operationId": "createItem", "responses": {} }
                }
            }
        }));
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].kind, OperationKind::Query);
        assert_eq!(ops[1].kind, OperationKind::Mutation);
    }

    #[test]
    fn test_operation_name_falls_back_to_method_and_path() {
        let (ops, _) = extract(serde_json::json!({
            "paths": {
                "/items/{id}/tags": { "get": { "responses": {} } }
            }
        }));
        assert_eq!(ops[0].name, "getItemsTags");
    }

    #[test]
    fn test_duplicate_operation_id_is_hard_error() {
        let doc = document(serde_json::json!({
            "paths": {
                "/a": { "get": { "operationId": "same", "responses": {} } },
                "/b": { "get": { "operationId": "same", "responses": {} } }
            }
        }));
        let mut session = CompileSession::new(CompileConfig::default());
        let err = extract_operations(&doc, &IndexMap::new(), &mut session).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateOperation(ref n) if n == "same"));
    }

    #[test]
    fn test_duplicate_parameter_is_hard_error() {
        let doc = document(serde_json::json!({
            "paths": {
                "/a": {
                    "get": {
                        "operationId": "dup",
                        "parameters": [
                            { "name": "q", "in": "query", "schema": { "type": "string" } },
                            { "name": "q", "in": "query", "schema": { "type": "string" } }
                        ],
                        "responses": {}
                    }
                }
            }
        }));
        let mut session = CompileSession::new(CompileConfig::default());
        let err = extract_operations(&doc, &IndexMap::new(), &mut session).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateParameter { .. }));
    }

    #[test]
    fn test_same_name_in_different_locations_is_not_a_collision() {
        let (ops, session) = extract(serde_json::json!({
            "paths": {
                "/items/{id}": {
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "get": {
                        "operationId": "getItem",
                        "parameters": [
                            { "name": "id", "in": "query", "schema": { "type": "string" } }
                        ],
                        "responses": {}
                    }
                }
            }
        }));
        // The query parameter must not displace the path parameter.
        assert_eq!(ops[0].arguments.len(), 1);
        assert_eq!(ops[0].arguments[0].name, "id");

        let registry = session.registry();
        let SchemaKind::Object { properties, .. } = &registry["GetItemParams"].schema.kind else {
            panic!("expected params object");
        };
        assert_eq!(properties.len(), 2);
    }

    #[test]
    fn test_cookie_params_skipped_and_query_params_become_arguments() {
        let (ops, session) = extract(serde_json::json!({
            "paths": {
                "/items": {
                    "get": {
                        "operationId": "listItems",
                        "parameters": [
                            { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                            { "name": "session", "in": "cookie", "schema": { "type": "string" } }
                        ],
                        "responses": {}
                    }
                }
            }
        }));
        assert_eq!(ops[0].arguments.len(), 1);
        assert_eq!(ops[0].arguments[0].name, "limit");
        assert!(session.registry().contains_key("ListItemsParams"));
    }

    #[test]
    fn test_response_priority_and_204_void() {
        let (ops, _) = extract(serde_json::json!({
            "paths": {
                "/items": {
                    "get": {
                        "operationId": "listItems",
                        "responses": {
                            "200": { "content": { "application/json": { "schema": { "type": "array", "items": { "type": "string" } } } } }
                        }
                    },
                    "delete": {
                        "operationId": "clearItems",
                        "responses": { "204": {} }
                    }
                }
            }
        }));
        assert!(ops[0].response.is_some());
        assert!(ops[1].response.is_none());
    }

    #[test]
    fn test_inline_request_body_registered() {
        let (_, session) = extract(serde_json::json!({
            "paths": {
                "/items": {
                    "post": {
                        "operationId": "createItem",
                        "requestBody": { "content": { "application/json": { "schema": {
                            "type": "object",
                            "properties": { "name": { "type": "string" } },
                            "required": ["name"]
                        } } } },
                        "responses": { "204": {} }
                    }
                }
            }
        }));
        assert!(session.registry().contains_key("CreateItemBody"));
    }

    #[test]
    fn test_inline_response_registered_ref_response_not() {
        let (_, session) = extract(serde_json::json!({
            "paths": {
                "/items": {
                    "get": {
                        "operationId": "listItems",
                        "responses": {
                            "200": { "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "items": { "type": "array", "items": { "type": "string" } } }
                            } } } }
                        }
                    }
                }
            }
        }));
        assert!(session.registry().contains_key("ListItemsResponse"));
    }
}
