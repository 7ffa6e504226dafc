//! End-to-end compiles over literal documents.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use bindery_core::{
    CompileConfig, CompileOutput, MutationKind, OperationKind, ParamStyle, ResponseStyle,
    SchemaIR, SchemaKind, compile_graphql_source, compile_openapi_json, default_value,
};
use indexmap::IndexMap;
use serde_json::json;

const OPENAPI_JSON: &str = r##"{
    "openapi": "3.0.3",
    "paths": {
        "/users": {
            "get": {
                "operationId": "listUsers",
                "parameters": [
                    { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                    { "name": "offset", "in": "query", "schema": { "type": "integer" } }
                ],
                "responses": {
                    "200": {
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "items": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/User" }
                                        },
                                        "has_more": { "type": "boolean" }
                                    },
                                    "required": ["items", "has_more"]
                                }
                            }
                        }
                    }
                }
            },
            "post": {
                "operationId": "createUser",
                "responses": {
                    "200": {
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/User" }
                            }
                        }
                    }
                }
            }
        },
        "/users/{id}": {
            "delete": {
                "operationId": "deleteUser",
                "responses": { "204": {} }
            }
        }
    },
    "components": {
        "schemas": {
            "User": {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "name": { "type": "string" },
                    "role": { "$ref": "#/components/schemas/Role" }
                },
                "required": ["id", "name"]
            },
            "Role": { "type": "string", "enum": ["admin", "member"] }
        }
    }
}"##;

const GRAPHQL_SDL: &str = r"
    type Query {
        users(first: Int, after: String): UserConnection!
    }
    type Mutation {
        createUser(input: CreateUserInput!): User!
        removeUser(id: ID!): Boolean!
    }
    type User {
        id: ID!
        name: String!
        tags: [String]!
    }
    type UserConnection {
        edges: [UserEdge!]!
        pageInfo: PageInfo!
    }
    type UserEdge { node: User!, cursor: String! }
    type PageInfo { hasNextPage: Boolean!, endCursor: String }
    input CreateUserInput { name: String! }
";

const GRAPHQL_OPERATIONS: &str = r"
    fragment UserRow on User { id name tags }
    query Users($after: String) {
        users(first: 20, after: $after) {
            edges { node { ...UserRow } }
            pageInfo { hasNextPage endCursor }
        }
    }
    mutation CreateUser($input: CreateUserInput!) {
        createUser(input: $input) { ...UserRow }
    }
    mutation RemoveUser($id: ID!) {
        removeUser(id: $id)
    }
";

fn compile_openapi_fixture() -> CompileOutput {
    compile_openapi_json(OPENAPI_JSON, CompileConfig::default()).unwrap()
}

fn compile_graphql_fixture() -> CompileOutput {
    compile_graphql_source(GRAPHQL_SDL, GRAPHQL_OPERATIONS, CompileConfig::default()).unwrap()
}

fn registry_of(output: &CompileOutput) -> IndexMap<String, bindery_core::NamedSchemaIR> {
    output
        .schemas
        .iter()
        .map(|named| (named.name.clone(), named.clone()))
        .collect()
}

#[test]
fn test_openapi_compile_is_idempotent() {
    let first = serde_json::to_value(compile_openapi_fixture()).unwrap();
    let second = serde_json::to_value(compile_openapi_fixture()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_graphql_compile_is_idempotent() {
    let first = serde_json::to_value(compile_graphql_fixture()).unwrap();
    let second = serde_json::to_value(compile_graphql_fixture()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_openapi_schemas_are_dependency_ordered() {
    let output = compile_openapi_fixture();
    assert!(output.warnings.is_empty());

    let position = |name: &str| {
        output
            .schemas
            .iter()
            .position(|s| s.name == name)
            .unwrap_or_else(|| panic!("schema '{name}' missing from output"))
    };
    // Role is a dependency of User and must come first.
    assert!(position("Role") < position("User"));

    for (index, named) in output.schemas.iter().enumerate() {
        for dep in &named.dependencies {
            if let Some(dep_index) = output.schemas.iter().position(|s| &s.name == dep) {
                assert!(
                    dep_index < index,
                    "dependency '{dep}' of '{}' emitted after it",
                    named.name
                );
            }
        }
    }
}

#[test]
fn test_openapi_offset_pagination() {
    let output = compile_openapi_fixture();
    let list = output
        .operations
        .iter()
        .find(|op| op.name == "listUsers")
        .unwrap();
    assert_eq!(list.kind, OperationKind::Query);

    let info = list.pagination.as_ref().unwrap();
    assert_eq!(info.param_style, ParamStyle::Offset);
    assert_eq!(info.page_param_name, "offset");
    assert_eq!(info.initial_page_param, Some(json!(0)));
    assert_eq!(info.response_style, ResponseStyle::HasMore);
    assert_eq!(info.has_more_path, Some(vec!["has_more".to_string()]));
}

#[test]
fn test_openapi_collection_discovery() {
    let output = compile_openapi_fixture();
    assert_eq!(output.collections.len(), 1);

    let collection = &output.collections[0];
    assert_eq!(collection.entity_name, "user");
    assert_eq!(collection.type_name, "User");
    assert_eq!(collection.key_field, "id");
    assert_eq!(collection.list_operation, "listUsers");
    assert_eq!(collection.selector_path, vec!["items".to_string()]);

    let kinds: Vec<_> = collection
        .mutations
        .iter()
        .map(|m| (m.kind, m.operation_name.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (MutationKind::Insert, "createUser"),
            (MutationKind::Delete, "deleteUser"),
        ]
    );
}

#[test]
fn test_openapi_default_synthesis_from_compiled_ir() {
    let output = compile_openapi_fixture();
    let registry = registry_of(&output);
    // Optional `role` is omitted entirely, not null.
    assert_eq!(
        default_value(&SchemaIR::reference("User"), &registry),
        json!({ "id": "", "name": "" })
    );
}

#[test]
fn test_cyclic_components_compile_and_emit_once() {
    let source = r##"{
        "paths": {},
        "components": {
            "schemas": {
                "A": {
                    "type": "object",
                    "properties": { "b": { "$ref": "#/components/schemas/B" } }
                },
                "B": {
                    "type": "object",
                    "properties": { "a": { "$ref": "#/components/schemas/A" } }
                }
            }
        }
    }"##;
    let output = compile_openapi_json(source, CompileConfig::default()).unwrap();
    let names: Vec<_> = output.schemas.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names.iter().filter(|n| **n == "A").count(), 1);
    assert_eq!(names.iter().filter(|n| **n == "B").count(), 1);
}

#[test]
fn test_graphql_relay_pagination_with_response_key() {
    let output = compile_graphql_fixture();
    assert!(output.warnings.is_empty());

    let users = output
        .operations
        .iter()
        .find(|op| op.name == "Users")
        .unwrap();
    let info = users.pagination.as_ref().unwrap();
    assert_eq!(info.param_style, ParamStyle::Relay);
    assert_eq!(info.response_style, ResponseStyle::Relay);
    assert_eq!(info.page_param_name, "after");
    assert_eq!(info.initial_page_param, None);
    assert_eq!(
        info.has_more_path,
        Some(vec![
            "users".to_string(),
            "pageInfo".to_string(),
            "hasNextPage".to_string()
        ])
    );
    assert_eq!(
        info.next_cursor_path,
        Some(vec![
            "users".to_string(),
            "pageInfo".to_string(),
            "endCursor".to_string()
        ])
    );
}

#[test]
fn test_graphql_fragment_nullability_shape() {
    let output = compile_graphql_fixture();
    let registry = registry_of(&output);
    let fragment = &registry["UserRow"];

    let SchemaKind::Object { properties, .. } = &fragment.schema.kind else {
        panic!("expected fragment object");
    };
    // tags: [String]! is a required list of nullable strings.
    let tags = properties.iter().find(|p| p.name == "tags").unwrap();
    assert_eq!(tags.schema, SchemaIR::array(SchemaIR::string().nullable()));
}

#[test]
fn test_graphql_collection_over_relay_edges() {
    let output = compile_graphql_fixture();
    let collection = output
        .collections
        .iter()
        .find(|c| c.type_name == "UserRow")
        .unwrap();
    assert_eq!(collection.list_operation, "Users");
    assert_eq!(
        collection.selector_path,
        vec!["users".to_string(), "edges".to_string()]
    );
}

#[test]
fn test_graphql_operation_scoped_schemas_registered() {
    let output = compile_graphql_fixture();
    let registry = registry_of(&output);
    assert!(registry.contains_key("UsersVariables"));
    assert!(registry.contains_key("UsersResponse"));
    assert!(registry.contains_key("CreateUserInput"));

    let SchemaKind::Object { properties, .. } = &registry["UsersVariables"].schema.kind else {
        panic!("expected variables object");
    };
    assert_eq!(properties[0].name, "after");
    assert!(!properties[0].required);
    assert!(properties[0].schema.nullable);
}
