//! Operation and fragment handling for the GraphQL front-end.
//!
//! Fragments map to named schemas first, so spreads resolve to `Ref` nodes.
//! Each query or mutation then maps its selection set against the root
//! operation type, registers its operation-scoped `<Op>Variables` and
//! `<Op>Response` schemas, and records the call-site argument bindings the
//! pagination analyzer needs. Subscriptions are skipped; the binding layer
//! has no subscription surface.

use std::collections::HashSet;

use graphql_parser::query::{
    Definition, Field as FieldSelection, OperationDefinition, Selection, SelectionSet, Type,
    TypeCondition, Value, VariableDefinition,
};
use tracing::debug;

use crate::error::{CompileError, Warning};
use crate::ir::{
    NamedSchemaIR, PropertyIR, SchemaCategory, SchemaIR, SchemaKind, intersection_of,
};
use crate::operation::{ArgumentInfo, OperationInfo, OperationKind};
use crate::session::CompileSession;
use crate::util::{capitalize_first, sanitize_identifier};

use super::QueryDocument;
use super::index::SchemaIndex;
use super::map::{is_required, map_type};

/// Extract every operation from an executable document, registering
/// fragment and operation-scoped schemas along the way.
pub fn extract_operations(
    document: &QueryDocument<'_>,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
) -> Result<Vec<OperationInfo>, CompileError> {
    let fragment_names: HashSet<String> = document
        .definitions
        .iter()
        .filter_map(|def| match def {
            Definition::Fragment(frag) => Some(frag.name.clone()),
            Definition::Operation(_) => None,
        })
        .collect();

    // Fragments first: spreads inside operations resolve to these names.
    for def in &document.definitions {
        let Definition::Fragment(frag) = def else {
            continue;
        };
        let TypeCondition::On(on_type) = &frag.type_condition;
        let schema = map_selection_set(
            &frag.selection_set,
            on_type,
            index,
            session,
            &fragment_names,
            &frag.name,
        )?;
        session.register(NamedSchemaIR::new(
            frag.name.clone(),
            schema,
            SchemaCategory::Fragment,
        ));
    }

    let mut operations = Vec::new();
    let mut seen_names = HashSet::new();
    for def in &document.definitions {
        let Definition::Operation(op) = def else {
            continue;
        };
        let info = match op {
            OperationDefinition::Query(q) => extract_operation(
                q.name.as_deref(),
                OperationKind::Query,
                &q.variable_definitions,
                &q.selection_set,
                index,
                session,
                &fragment_names,
            )?,
            OperationDefinition::SelectionSet(set) => extract_operation(
                None,
                OperationKind::Query,
                &[],
                set,
                index,
                session,
                &fragment_names,
            )?,
            OperationDefinition::Mutation(m) => extract_operation(
                m.name.as_deref(),
                OperationKind::Mutation,
                &m.variable_definitions,
                &m.selection_set,
                index,
                session,
                &fragment_names,
            )?,
            OperationDefinition::Subscription(s) => {
                debug!(name = ?s.name, "skipping subscription operation");
                continue;
            }
        };
        if !seen_names.insert(info.name.clone()) {
            return Err(CompileError::DuplicateOperation(info.name));
        }
        operations.push(info);
    }

    Ok(operations)
}

#[allow(clippy::too_many_arguments)]
fn extract_operation(
    name: Option<&str>,
    kind: OperationKind,
    variables: &[VariableDefinition<'_, String>],
    selection_set: &SelectionSet<'_, String>,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    fragment_names: &HashSet<String>,
) -> Result<OperationInfo, CompileError> {
    let fallback = match kind {
        OperationKind::Query => "query",
        OperationKind::Mutation => "mutation",
    };
    let name = sanitize_identifier(name.unwrap_or(fallback));

    register_variables_schema(&name, variables, index, session);

    let root_type = match kind {
        OperationKind::Query => index.query_type().to_string(),
        OperationKind::Mutation => index.mutation_type().to_string(),
    };
    let response = map_selection_set(
        selection_set,
        &root_type,
        index,
        session,
        fragment_names,
        &name,
    )?;
    register_response_schema(&name, &response, session);

    // The first top-level field carries the response key and the argument
    // bindings pagination needs.
    let first_field = selection_set.items.iter().find_map(|item| match item {
        Selection::Field(field) => Some(field),
        _ => None,
    });
    let response_key =
        first_field.map(|f| f.alias.clone().unwrap_or_else(|| f.name.clone()));
    let arguments = match first_field {
        Some(field) => extract_arguments(field, &root_type, index, session),
        None => Vec::new(),
    };

    Ok(OperationInfo {
        name,
        kind,
        arguments,
        response: Some(response),
        response_key,
        pagination: None,
    })
}

/// Schema-defined arguments of the selected field, each mapped back to the
/// variable the document actually binds. A literal or missing binding leaves
/// `variable` unset.
fn extract_arguments(
    field: &FieldSelection<'_, String>,
    root_type: &str,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
) -> Vec<ArgumentInfo> {
    let Some(def) = index.field(root_type, &field.name) else {
        return Vec::new();
    };
    def.arguments
        .iter()
        .map(|arg| {
            let bound = field.arguments.iter().find(|(name, _)| *name == arg.name);
            let variable = bound.and_then(|(_, value)| match value {
                Value::Variable(var) => Some(var.clone()),
                _ => None,
            });
            ArgumentInfo {
                name: arg.name.clone(),
                variable,
                schema: map_type(
                    &arg.value_type,
                    index,
                    session,
                    &format!("argument '{}' of field '{}'", arg.name, field.name),
                ),
                required: is_required(&arg.value_type, arg.default_value.is_some()),
            }
        })
        .collect()
}

fn register_variables_schema(
    op_name: &str,
    variables: &[VariableDefinition<'_, String>],
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
) {
    if variables.is_empty() {
        return;
    }
    let properties = variables
        .iter()
        .map(|var| PropertyIR {
            name: var.name.clone(),
            schema: map_type(
                &var.var_type,
                index,
                session,
                &format!("variable '${}' of {op_name}", var.name),
            ),
            required: is_required(&var.var_type, var.default_value.is_some()),
        })
        .collect();
    session.register(NamedSchemaIR::new(
        format!("{}Variables", capitalize_first(op_name)),
        SchemaIR::object(properties),
        SchemaCategory::Operation,
    ));
}

fn register_response_schema(op_name: &str, response: &SchemaIR, session: &mut CompileSession) {
    if matches!(response.kind, SchemaKind::Ref(_)) {
        return;
    }
    session.register(NamedSchemaIR::new(
        format!("{}Response", capitalize_first(op_name)),
        response.clone(),
        SchemaCategory::Operation,
    ));
}

/// Map a selection set against its parent type.
///
/// Own fields become required properties (a selected field is always present
/// in the response; absence of a value is nullability, not optionality).
/// Fragment spreads become intersection members referencing the fragment
/// schema; a spread-only selection collapses to the bare `Ref`. Fields from
/// type-conditioned inline fragments merge in as optional.
fn map_selection_set(
    set: &SelectionSet<'_, String>,
    parent: &str,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    fragment_names: &HashSet<String>,
    owner: &str,
) -> Result<SchemaIR, CompileError> {
    let mut properties: Vec<PropertyIR> = Vec::new();
    let mut spreads: Vec<SchemaIR> = Vec::new();

    for item in &set.items {
        match item {
            Selection::Field(field) => {
                let key = field.alias.clone().unwrap_or_else(|| field.name.clone());
                let schema = map_field(field, parent, index, session, fragment_names, owner)?;
                properties.push(PropertyIR {
                    name: key,
                    schema,
                    required: true,
                });
            }
            Selection::FragmentSpread(spread) => {
                if !fragment_names.contains(&spread.fragment_name) {
                    return Err(CompileError::UndefinedFragment {
                        operation: owner.to_string(),
                        fragment: spread.fragment_name.clone(),
                    });
                }
                spreads.push(SchemaIR::reference(spread.fragment_name.clone()));
            }
            Selection::InlineFragment(inline) => {
                let on_type = match &inline.type_condition {
                    Some(TypeCondition::On(ty)) => ty.as_str(),
                    None => parent,
                };
                let mapped = map_selection_set(
                    &inline.selection_set,
                    on_type,
                    index,
                    session,
                    fragment_names,
                    owner,
                )?;
                match mapped.kind {
                    SchemaKind::Object {
                        properties: inline_props,
                        ..
                    } => {
                        // Type-conditioned fields may be absent at runtime.
                        properties.extend(inline_props.into_iter().map(|mut p| {
                            p.required = false;
                            p
                        }));
                    }
                    _ => spreads.push(mapped),
                }
            }
        }
    }

    let mut members = Vec::new();
    if !properties.is_empty() || spreads.is_empty() {
        members.push(SchemaIR::object(properties));
    }
    members.extend(spreads);
    Ok(intersection_of(members))
}

fn map_field(
    field: &FieldSelection<'_, String>,
    parent: &str,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    fragment_names: &HashSet<String>,
    owner: &str,
) -> Result<SchemaIR, CompileError> {
    if field.name == "__typename" {
        return Ok(SchemaIR::string());
    }
    let Some(def) = index.field(parent, &field.name) else {
        session.push_warning(Warning::UnknownField {
            parent: parent.to_string(),
            field: field.name.clone(),
        });
        return Ok(SchemaIR::unknown());
    };
    if field.selection_set.items.is_empty() {
        Ok(map_type(
            &def.field_type,
            index,
            session,
            &format!("field '{}' of {parent}", field.name),
        ))
    } else {
        map_composite_type(
            &def.field_type,
            &field.selection_set,
            index,
            session,
            fragment_names,
            owner,
        )
    }
}

/// Map a field type that carries a sub-selection, preserving list and
/// non-null wrappers down to the named composite type.
fn map_composite_type(
    ty: &Type<'_, String>,
    set: &SelectionSet<'_, String>,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    fragment_names: &HashSet<String>,
    owner: &str,
) -> Result<SchemaIR, CompileError> {
    match ty {
        Type::NonNullType(inner) => {
            map_composite_base(inner, set, index, session, fragment_names, owner)
        }
        _ => Ok(map_composite_base(ty, set, index, session, fragment_names, owner)?.nullable()),
    }
}

fn map_composite_base(
    ty: &Type<'_, String>,
    set: &SelectionSet<'_, String>,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    fragment_names: &HashSet<String>,
    owner: &str,
) -> Result<SchemaIR, CompileError> {
    match ty {
        Type::NamedType(name) => {
            if index.get(name).is_none() {
                session.push_warning(Warning::UnknownTypeRef {
                    name: name.clone(),
                    context: format!("selection in {owner}"),
                });
                return Ok(SchemaIR::unknown());
            }
            map_selection_set(set, name, index, session, fragment_names, owner)
        }
        Type::ListType(element) => Ok(SchemaIR::array(map_composite_type(
            element,
            set,
            index,
            session,
            fragment_names,
            owner,
        )?)),
        Type::NonNullType(inner) => {
            map_composite_base(inner, set, index, session, fragment_names, owner)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::CompileConfig;
    use graphql_parser::{parse_query, parse_schema};

    const SDL: &str = r"
        type Query {
            user(id: ID!): User
            users(first: Int, after: String): UserConnection!
        }
        type Mutation {
            createUser(input: CreateUserInput!): User
        }
        type Subscription {
            userCreated: User!
        }
        type User {
            id: ID!
            name: String!
            email: String
            posts: [Post!]!
        }
        type Post { id: ID!, title: String! }
        type UserConnection {
            edges: [UserEdge!]!
            pageInfo: PageInfo!
        }
        type UserEdge { node: User!, cursor: String! }
        type PageInfo { hasNextPage: Boolean!, endCursor: String }
        input CreateUserInput { name: String! }
    ";

    fn extract(source: &str) -> Result<(Vec<OperationInfo>, CompileSession), CompileError> {
        let schema = parse_schema::<String>(SDL).unwrap();
        let index = SchemaIndex::build(&schema);
        let document = parse_query::<String>(source).unwrap();
        let mut session = CompileSession::new(CompileConfig::default());
        let ops = extract_operations(&document, &index, &mut session)?;
        Ok((ops, session))
    }

    #[test]
    fn test_selection_maps_to_response_object() {
        let (ops, _) = extract(
            "query GetUser($id: ID!) { user(id: $id) { id name email } }",
        )
        .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "GetUser");
        assert_eq!(ops[0].kind, OperationKind::Query);
        assert_eq!(ops[0].response_key.as_deref(), Some("user"));

        let response = ops[0].response.as_ref().unwrap();
        let SchemaKind::Object { properties, .. } = &response.kind else {
            panic!("expected object response");
        };
        // `user: User` is nullable in the schema.
        assert!(properties[0].schema.nullable);
        let SchemaKind::Object { properties: user, .. } = &properties[0].schema.kind else {
            panic!("expected user object");
        };
        assert_eq!(user[0].name, "id");
        assert_eq!(user[0].schema, SchemaIR::string());
        assert_eq!(user[2].name, "email");
        assert!(user[2].schema.nullable);
    }

    #[test]
    fn test_alias_keys_response_and_argument_bindings() {
        let (ops, _) = extract(
            "query ListUsers($cursor: String) {
                people: users(first: 10, after: $cursor) {
                    edges { node { id } cursor }
                    pageInfo { hasNextPage endCursor }
                }
            }",
        )
        .unwrap();
        let op = &ops[0];
        assert_eq!(op.response_key.as_deref(), Some("people"));

        // `first` is bound to a literal, `after` to the $cursor variable.
        assert_eq!(op.arguments.len(), 2);
        assert_eq!(op.arguments[0].name, "first");
        assert_eq!(op.arguments[0].variable, None);
        assert_eq!(op.arguments[1].name, "after");
        assert_eq!(op.arguments[1].variable.as_deref(), Some("cursor"));
    }

    #[test]
    fn test_variables_schema_registered() {
        let (_, session) = extract(
            "query GetUser($id: ID!, $verbose: Boolean) { user(id: $id) { id } }",
        )
        .unwrap();
        let registry = session.registry();
        let SchemaKind::Object { properties, .. } = &registry["GetUserVariables"].schema.kind
        else {
            panic!("expected variables object");
        };
        assert_eq!(properties[0].name, "id");
        assert!(properties[0].required);
        assert_eq!(properties[1].name, "verbose");
        assert!(!properties[1].required);
        assert!(registry.contains_key("GetUserResponse"));
    }

    #[test]
    fn test_fragment_spread_collapses_to_ref() {
        let (ops, session) = extract(
            "fragment UserFields on User { id name }
             query GetUser($id: ID!) { user(id: $id) { ...UserFields } }",
        )
        .unwrap();
        let registry = session.registry();
        assert_eq!(registry["UserFields"].category, SchemaCategory::Fragment);

        let response = ops[0].response.as_ref().unwrap();
        let SchemaKind::Object { properties, .. } = &response.kind else {
            panic!("expected object response");
        };
        // Spread-only selection collapses to the fragment ref.
        assert_eq!(
            properties[0].schema,
            SchemaIR::reference("UserFields").nullable()
        );
    }

    #[test]
    fn test_undefined_fragment_is_hard_error() {
        let err = extract("query GetUser { user(id: \"1\") { ...Missing } }").unwrap_err();
        assert!(matches!(
            err,
            CompileError::UndefinedFragment { ref fragment, .. } if fragment == "Missing"
        ));
    }

    #[test]
    fn test_inline_fragment_fields_merge_as_optional() {
        let (ops, _) = extract(
            "query GetUser { user(id: \"1\") { id ... on User { email } } }",
        )
        .unwrap();
        let response = ops[0].response.as_ref().unwrap();
        let SchemaKind::Object { properties, .. } = &response.kind else {
            panic!("expected object");
        };
        let SchemaKind::Object { properties: user, .. } = &properties[0].schema.kind else {
            panic!("expected user object");
        };
        assert!(user[0].required);
        assert_eq!(user[1].name, "email");
        assert!(!user[1].required);
    }

    #[test]
    fn test_typename_and_unknown_field() {
        let (ops, session) = extract(
            "query GetUser { user(id: \"1\") { __typename nickname } }",
        )
        .unwrap();
        let response = ops[0].response.as_ref().unwrap();
        let SchemaKind::Object { properties, .. } = &response.kind else {
            panic!("expected object");
        };
        let SchemaKind::Object { properties: user, .. } = &properties[0].schema.kind else {
            panic!("expected user object");
        };
        assert_eq!(user[0].schema, SchemaIR::string());
        assert!(user[1].schema.is_unknown());
        assert!(matches!(
            session.warnings()[0],
            Warning::UnknownField { ref field, .. } if field == "nickname"
        ));
    }

    #[test]
    fn test_subscriptions_skipped_and_duplicates_rejected() {
        let (ops, _) = extract(
            "subscription Watch { userCreated { id } }
             query GetUser { user(id: \"1\") { id } }",
        )
        .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "GetUser");

        let err = extract(
            "query Same { user(id: \"1\") { id } }
             query Same { user(id: \"2\") { id } }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateOperation(ref n) if n == "Same"));
    }

    #[test]
    fn test_mutation_input_object_registered_lazily() {
        let (ops, mut session) = extract(
            "mutation CreateUser($input: CreateUserInput!) {
                createUser(input: $input) { id }
            }",
        )
        .unwrap();
        assert_eq!(ops[0].kind, OperationKind::Mutation);
        assert_eq!(
            ops[0].arguments[0].schema,
            SchemaIR::reference("CreateUserInput")
        );

        let schema = parse_schema::<String>(SDL).unwrap();
        let index = SchemaIndex::build(&schema);
        super::super::map::drain_pending(&index, &mut session);
        assert!(session.registry().contains_key("CreateUserInput"));
    }
}
