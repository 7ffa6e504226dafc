//! Reactive-collection discovery.
//!
//! Pairs component entity types with the operations that serve them: a list
//! query whose response contains an array of the entity (the selector path
//! locates that array) and the mutations whose names reference the entity.
//! An entity without a list query simply produces no binding; absence of a
//! collection is an ordinary outcome, not a warning.

use indexmap::IndexMap;
use serde::Serialize;

use crate::ir::{NamedSchemaIR, SchemaCategory, SchemaIR, SchemaKind};
use crate::operation::{OperationInfo, OperationKind};
use crate::session::CompileSession;
use crate::util::{lowercase_first, to_snake_case};

/// Bound on ref-chain traversal, matching the pagination analyzer.
const MAX_REF_DEPTH: usize = 16;

/// A discovered entity collection and its serving operations.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionBinding {
    /// Binding-side entity identifier (lowercased type name).
    pub entity_name: String,
    /// Named schema backing the entity.
    pub type_name: String,
    /// Property uniquely identifying one row.
    pub key_field: String,
    /// Query operation whose response lists the entity.
    pub list_operation: String,
    /// Property path from the response root to the entity array.
    pub selector_path: Vec<String>,
    /// Mutations that write this entity.
    pub mutations: Vec<MutationBinding>,
}

/// One mutation serving a collection.
#[derive(Debug, Clone, Serialize)]
pub struct MutationBinding {
    /// What the mutation does to the collection.
    pub kind: MutationKind,
    /// Operation identifier.
    pub operation_name: String,
}

/// Collection write classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    /// Creates a row.
    Insert,
    /// Modifies a row.
    Update,
    /// Removes a row.
    Delete,
}

const INSERT_PATTERNS: [&str; 3] = ["create", "insert", "add"];
const UPDATE_PATTERNS: [&str; 3] = ["update", "edit", "patch"];
const DELETE_PATTERNS: [&str; 2] = ["delete", "remove"];

/// Discover collection bindings from the compiled operations and registry.
pub fn discover_collections(
    operations: &[OperationInfo],
    session: &CompileSession,
) -> Vec<CollectionBinding> {
    let registry = session.registry();
    let mut bindings = Vec::new();

    for (type_name, named) in registry {
        // Components carry REST entity shapes; fragments carry the selected
        // row shapes on the GraphQL side.
        if !matches!(
            named.category,
            SchemaCategory::Component | SchemaCategory::Fragment
        ) {
            continue;
        }
        let key_field = session.config().key_field(type_name);
        if !has_property(&named.schema, key_field) {
            continue;
        }

        let Some((list_operation, selector_path)) =
            find_list_query(type_name, operations, registry, session)
        else {
            continue;
        };

        bindings.push(CollectionBinding {
            entity_name: lowercase_first(type_name),
            type_name: type_name.clone(),
            key_field: key_field.to_string(),
            list_operation,
            selector_path,
            mutations: classify_mutations(type_name, operations),
        });
    }

    bindings
}

fn has_property(schema: &SchemaIR, name: &str) -> bool {
    matches!(
        &schema.kind,
        SchemaKind::Object { properties, .. } if properties.iter().any(|p| p.name == name)
    )
}

/// First query whose response contains an array of the entity, together with
/// the property path leading to that array. A configured selector path takes
/// precedence over the inferred one.
fn find_list_query(
    entity: &str,
    operations: &[OperationInfo],
    registry: &IndexMap<String, NamedSchemaIR>,
    session: &CompileSession,
) -> Option<(String, Vec<String>)> {
    let override_path = session.config().selector_paths.get(entity);

    for op in operations {
        if op.kind != OperationKind::Query {
            continue;
        }
        let Some(response) = &op.response else {
            continue;
        };
        if let Some(path) = entity_array_path(response, entity, registry, 0) {
            let path = override_path.cloned().unwrap_or(path);
            return Some((op.name.clone(), path));
        }
    }
    None
}

/// Property path from a response schema to an array of the entity, searched
/// in declaration order. Accepts both a direct array of entity refs and a
/// Relay `edges` array whose element object carries a `node` ref; the path
/// points at the array in both cases.
fn entity_array_path(
    schema: &SchemaIR,
    entity: &str,
    registry: &IndexMap<String, NamedSchemaIR>,
    depth: usize,
) -> Option<Vec<String>> {
    if depth > MAX_REF_DEPTH {
        return None;
    }
    match &schema.kind {
        SchemaKind::Array(element) => {
            if is_entity(element, entity, registry) || is_entity_edge(element, entity, registry) {
                Some(Vec::new())
            } else {
                None
            }
        }
        SchemaKind::Object { properties, .. } => properties.iter().find_map(|p| {
            entity_array_path(&p.schema, entity, registry, depth + 1).map(|mut path| {
                path.insert(0, p.name.clone());
                path
            })
        }),
        SchemaKind::Ref(name) => registry
            .get(name)
            .and_then(|named| entity_array_path(&named.schema, entity, registry, depth + 1)),
        _ => None,
    }
}

fn is_entity(schema: &SchemaIR, entity: &str, registry: &IndexMap<String, NamedSchemaIR>) -> bool {
    let mut current = schema;
    for _ in 0..MAX_REF_DEPTH {
        match &current.kind {
            SchemaKind::Ref(name) if name == entity => return true,
            SchemaKind::Ref(name) => match registry.get(name) {
                Some(named) => current = &named.schema,
                None => return false,
            },
            _ => return false,
        }
    }
    false
}

fn is_entity_edge(
    schema: &SchemaIR,
    entity: &str,
    registry: &IndexMap<String, NamedSchemaIR>,
) -> bool {
    let resolved = resolve(schema, registry);
    match &resolved.kind {
        SchemaKind::Object { properties, .. } => properties
            .iter()
            .any(|p| p.name == "node" && is_entity(&p.schema, entity, registry)),
        _ => false,
    }
}

fn resolve<'a>(
    schema: &'a SchemaIR,
    registry: &'a IndexMap<String, NamedSchemaIR>,
) -> &'a SchemaIR {
    let mut current = schema;
    for _ in 0..MAX_REF_DEPTH {
        match &current.kind {
            SchemaKind::Ref(name) => match registry.get(name) {
                Some(named) => current = &named.schema,
                None => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Classify mutations whose name references the entity.
fn classify_mutations(entity: &str, operations: &[OperationInfo]) -> Vec<MutationBinding> {
    let entity_snake = to_snake_case(entity);
    let mut mutations = Vec::new();

    for op in operations {
        if op.kind != OperationKind::Mutation {
            continue;
        }
        let name_snake = to_snake_case(&op.name);
        if !name_snake.contains(&entity_snake) {
            continue;
        }
        let kind = if INSERT_PATTERNS.iter().any(|p| name_snake.contains(p)) {
            MutationKind::Insert
        } else if UPDATE_PATTERNS.iter().any(|p| name_snake.contains(p)) {
            MutationKind::Update
        } else if DELETE_PATTERNS.iter().any(|p| name_snake.contains(p)) {
            MutationKind::Delete
        } else {
            continue;
        };
        mutations.push(MutationBinding {
            kind,
            operation_name: op.name.clone(),
        });
    }

    mutations
}
