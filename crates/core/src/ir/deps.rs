//! Dependency extraction and topological ordering of named schemas.
//!
//! `Ref` names are the only edges: the graph owns names, never pointers
//! into schema nodes, so it can be rebuilt cheaply per compile pass.

use std::collections::{BTreeSet, HashMap};

use super::{NamedSchemaIR, ObjectMode, SchemaIR, SchemaKind};

/// Collect every named schema reachable from `schema`.
///
/// Walks object properties (including catchall fallbacks), array elements,
/// union and intersection members, and record value types. Record keys are
/// always primitive and are not walked.
pub fn extract_dependencies(schema: &SchemaIR) -> BTreeSet<String> {
    let mut deps = BTreeSet::new();
    collect_refs(schema, &mut deps);
    deps
}

fn collect_refs(schema: &SchemaIR, deps: &mut BTreeSet<String>) {
    match &schema.kind {
        SchemaKind::Ref(name) => {
            deps.insert(name.clone());
        }
        SchemaKind::Object { properties, mode } => {
            for prop in properties {
                collect_refs(&prop.schema, deps);
            }
            if let ObjectMode::Catchall(fallback) = mode {
                collect_refs(fallback, deps);
            }
        }
        SchemaKind::Array(element) => collect_refs(element, deps),
        SchemaKind::Union(members) | SchemaKind::Intersection(members) => {
            for member in members {
                collect_refs(member, deps);
            }
        }
        SchemaKind::Record { value, .. } => collect_refs(value, deps),
        SchemaKind::String { .. }
        | SchemaKind::Number { .. }
        | SchemaKind::Boolean
        | SchemaKind::Enum(_)
        | SchemaKind::Literal(_)
        | SchemaKind::Raw(_)
        | SchemaKind::Unknown => {}
    }
}

/// Visit state for the depth-first ordering walk.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Order named schemas so every dependency precedes its dependents.
///
/// Cycles must not crash or loop: a back-edge to an in-progress node is
/// skipped, so members of a cyclic component come out in first-seen order
/// and forward references are left to the emitter. Names not present in the
/// input (external or unresolved refs) are ignored. Every input schema
/// appears exactly once in the output.
pub fn topological_sort(schemas: Vec<NamedSchemaIR>) -> Vec<NamedSchemaIR> {
    let index: HashMap<String, usize> = schemas
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.clone(), i))
        .collect();
    let mut state = vec![Visit::Unvisited; schemas.len()];
    let mut order = Vec::with_capacity(schemas.len());

    for i in 0..schemas.len() {
        visit(i, &schemas, &index, &mut state, &mut order);
    }

    // Reassemble in post-order; each index appears exactly once.
    let mut slots: Vec<Option<NamedSchemaIR>> = schemas.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

fn visit(
    i: usize,
    schemas: &[NamedSchemaIR],
    index: &HashMap<String, usize>,
    state: &mut [Visit],
    order: &mut Vec<usize>,
) {
    if state[i] != Visit::Unvisited {
        return;
    }
    state[i] = Visit::InProgress;
    for dep in &schemas[i].dependencies {
        if let Some(&j) = index.get(dep) {
            if state[j] == Visit::Unvisited {
                visit(j, schemas, index, state, order);
            }
        }
    }
    state[i] = Visit::Done;
    order.push(i);
}
