//! Name index over a parsed GraphQL type-system document.

use std::collections::HashMap;

use graphql_parser::schema::{Definition, Field, TypeDefinition};

use super::SchemaDocument;

/// Type definitions keyed by name, plus the root operation type names.
///
/// Root names come from an explicit `schema { ... }` definition when present
/// and fall back to the conventional `Query` / `Mutation`.
#[derive(Debug)]
pub struct SchemaIndex<'a> {
    types: HashMap<String, &'a TypeDefinition<'a, String>>,
    query_type: String,
    mutation_type: String,
}

impl<'a> SchemaIndex<'a> {
    /// Index a type-system document.
    pub fn build(document: &'a SchemaDocument<'a>) -> Self {
        let mut types = HashMap::new();
        let mut query_type = "Query".to_string();
        let mut mutation_type = "Mutation".to_string();

        for definition in &document.definitions {
            match definition {
                Definition::TypeDefinition(def) => {
                    types.insert(type_name(def).to_string(), def);
                }
                Definition::SchemaDefinition(schema) => {
                    if let Some(query) = &schema.query {
                        query_type = query.clone();
                    }
                    if let Some(mutation) = &schema.mutation {
                        mutation_type = mutation.clone();
                    }
                }
                Definition::TypeExtension(_) | Definition::DirectiveDefinition(_) => {}
            }
        }

        Self {
            types,
            query_type,
            mutation_type,
        }
    }

    /// Whether the document defined any types at all.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look up a type definition by name.
    pub fn get(&self, name: &str) -> Option<&'a TypeDefinition<'a, String>> {
        self.types.get(name).copied()
    }

    /// Name of the root query type.
    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    /// Name of the root mutation type.
    pub fn mutation_type(&self) -> &str {
        &self.mutation_type
    }

    /// Field definition on an object or interface type.
    pub fn field(&self, parent: &str, field: &str) -> Option<&'a Field<'a, String>> {
        match self.get(parent)? {
            TypeDefinition::Object(object) => object.fields.iter().find(|f| f.name == field),
            TypeDefinition::Interface(interface) => {
                interface.fields.iter().find(|f| f.name == field)
            }
            _ => None,
        }
    }
}

fn type_name<'a>(def: &'a TypeDefinition<'a, String>) -> &'a str {
    match def {
        TypeDefinition::Scalar(s) => &s.name,
        TypeDefinition::Object(o) => &o.name,
        TypeDefinition::Interface(i) => &i.name,
        TypeDefinition::Union(u) => &u.name,
        TypeDefinition::Enum(e) => &e.name,
        TypeDefinition::InputObject(io) => &io.name,
    }
}
