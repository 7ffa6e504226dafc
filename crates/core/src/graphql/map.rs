//! GraphQL type → IR mapping.
//!
//! GraphQL nullability is the inverse of the IR default: a type is nullable
//! unless wrapped in `NonNull`. Mapping unwraps the wrappers so that
//! `[String]!` becomes `array(nullable(string))` while `[String!]` becomes
//! `nullable(array(string))`; the two shapes stay distinguishable.
//!
//! Named enums and input objects map lazily through the session's pending
//! queue and surface as `Ref` nodes. Output object, interface, and union
//! types are never named wholesale; their shapes enter the IR only through
//! selection sets.

use graphql_parser::schema::{Type, TypeDefinition};

use crate::error::Warning;
use crate::ir::{NamedSchemaIR, PropertyIR, SchemaCategory, SchemaIR, SchemaKind};
use crate::session::CompileSession;

use super::index::SchemaIndex;

/// Map a GraphQL type reference, resolving nullability from the `NonNull`
/// wrapper.
pub fn map_type(
    ty: &Type<'_, String>,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    context: &str,
) -> SchemaIR {
    match ty {
        Type::NonNullType(inner) => map_base(inner, index, session, context),
        _ => map_base(ty, index, session, context).nullable(),
    }
}

fn map_base(
    ty: &Type<'_, String>,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    context: &str,
) -> SchemaIR {
    match ty {
        Type::NamedType(name) => map_named(name, index, session, context),
        Type::ListType(element) => SchemaIR::array(map_type(element, index, session, context)),
        Type::NonNullType(inner) => map_base(inner, index, session, context),
    }
}

fn map_named(
    name: &str,
    index: &SchemaIndex<'_>,
    session: &mut CompileSession,
    context: &str,
) -> SchemaIR {
    match index.get(name) {
        Some(TypeDefinition::Scalar(_)) => session.scalars().resolve(name).unwrap_or_else(|| {
            session.warn_unknown_scalar(name);
            SchemaIR::unknown()
        }),
        Some(TypeDefinition::Enum(_) | TypeDefinition::InputObject(_)) => {
            session.enqueue(name);
            SchemaIR::reference(name)
        }
        // Composite output types carry no inline IR of their own; a
        // selection-less reference degrades to the passthrough node.
        Some(
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_),
        ) => SchemaIR::unknown(),
        None => match session.scalars().resolve(name) {
            Some(schema) => schema,
            None => {
                session.push_warning(Warning::UnknownTypeRef {
                    name: name.to_string(),
                    context: context.to_string(),
                });
                SchemaIR::unknown()
            }
        },
    }
}

/// Whether a type reference requires a value (non-null with no default).
pub fn is_required(ty: &Type<'_, String>, has_default: bool) -> bool {
    matches!(ty, Type::NonNullType(_)) && !has_default
}

/// Map every name queued during type mapping into a registered schema.
///
/// Mapping an input object may queue further names; the loop runs until the
/// queue drains. The generated set guarantees each name is mapped once, so
/// cyclic input objects terminate.
pub fn drain_pending(index: &SchemaIndex<'_>, session: &mut CompileSession) {
    while let Some(name) = session.next_pending() {
        match index.get(&name) {
            Some(TypeDefinition::Enum(def)) => {
                let values = def.values.iter().map(|v| v.name.clone()).collect();
                session.register(NamedSchemaIR::new(
                    name,
                    SchemaIR::new(SchemaKind::Enum(values)),
                    SchemaCategory::Enum,
                ));
            }
            Some(TypeDefinition::InputObject(def)) => {
                let properties = def
                    .fields
                    .iter()
                    .map(|field| PropertyIR {
                        name: field.name.clone(),
                        schema: map_type(
                            &field.value_type,
                            index,
                            session,
                            &format!("input field '{}' of {name}", field.name),
                        ),
                        required: is_required(&field.value_type, field.default_value.is_some()),
                    })
                    .collect();
                session.register(NamedSchemaIR::new(
                    name,
                    SchemaIR::object(properties),
                    SchemaCategory::Component,
                ));
            }
            _ => {}
        }
    }
}
