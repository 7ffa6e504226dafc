//! OpenAPI schema → IR mapping.
//!
//! All OpenAPI-specific semantics are resolved here: 3.0/3.1 nullability
//! encodings, composition keywords, the three `additionalProperties`
//! shapes, and `$ref` resolution through the session registry. Mapping
//! never aborts; unresolvable constructs degrade to passthrough nodes with
//! a warning.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::Warning;
use crate::ir::{
    LiteralValue, NamedSchemaIR, ObjectMode, PropertyIR, SchemaCategory, SchemaIR, SchemaKind,
    intersection_of, union_of,
};
use crate::session::CompileSession;

use super::spec::{AdditionalProperties, EnumValue, Schema, SchemaType};

const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";

/// Map every component schema, draining the lazy-expansion queue.
///
/// Component names are registered up front so `$ref` resolution is purely
/// name-based, then mapped in declaration order.
pub fn map_components(components: &IndexMap<String, Schema>, session: &mut CompileSession) {
    for name in components.keys() {
        session.enqueue(name);
    }

    while let Some(name) = session.next_pending() {
        let Some(schema) = components.get(&name) else {
            continue;
        };
        let ir = map_schema(schema, session, components, &name);
        let category = if matches!(ir.kind, SchemaKind::Enum(_)) {
            SchemaCategory::Enum
        } else {
            SchemaCategory::Component
        };
        session.register(NamedSchemaIR::new(name, ir, category));
    }
}

/// Map one OpenAPI schema node to IR.
///
/// `context` names the surrounding declaration for warning messages.
pub fn map_schema(
    schema: &Schema,
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> SchemaIR {
    let nullable = schema.is_nullable();
    let base = map_base(schema, session, components, context);
    if nullable { base.nullable() } else { base }
}

/// Map the non-null portion of a schema node.
fn map_base(
    schema: &Schema,
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> SchemaIR {
    // $ref first: refs never carry inline structure.
    if let Some(ref_path) = &schema.ref_path {
        return map_ref(ref_path, session, components, context);
    }

    // const matches exactly one value.
    if let Some(const_value) = &schema.const_value {
        return map_const(const_value);
    }

    // Composition keywords.
    if let Some(all_of) = &schema.all_of {
        let members = map_members(all_of, session, components, context);
        return intersection_of(members);
    }
    if let Some(any_of) = &schema.any_of {
        return map_union_members(any_of, session, components, context);
    }
    if let Some(one_of) = &schema.one_of {
        return map_union_members(one_of, session, components, context);
    }

    match &schema.schema_type {
        Some(SchemaType::Single(t)) => map_typed(t, schema, session, components, context),
        Some(SchemaType::Multiple(types)) => {
            // Null arms were already folded into the outer nullable flag.
            let non_null: Vec<_> = types.iter().filter(|t| t.as_str() != "null").collect();
            let members = non_null
                .iter()
                .map(|t| map_typed(t, schema, session, components, context))
                .collect();
            union_of(members)
        }
        None => {
            if schema.additional_properties.is_some() || schema.properties.is_some() {
                map_object(schema, session, components, context)
            } else {
                SchemaIR::unknown()
            }
        }
    }
}

/// Resolve a `$ref` to a registry-backed named reference.
fn map_ref(
    ref_path: &str,
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> SchemaIR {
    let name = ref_path
        .strip_prefix(COMPONENT_REF_PREFIX)
        .unwrap_or(ref_path);
    if components.contains_key(name) {
        session.enqueue(name);
        SchemaIR::reference(name)
    } else {
        session.push_warning(Warning::UnknownTypeRef {
            name: name.to_string(),
            context: context.to_string(),
        });
        SchemaIR::unknown()
    }
}

fn map_const(value: &serde_json::Value) -> SchemaIR {
    let literal = match value {
        serde_json::Value::Null => LiteralValue::Null,
        serde_json::Value::Bool(b) => LiteralValue::Bool(*b),
        serde_json::Value::Number(n) => n.as_i64().map_or_else(
            || LiteralValue::Float(n.as_f64().unwrap_or(0.0)),
            LiteralValue::Int,
        ),
        serde_json::Value::String(s) => LiteralValue::String(s.clone()),
        _ => return SchemaIR::unknown(),
    };
    SchemaIR::literal(literal)
}

fn map_members(
    schemas: &[Schema],
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> Vec<SchemaIR> {
    schemas
        .iter()
        .map(|s| map_schema(s, session, components, context))
        .collect()
}

/// Map `anyOf`/`oneOf` members, skipping null arms (folded into the outer
/// nullable flag) and collapsing a single remaining member.
fn map_union_members(
    schemas: &[Schema],
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> SchemaIR {
    let non_null: Vec<_> = schemas
        .iter()
        .filter(|s| !matches!(&s.schema_type, Some(SchemaType::Single(t)) if t == "null"))
        .collect();
    let members = non_null
        .iter()
        .map(|s| map_schema(s, session, components, context))
        .collect();
    union_of(members)
}

fn map_typed(
    type_name: &str,
    schema: &Schema,
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> SchemaIR {
    match type_name {
        "string" => {
            if let Some(enum_values) = &schema.enum_values {
                map_enum(enum_values)
            } else {
                match &schema.format {
                    Some(format) => SchemaIR::string_format(format.clone()),
                    None => SchemaIR::string(),
                }
            }
        }
        "integer" => {
            if let Some(enum_values) = &schema.enum_values {
                map_enum(enum_values)
            } else {
                SchemaIR::integer()
            }
        }
        "number" => {
            if let Some(enum_values) = &schema.enum_values {
                map_enum(enum_values)
            } else {
                SchemaIR::number()
            }
        }
        "boolean" => SchemaIR::boolean(),
        "null" => SchemaIR::literal(LiteralValue::Null),
        "array" => {
            let element = schema.items.as_ref().map_or_else(SchemaIR::unknown, |items| {
                map_schema(items, session, components, context)
            });
            SchemaIR::array(element)
        }
        "object" => map_object(schema, session, components, context),
        _ => SchemaIR::unknown(),
    }
}

/// Map an enum keyword: all-string values become the `Enum` shape, mixed
/// values a union of literals.
fn map_enum(values: &[EnumValue]) -> SchemaIR {
    let all_strings = values.iter().all(|v| matches!(v, EnumValue::String(_)));
    if all_strings && !values.is_empty() {
        let members = values
            .iter()
            .filter_map(|v| match v {
                EnumValue::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        return SchemaIR::new(SchemaKind::Enum(members));
    }

    let members = values
        .iter()
        .map(|v| {
            SchemaIR::literal(match v {
                EnumValue::String(s) => LiteralValue::String(s.clone()),
                EnumValue::Integer(n) => LiteralValue::Int(*n),
                EnumValue::Float(f) => LiteralValue::Float(*f),
                EnumValue::Bool(b) => LiteralValue::Bool(*b),
                EnumValue::Null => LiteralValue::Null,
            })
        })
        .collect();
    union_of(members)
}

/// Map an object schema into one of the three distinct shapes:
/// passthrough object, record, or object-with-catchall.
fn map_object(
    schema: &Schema,
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> SchemaIR {
    let properties = schema.properties.as_ref().map_or_else(Vec::new, |props| {
        map_properties(props, schema.required.as_ref(), session, components, context)
    });

    match &schema.additional_properties {
        Some(AdditionalProperties::Bool(true)) => SchemaIR::new(SchemaKind::Object {
            properties,
            mode: ObjectMode::Passthrough,
        }),
        Some(AdditionalProperties::Schema(value)) => {
            let value_ir = map_schema(value, session, components, context);
            if properties.is_empty() {
                SchemaIR::record(SchemaIR::string(), value_ir)
            } else {
                SchemaIR::new(SchemaKind::Object {
                    properties,
                    mode: ObjectMode::Catchall(Box::new(value_ir)),
                })
            }
        }
        Some(AdditionalProperties::Bool(false)) | None => {
            if schema.properties.is_some() {
                SchemaIR::object(properties)
            } else {
                SchemaIR::record(SchemaIR::string(), SchemaIR::unknown())
            }
        }
    }
}

/// Map object properties in declaration order.
fn map_properties(
    properties: &IndexMap<String, Schema>,
    required: Option<&Vec<String>>,
    session: &mut CompileSession,
    components: &IndexMap<String, Schema>,
    context: &str,
) -> Vec<PropertyIR> {
    let required_set: HashSet<_> = required.map_or_else(HashSet::new, |r| r.iter().collect());

    properties
        .iter()
        .map(|(name, schema)| PropertyIR {
            name: name.clone(),
            schema: map_schema(schema, session, components, context),
            required: required_set.contains(name),
        })
        .collect()
}
