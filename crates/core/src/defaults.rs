//! Structural default synthesis.
//!
//! Reconstructs a structurally valid placeholder value for a schema,
//! resolving named references through the registry. Operates directly on
//! the IR the mappers produce; the reference table is the same registry
//! the emitter consumes, so defaults and emitted validators always agree.
//!
//! Optionality and nullability produce different defaults: a nullable
//! value defaults to `null`, while an optional object key is omitted
//! entirely.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::ir::{LiteralValue, NamedSchemaIR, SchemaIR, SchemaKind};

/// Synthesize a structurally valid default for a schema.
pub fn default_value(schema: &SchemaIR, registry: &IndexMap<String, NamedSchemaIR>) -> Value {
    synthesize(schema, registry, &mut Vec::new())
}

fn synthesize(
    schema: &SchemaIR,
    registry: &IndexMap<String, NamedSchemaIR>,
    visiting: &mut Vec<String>,
) -> Value {
    if schema.nullable {
        return Value::Null;
    }

    match &schema.kind {
        SchemaKind::String { .. } => json!(""),
        SchemaKind::Number { .. } => json!(0),
        SchemaKind::Boolean => json!(false),
        SchemaKind::Array(_) => json!([]),
        SchemaKind::Enum(values) => values.first().map_or(Value::Null, |v| json!(v)),
        SchemaKind::Literal(value) => literal_value(value),
        SchemaKind::Record { .. } => json!({}),
        SchemaKind::Object { properties, .. } => {
            // Optional keys are omitted entirely, not set to null.
            let mut object = Map::new();
            for prop in properties {
                if prop.required {
                    object.insert(prop.name.clone(), synthesize(&prop.schema, registry, visiting));
                }
            }
            Value::Object(object)
        }
        SchemaKind::Union(members) => members
            .iter()
            .find(|m| !m.is_unknown())
            .map_or(Value::Null, |m| synthesize(m, registry, visiting)),
        SchemaKind::Intersection(members) => {
            // Merge member defaults; later members win on key conflicts.
            let mut merged = Map::new();
            for member in members {
                if let Value::Object(fields) = synthesize(member, registry, visiting) {
                    merged.extend(fields);
                }
            }
            Value::Object(merged)
        }
        SchemaKind::Ref(name) => {
            if visiting.iter().any(|n| n == name) {
                // Reference cycle; no finite default exists below this
                // point.
                return Value::Null;
            }
            match registry.get(name) {
                Some(named) => {
                    visiting.push(name.clone());
                    let value = synthesize(&named.schema, registry, visiting);
                    visiting.pop();
                    value
                }
                None => Value::Null,
            }
        }
        SchemaKind::Raw(_) | SchemaKind::Unknown => Value::Null,
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::String(s) => json!(s),
        LiteralValue::Int(n) => json!(n),
        LiteralValue::Float(f) => json!(f),
        LiteralValue::Bool(b) => json!(b),
        LiteralValue::Null => Value::Null,
    }
}
