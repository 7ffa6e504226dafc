//! Canonical schema IR shared by both front-ends.
//!
//! This module defines the format-agnostic schema representation:
//! - `SchemaIR`: a schema node (kind + outermost nullability flag)
//! - `SchemaKind`: the closed tagged union of schema shapes
//! - `NamedSchemaIR`: a named, dependency-annotated schema for emission
//!
//! Both the OpenAPI and the GraphQL mappers normalize into this vocabulary,
//! so everything downstream (ordering, pagination analysis, default
//! synthesis, rendering) is source-format agnostic.

pub mod deps;

use std::collections::BTreeSet;

use serde::Serialize;

/// A schema node: one `SchemaKind` plus an outermost nullability flag.
///
/// Nullability wraps the node it is set on and is never propagated into
/// nested structure, so `array(nullable(string))` and
/// `nullable(array(string))` stay distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaIR {
    /// The active shape of this node.
    pub kind: SchemaKind,
    /// Whether `null` is an accepted value at this level.
    pub nullable: bool,
}

/// The closed union of schema shapes.
///
/// Serialized with adjacent tagging: internal tagging cannot represent the
/// newtype variants whose payload is not a map (`Array`, `Enum`, `Ref`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SchemaKind {
    /// Text value, optionally refined by a format ("date-time", "uuid", ...).
    String {
        /// Format refinement, if any.
        format: Option<String>,
    },
    /// Numeric value.
    Number {
        /// Whether the value is constrained to integers.
        integer: bool,
    },
    /// Boolean value.
    Boolean,
    /// Object with an ordered property list.
    Object {
        /// Properties in declaration order.
        properties: Vec<PropertyIR>,
        /// How unlisted keys are treated.
        mode: ObjectMode,
    },
    /// Homogeneous list.
    Array(Box<SchemaIR>),
    /// Closed set of literal string values, in declaration order.
    Enum(Vec<String>),
    /// Any one of the member schemas may hold.
    Union(Vec<SchemaIR>),
    /// All member schemas must hold.
    Intersection(Vec<SchemaIR>),
    /// Map-like type with a key schema and a value schema.
    Record {
        /// Key schema (always a primitive shape).
        key: Box<SchemaIR>,
        /// Value schema.
        value: Box<SchemaIR>,
    },
    /// Reference to another named schema. Carries no inline structure; the
    /// referenced name is authoritative.
    Ref(String),
    /// Exactly one concrete value.
    Literal(LiteralValue),
    /// Verbatim target-language code, used for unmapped custom scalars.
    Raw(String),
    /// Passthrough node for values the compiler could not classify.
    Unknown,
}

/// How an object schema treats keys outside its property list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ObjectMode {
    /// Only the listed properties are valid.
    Strict,
    /// Unlisted keys are accepted and passed through unvalidated.
    Passthrough,
    /// Unlisted keys are validated against a fallback schema.
    Catchall(Box<SchemaIR>),
}

/// A single object property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyIR {
    /// Property name as it appears on the wire.
    pub name: String,
    /// Property value schema.
    pub schema: SchemaIR,
    /// Whether the key must be present.
    pub required: bool,
}

/// A concrete literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// String literal.
    String(String),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// The `null` literal.
    Null,
}

/// Emission grouping for named schemas.
///
/// Categories do not affect typing; they only group output sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaCategory {
    /// Reusable component schema from the source document.
    Component,
    /// Closed string enumeration.
    Enum,
    /// GraphQL fragment selection shape.
    Fragment,
    /// Operation-scoped schema (variables or response).
    Operation,
}

/// A named schema ready for dependency-ordered emission.
///
/// Created once per discovered name and immutable for the rest of the
/// compile pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSchemaIR {
    /// Stable identifier used by `Ref` nodes.
    pub name: String,
    /// The schema body.
    pub schema: SchemaIR,
    /// Names of every schema this one references.
    pub dependencies: BTreeSet<String>,
    /// Emission grouping.
    pub category: SchemaCategory,
}

impl NamedSchemaIR {
    /// Create a named schema, computing its dependency set from the body.
    pub fn new(name: impl Into<String>, schema: SchemaIR, category: SchemaCategory) -> Self {
        let dependencies = deps::extract_dependencies(&schema);
        Self {
            name: name.into(),
            schema,
            dependencies,
            category,
        }
    }
}

impl SchemaIR {
    /// Wrap a kind in a non-nullable node.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// Mark this node as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Plain string schema.
    pub fn string() -> Self {
        Self::new(SchemaKind::String { format: None })
    }

    /// String schema refined by a format.
    pub fn string_format(format: impl Into<String>) -> Self {
        Self::new(SchemaKind::String {
            format: Some(format.into()),
        })
    }

    /// Floating-point number schema.
    pub fn number() -> Self {
        Self::new(SchemaKind::Number { integer: false })
    }

    /// Integer number schema.
    pub fn integer() -> Self {
        Self::new(SchemaKind::Number { integer: true })
    }

    /// Boolean schema.
    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    /// Array schema over an element schema.
    pub fn array(element: SchemaIR) -> Self {
        Self::new(SchemaKind::Array(Box::new(element)))
    }

    /// Strict object schema from a property list.
    pub fn object(properties: Vec<PropertyIR>) -> Self {
        Self::new(SchemaKind::Object {
            properties,
            mode: ObjectMode::Strict,
        })
    }

    /// Record schema from key and value schemas.
    pub fn record(key: SchemaIR, value: SchemaIR) -> Self {
        Self::new(SchemaKind::Record {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// Reference to a named schema.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Ref(name.into()))
    }

    /// Literal schema for one concrete value.
    pub fn literal(value: LiteralValue) -> Self {
        Self::new(SchemaKind::Literal(value))
    }

    /// Verbatim target-language escape hatch.
    pub fn raw(code: impl Into<String>) -> Self {
        Self::new(SchemaKind::Raw(code.into()))
    }

    /// Unclassifiable passthrough node.
    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown)
    }

    /// Whether this node is the `Unknown` passthrough.
    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, SchemaKind::Unknown)
    }

    /// The referenced name, if this node is a `Ref`.
    pub fn ref_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Ref(name) => Some(name),
            _ => None,
        }
    }
}

/// Collapse a member list into a union, dropping the wrapper for a single
/// member. A single-member union would otherwise need special-casing at
/// every consumer.
pub fn union_of(mut members: Vec<SchemaIR>) -> SchemaIR {
    match members.len() {
        0 => SchemaIR::unknown(),
        1 => members.remove(0),
        _ => SchemaIR::new(SchemaKind::Union(members)),
    }
}

/// Collapse a member list into an intersection, dropping the wrapper for a
/// single member.
pub fn intersection_of(mut members: Vec<SchemaIR>) -> SchemaIR {
    match members.len() {
        0 => SchemaIR::unknown(),
        1 => members.remove(0),
        _ => SchemaIR::new(SchemaKind::Intersection(members)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_wraps_outermost_only() {
        let inner_nullable = SchemaIR::array(SchemaIR::string().nullable());
        let outer_nullable = SchemaIR::array(SchemaIR::string()).nullable();
        assert_ne!(inner_nullable, outer_nullable);
        assert!(!inner_nullable.nullable);
        assert!(outer_nullable.nullable);
    }

    #[test]
    fn test_single_member_union_collapses() {
        let collapsed = union_of(vec![SchemaIR::string()]);
        assert_eq!(collapsed, SchemaIR::string());

        let kept = union_of(vec![SchemaIR::string(), SchemaIR::number()]);
        assert!(matches!(kept.kind, SchemaKind::Union(ref m) if m.len() == 2));
    }

    #[test]
    fn test_single_member_intersection_collapses() {
        let collapsed = intersection_of(vec![SchemaIR::reference("User")]);
        assert_eq!(collapsed, SchemaIR::reference("User"));
    }

    #[test]
    fn test_empty_composition_is_unknown() {
        assert!(union_of(Vec::new()).is_unknown());
        assert!(intersection_of(Vec::new()).is_unknown());
    }

    #[test]
    fn test_every_kind_serializes_to_value() {
        let samples = vec![
            SchemaIR::string(),
            SchemaIR::string_format("uuid"),
            SchemaIR::integer(),
            SchemaIR::boolean(),
            SchemaIR::array(SchemaIR::string()),
            SchemaIR::object(vec![PropertyIR {
                name: "id".into(),
                schema: SchemaIR::string(),
                required: true,
            }]),
            SchemaIR::new(SchemaKind::Enum(vec!["on".to_string(), "off".to_string()])),
            SchemaIR::new(SchemaKind::Union(vec![SchemaIR::string(), SchemaIR::number()])),
            SchemaIR::new(SchemaKind::Intersection(vec![
                SchemaIR::reference("A"),
                SchemaIR::reference("B"),
            ])),
            SchemaIR::record(SchemaIR::string(), SchemaIR::unknown()),
            SchemaIR::reference("User"),
            SchemaIR::literal(LiteralValue::Int(1)),
            SchemaIR::raw("bigint"),
            SchemaIR::unknown(),
            SchemaIR::new(SchemaKind::Object {
                properties: Vec::new(),
                mode: ObjectMode::Catchall(Box::new(SchemaIR::integer())),
            }),
        ];
        for schema in samples {
            let value = serde_json::to_value(&schema).unwrap();
            assert!(value.get("kind").is_some(), "missing tag in {value}");
        }

        let reference = serde_json::to_value(SchemaIR::reference("User")).unwrap();
        assert_eq!(
            reference,
            serde_json::json!({
                "kind": { "kind": "ref", "value": "User" },
                "nullable": false
            })
        );
    }

    #[test]
    fn test_named_schema_computes_dependencies() {
        let schema = SchemaIR::object(vec![PropertyIR {
            name: "owner".into(),
            schema: SchemaIR::reference("User"),
            required: true,
        }]);
        let named = NamedSchemaIR::new("Pet", schema, SchemaCategory::Component);
        assert!(named.dependencies.contains("User"));
    }
}
