//! OpenAPI document structs for serde deserialization.
//!
//! A minimal subset of the OpenAPI 3.0/3.1 surface: enough to compile
//! component schemas and operations into IR. Cross-file `$ref`
//! dereferencing happens in the loading collaborator; refs seen here always
//! point into `#/components/schemas/`.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::CompileError;

/// Root OpenAPI document.
///
/// Paths, component schemas, and object properties deserialize into ordered
/// maps: declaration order in the document flows through to the IR.
#[derive(Debug, Deserialize)]
pub struct OpenApiDocument {
    /// Path items keyed by URL template, in declaration order.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    pub components: Option<Components>,
}

/// Components section containing reusable schemas.
#[derive(Debug, Deserialize)]
pub struct Components {
    /// Named schemas, in declaration order.
    pub schemas: Option<IndexMap<String, Schema>>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Deserialize)]
pub struct PathItem {
    /// GET operation.
    pub get: Option<Operation>,
    /// POST operation.
    pub post: Option<Operation>,
    /// PUT operation.
    pub put: Option<Operation>,
    /// PATCH operation.
    pub patch: Option<Operation>,
    /// DELETE operation.
    pub delete: Option<Operation>,
    /// Path-level parameters shared by all operations.
    pub parameters: Option<Vec<Parameter>>,
}

/// An API operation (endpoint).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Stable operation identifier, if the document provides one.
    pub operation_id: Option<String>,
    /// Operation parameters.
    pub parameters: Option<Vec<Parameter>>,
    /// Request body definition.
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: HashMap<String, Response>,
}

/// A parameter (query, path, header, or cookie).
#[derive(Debug, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter appears.
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Parameter value schema.
    pub schema: Option<Schema>,
}

/// A request body definition.
#[derive(Debug, Deserialize)]
pub struct RequestBody {
    /// Media types keyed by content-type string.
    pub content: Option<HashMap<String, MediaType>>,
}

/// A response definition.
#[derive(Debug, Deserialize)]
pub struct Response {
    /// Media types keyed by content-type string.
    pub content: Option<HashMap<String, MediaType>>,
}

/// Media type content (e.g. application/json).
#[derive(Debug, Deserialize)]
pub struct MediaType {
    /// The payload schema.
    pub schema: Option<Schema>,
}

/// JSON Schema node as used in OpenAPI documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The `type` keyword: a single type or an array of types (3.1
    /// nullability).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to a component schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Properties for object types, in declaration order.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Union of schemas (any may hold).
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    /// Union of schemas (exactly one holds).
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    /// Intersection of schemas (all hold).
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Additional properties for object types.
    pub additional_properties: Option<AdditionalProperties>,

    /// Format hint (e.g. date-time, uuid).
    pub format: Option<String>,

    /// Constant value: the schema matches only this exact value.
    #[serde(rename = "const")]
    pub const_value: Option<serde_json::Value>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String member.
    String(String),
    /// Integer member.
    Integer(i64),
    /// Float member.
    Float(f64),
    /// Boolean member.
    Bool(bool),
    /// Null member.
    Null,
}

/// Schema type: a single type or an array of types.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// One type name.
    Single(String),
    /// Multiple type names (3.1 nullability encoding).
    Multiple(Vec<String>),
}

/// Additional properties: a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` opens the object; `false` closes it.
    Bool(bool),
    /// Unlisted keys validate against this schema.
    Schema(Box<Schema>),
}

impl OpenApiDocument {
    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json).map_err(|e| CompileError::InvalidDocument(e.to_string()))
    }
}

impl Schema {
    /// Whether this node accepts null via the 3.0 flag, a 3.1 type array,
    /// or an `anyOf`/`oneOf` arm of type null.
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }

        // Union null arms are stripped during mapping; their nullability
        // must be folded into the outer flag here.
        for schema in self.any_of.iter().chain(self.one_of.iter()).flatten() {
            if let Some(SchemaType::Single(t)) = &schema.schema_type
                && t == "null"
            {
                return true;
            }
        }

        if let Some(SchemaType::Multiple(types)) = &self.schema_type
            && types.iter().any(|t| t == "null")
        {
            return true;
        }

        false
    }
}
