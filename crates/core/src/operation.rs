//! Shared operation-layer vocabulary produced by both front-ends.
//!
//! Operations are not schema IR: they carry the argument set and response
//! shape the pagination analyzer and collection discovery inspect, using
//! the same `SchemaIR` vocabulary for types.

use serde::Serialize;

use crate::ir::SchemaIR;
use crate::pagination::PaginationInfo;

/// Query or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Read operation (GET / GraphQL query).
    Query,
    /// Write operation (POST, PUT, PATCH, DELETE / GraphQL mutation).
    Mutation,
}

/// One argument the operation accepts.
///
/// `name` is the schema-side argument or parameter name; `variable` is the
/// binding the *document* actually passes for it. GraphQL call sites may
/// alias the two; for OpenAPI they always coincide. A schema argument the
/// document never passes has `variable = None`.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentInfo {
    /// Schema-defined argument name.
    pub name: String,
    /// Document-side variable bound to this argument, if any.
    pub variable: Option<String>,
    /// Argument value schema.
    pub schema: SchemaIR,
    /// Whether the argument must be supplied.
    pub required: bool,
}

/// A normalized operation, read-only after extraction.
#[derive(Debug, Clone, Serialize)]
pub struct OperationInfo {
    /// Sanitized operation identifier.
    pub name: String,
    /// Query or mutation.
    pub kind: OperationKind,
    /// Arguments the operation accepts (query parameters or field
    /// arguments).
    pub arguments: Vec<ArgumentInfo>,
    /// Success response schema, if the operation produces one.
    pub response: Option<SchemaIR>,
    /// Top-level response selection key (alias-respecting); GraphQL only.
    /// Responses are keyed by field or alias name, so analysis paths are
    /// prefixed with it.
    pub response_key: Option<String>,
    /// Pagination capability, when the operation supports infinite queries.
    pub pagination: Option<PaginationInfo>,
}
