//! Error and warning taxonomy for a compile pass.
//!
//! Hard failures abort the compile: the rest of the pipeline would have no
//! meaningful output to produce. Everything else is a warning accumulated on
//! the session and returned alongside the successful result.

use serde::Serialize;
use thiserror::Error;

/// A structurally fatal condition that aborts the compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source document could not be parsed at all.
    #[error("failed to parse source document: {0}")]
    InvalidDocument(String),

    /// An OpenAPI document with neither paths nor component schemas.
    #[error("OpenAPI document has no paths and no component schemas")]
    EmptyOpenApiDocument,

    /// A GraphQL schema that defines no types.
    #[error("GraphQL schema defines no types")]
    EmptyGraphqlSchema,

    /// An operation spreads a fragment that no document defines.
    #[error("operation '{operation}' references undefined fragment '{fragment}'")]
    UndefinedFragment {
        /// Operation containing the spread.
        operation: String,
        /// The missing fragment name.
        fragment: String,
    },

    /// Two operations normalized to the same identifier.
    #[error("duplicate operation identifier '{0}'")]
    DuplicateOperation(String),

    /// Two parameters with the same name in one parameter list.
    #[error("duplicate parameter name '{name}' in {location} parameters")]
    DuplicateParameter {
        /// The colliding parameter name.
        name: String,
        /// Which parameter list the collision occurred in.
        location: String,
    },
}

/// A non-fatal condition recorded during a compile pass.
///
/// Warnings never stop compilation; the offending construct degrades to a
/// passthrough node or is excluded from generation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Warning {
    /// A scalar name with no entry in the scalar table.
    #[error("unknown scalar '{name}'; falling back to passthrough")]
    UnknownScalar {
        /// The unresolved scalar name.
        name: String,
    },

    /// A declaration names a type absent from the schema.
    #[error("unknown type '{name}' referenced by {context}; falling back to passthrough")]
    UnknownTypeRef {
        /// The unresolved type name.
        name: String,
        /// Where the reference appeared (variable, field, argument).
        context: String,
    },

    /// A selection names a field the parent type does not define.
    #[error("unknown field '{field}' on type '{parent}'; falling back to passthrough")]
    UnknownField {
        /// The type the selection was made on.
        parent: String,
        /// The missing field name.
        field: String,
    },

    /// A paginated-looking operation whose response shape could not be
    /// classified; it is excluded from infinite-query generation.
    #[error("cannot classify pagination for operation '{operation}': {reason}")]
    UnclassifiablePagination {
        /// The skipped operation.
        operation: String,
        /// Why classification failed.
        reason: String,
    },

    /// A filter operator with no pushdown translation; the predicate is
    /// dropped and the caller filters client-side.
    #[error("filter operator '{operator}' has no parameter translation; dropped")]
    UnsupportedFilterOperator {
        /// The unsupported operator.
        operator: String,
    },
}
