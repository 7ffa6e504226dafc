//! Schema compiler core: OpenAPI and GraphQL documents in, canonical IR and
//! operation analyses out.
//!
//! Both front-ends normalize their source format into the same `SchemaIR`
//! vocabulary, so everything downstream (dependency ordering, pagination
//! classification, collection discovery, default synthesis, predicate
//! pushdown) is source-format agnostic. Renderers, file writing, CLI, and
//! network introspection are collaborators that consume `CompileOutput`;
//! none of them live in this crate.

pub mod collections;
pub mod config;
pub mod defaults;
pub mod error;
pub mod graphql;
pub mod ir;
pub mod openapi;
pub mod operation;
pub mod pagination;
pub mod predicate;
pub mod scalars;
pub mod session;
pub mod util;

use serde::Serialize;

pub use collections::{CollectionBinding, MutationBinding, MutationKind};
pub use config::{CompileConfig, PaginationOverride};
pub use defaults::default_value;
pub use error::{CompileError, Warning};
pub use graphql::{compile_graphql, compile_graphql_source};
pub use ir::{NamedSchemaIR, SchemaCategory, SchemaIR, SchemaKind};
pub use openapi::{compile_openapi, compile_openapi_json};
pub use operation::{ArgumentInfo, OperationInfo, OperationKind};
pub use pagination::{PaginationInfo, ParamStyle, ResponseStyle};
pub use predicate::{SubsetOptions, translate_subset};

/// Everything one compile pass produces.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutput {
    /// Named schemas in dependency order: every dependency precedes its
    /// dependents except inside cycles.
    pub schemas: Vec<NamedSchemaIR>,
    /// Normalized operations with their pagination analyses.
    pub operations: Vec<OperationInfo>,
    /// Discovered reactive-collection bindings.
    pub collections: Vec<CollectionBinding>,
    /// Non-fatal conditions recorded along the way.
    pub warnings: Vec<Warning>,
}
