//! GraphQL front-end.
//!
//! Compiles a schema (type-system) document plus an executable document of
//! queries and mutations into the canonical IR and the operation-layer
//! analyses. The loading collaborator hands this module parsed
//! `graphql-parser` ASTs; `compile_graphql_source` is the convenience entry
//! over raw SDL and operation text.

pub mod index;
pub mod map;
pub mod operations;

use tracing::debug;

use crate::CompileOutput;
use crate::collections::discover_collections;
use crate::config::CompileConfig;
use crate::error::CompileError;
use crate::ir::deps::topological_sort;
use crate::pagination::analyze_operation;
use crate::session::CompileSession;

use self::index::SchemaIndex;

/// A parsed GraphQL type-system document.
pub type SchemaDocument<'a> = graphql_parser::schema::Document<'a, String>;
/// A parsed GraphQL executable document.
pub type QueryDocument<'a> = graphql_parser::query::Document<'a, String>;

/// Compile a GraphQL schema and operation document into IR and operation
/// analyses.
pub fn compile_graphql<'a>(
    schema: &'a SchemaDocument<'a>,
    document: &'a QueryDocument<'a>,
    config: CompileConfig,
) -> Result<CompileOutput, CompileError> {
    let index = SchemaIndex::build(schema);
    if index.is_empty() {
        return Err(CompileError::EmptyGraphqlSchema);
    }

    let mut session = CompileSession::new(config);
    let mut operations = operations::extract_operations(document, &index, &mut session)?;
    // Flush enums and input objects discovered during mapping so `Ref`
    // nodes resolve before response analysis.
    map::drain_pending(&index, &mut session);

    for op in &mut operations {
        op.pagination = analyze_operation(op, &mut session);
    }

    let collections = discover_collections(&operations, &session);

    let (named, warnings) = session.finish();
    let schemas = topological_sort(named);

    debug!(
        schemas = schemas.len(),
        operations = operations.len(),
        collections = collections.len(),
        warnings = warnings.len(),
        "compiled GraphQL documents"
    );

    Ok(CompileOutput {
        schemas,
        operations,
        collections,
        warnings,
    })
}

/// Parse and compile GraphQL documents from source text.
pub fn compile_graphql_source(
    schema_sdl: &str,
    operations_source: &str,
    config: CompileConfig,
) -> Result<CompileOutput, CompileError> {
    let schema = graphql_parser::parse_schema::<String>(schema_sdl)
        .map_err(|err| CompileError::InvalidDocument(err.to_string()))?;
    let document = graphql_parser::parse_query::<String>(operations_source)
        .map_err(|err| CompileError::InvalidDocument(err.to_string()))?;
    compile_graphql(&schema, &document, config)
}
