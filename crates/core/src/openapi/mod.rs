//! OpenAPI front-end.
//!
//! Compiles an OpenAPI document into the canonical IR plus the
//! operation-layer analyses. The loading collaborator hands this module a
//! deserialized document with all cross-file refs already resolved.

pub mod map;
pub mod operations;
pub mod spec;

use indexmap::IndexMap;
use tracing::debug;

use crate::CompileOutput;
use crate::collections::discover_collections;
use crate::config::CompileConfig;
use crate::error::CompileError;
use crate::ir::deps::topological_sort;
use crate::pagination::analyze_operation;
use crate::session::CompileSession;

use self::spec::OpenApiDocument;

/// Compile an OpenAPI document into IR and operation analyses.
pub fn compile_openapi(
    document: &OpenApiDocument,
    config: CompileConfig,
) -> Result<CompileOutput, CompileError> {
    let components = document
        .components
        .as_ref()
        .and_then(|c| c.schemas.as_ref());
    let empty = IndexMap::new();
    let components = components.unwrap_or(&empty);

    if document.paths.is_empty() && components.is_empty() {
        return Err(CompileError::EmptyOpenApiDocument);
    }

    let mut session = CompileSession::new(config);
    map::map_components(components, &mut session);

    let mut operations = operations::extract_operations(document, components, &mut session)?;
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
        "compiled OpenAPI document"
    );

    Ok(CompileOutput {
        schemas,
        operations,
        collections,
        warnings,
    })
}

/// Parse and compile an OpenAPI document from JSON text.
pub fn compile_openapi_json(
    json: &str,
    config: CompileConfig,
) -> Result<CompileOutput, CompileError> {
    let document = OpenApiDocument::from_json(json)?;
    compile_openapi(&document, config)
}
