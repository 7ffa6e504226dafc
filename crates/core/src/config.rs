//! Per-compile configuration supplied by the orchestrating layer.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Configuration inputs for one compile pass.
///
/// All maps are keyed by source-side names (scalar names, operation names,
/// entity type names) and default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileConfig {
    /// Custom scalar name → verbatim target expression.
    pub scalar_overrides: BTreeMap<String, String>,
    /// Per-operation pagination overrides, keyed by operation name.
    pub pagination: BTreeMap<String, PaginationOverride>,
    /// Per-entity selector-path override for collection discovery.
    pub selector_paths: BTreeMap<String, Vec<String>>,
    /// Per-entity key-field override (defaults to `id`).
    pub key_fields: BTreeMap<String, String>,
}

/// Pagination overrides for a single operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationOverride {
    /// Exclude the operation from infinite-query generation entirely.
    pub disabled: bool,
    /// Replace the derived initial page param value.
    pub initial_page_param: Option<Value>,
    /// Explicit accessor path for the next-page cursor. Takes precedence
    /// over response-shape inference and forces the cursor response style.
    pub next_page_param_path: Option<Vec<String>>,
}

impl CompileConfig {
    /// Pagination override for an operation, if configured.
    pub fn pagination_override(&self, operation: &str) -> Option<&PaginationOverride> {
        self.pagination.get(operation)
    }

    /// Key field for an entity: the configured override or `id`.
    pub fn key_field(&self, entity: &str) -> &str {
        self.key_fields.get(entity).map_or("id", String::as_str)
    }
}
