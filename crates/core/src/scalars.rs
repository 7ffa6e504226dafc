//! Scalar resolution table.
//!
//! Maps scalar names to IR nodes, seeded with defaults and overridable per
//! compile. Overrides carry verbatim target expressions and map to `Raw`
//! nodes. Lookup is by exact name; an unresolved name is the caller's cue
//! to warn once and fall back to the passthrough node.

use std::collections::BTreeMap;

use crate::ir::SchemaIR;

/// Scalar-name → IR table for one compile pass.
#[derive(Debug, Clone)]
pub struct ScalarTable {
    entries: BTreeMap<String, SchemaIR>,
}

impl ScalarTable {
    /// Build the seeded table, then apply per-compile overrides on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut entries = BTreeMap::new();
        for (name, schema) in [
            ("ID", SchemaIR::string()),
            ("String", SchemaIR::string()),
            ("Int", SchemaIR::integer()),
            ("Float", SchemaIR::number()),
            ("Boolean", SchemaIR::boolean()),
            ("DateTime", SchemaIR::string_format("date-time")),
            ("Date", SchemaIR::string_format("date")),
            ("Time", SchemaIR::string_format("time")),
            ("JSON", SchemaIR::unknown()),
            ("BigInt", SchemaIR::raw("bigint")),
        ] {
            entries.insert(name.to_string(), schema);
        }
        for (name, expression) in overrides {
            entries.insert(name.clone(), SchemaIR::raw(expression.clone()));
        }
        Self { entries }
    }

    /// Resolve a scalar name to its IR node.
    pub fn resolve(&self, name: &str) -> Option<SchemaIR> {
        self.entries.get(name).cloned()
    }
}
