//! Compile-session state.
//!
//! All mutable state of a compile pass lives here and is threaded
//! explicitly: the named-schema registry, the generated/pending bookkeeping
//! for lazy expansion, the scalar table, and the warnings sink. Sessions
//! are independent values, so multiple sources compile concurrently without
//! cross-talk.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use tracing::warn;

use crate::config::CompileConfig;
use crate::error::Warning;
use crate::ir::NamedSchemaIR;
use crate::scalars::ScalarTable;

/// Mutable state for one compile pass over one source.
#[derive(Debug)]
pub struct CompileSession {
    config: CompileConfig,
    scalars: ScalarTable,
    /// Named schemas in registration (first-seen) order. Registration order
    /// is the stable tie-break inside dependency cycles.
    registry: IndexMap<String, NamedSchemaIR>,
    /// Names already mapped; a schema is mapped at most once.
    generated: HashSet<String>,
    /// Names discovered but not yet mapped.
    pending: VecDeque<String>,
    /// Scalar names already warned about; one warning per name per pass.
    warned_scalars: HashSet<String>,
    warnings: Vec<Warning>,
}

impl CompileSession {
    /// Start a session from configuration.
    pub fn new(config: CompileConfig) -> Self {
        let scalars = ScalarTable::with_overrides(&config.scalar_overrides);
        Self {
            config,
            scalars,
            registry: IndexMap::new(),
            generated: HashSet::new(),
            pending: VecDeque::new(),
            warned_scalars: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// The configuration this session compiles under.
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// The session's scalar table.
    pub fn scalars(&self) -> &ScalarTable {
        &self.scalars
    }

    /// Queue a named schema for mapping unless it was already seen.
    pub fn enqueue(&mut self, name: &str) {
        if self.generated.insert(name.to_string()) {
            self.pending.push_back(name.to_string());
        }
    }

    /// Next name awaiting mapping, if any.
    pub fn next_pending(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Register a completed named schema.
    ///
    /// The first registration for a name wins; the lazy-expansion
    /// bookkeeping guarantees each name is mapped once.
    pub fn register(&mut self, schema: NamedSchemaIR) {
        self.generated.insert(schema.name.clone());
        self.registry.entry(schema.name.clone()).or_insert(schema);
    }

    /// Whether a name is already registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// The registry of named schemas built so far.
    pub fn registry(&self) -> &IndexMap<String, NamedSchemaIR> {
        &self.registry
    }

    /// Record a warning.
    pub fn push_warning(&mut self, warning: Warning) {
        warn!(%warning, "compile warning");
        self.warnings.push(warning);
    }

    /// Record an unknown-scalar warning, at most once per scalar name.
    pub fn warn_unknown_scalar(&mut self, name: &str) {
        if self.warned_scalars.insert(name.to_string()) {
            self.push_warning(Warning::UnknownScalar {
                name: name.to_string(),
            });
        }
    }

    /// Warnings accumulated so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consume the session, yielding the registry (in registration order)
    /// and the accumulated warnings.
    pub fn finish(self) -> (Vec<NamedSchemaIR>, Vec<Warning>) {
        (self.registry.into_values().collect(), self.warnings)
    }
}
