// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Context
//!
//! A [`TestContext`] owns every piece of shared state a verification run
//! needs: the value factory repository, the descriptor registry, the
//! per-type model cache, and the anti-spam bookkeeping for dynamic
//! factory synthesis. Contexts are cheap to clone (all state is shared)
//! and safe to use from multiple threads at once.
//!
//! There is no hidden global registry: callers create and thread their
//! own context. A single process-wide instance is offered through
//! [`default_context`] for convenience only.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use once_cell::sync::Lazy;
use tracing::warn;

use crate::errors::VerifyResult;
use crate::lookup::FactoryLookup;
use crate::model::{BeanDescriptor, BeanModel, DescriptorRegistry, ReflectionProvider};
use crate::values::{TypeInfo, Value, ValueFactory, ValueFactoryRepository, ValueKind};

/// Synthesis records above this size trigger a trim
const SYNTHESIS_HIGH_WATER: usize = 1000;

/// Trimming removes records until roughly this many remain
const SYNTHESIS_LOW_WATER: usize = 50;

static DEFAULT_CONTEXT: Lazy<TestContext> = Lazy::new(TestContext::new);

/// The process-wide default context
pub fn default_context() -> &'static TestContext {
    &DEFAULT_CONTEXT
}

#[derive(Debug)]
struct ContextInner {
    repository: ValueFactoryRepository,
    descriptors: DescriptorRegistry,
    models: DashMap<TypeId, Arc<BeanModel>>,
    synthesized: DashSet<String>,
    skipped_creators: DashSet<(TypeId, String)>,
}

/// Owned context for verification runs
#[derive(Debug, Clone)]
pub struct TestContext {
    inner: Arc<ContextInner>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a context preloaded with the built-in value factories
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                repository: ValueFactoryRepository::with_builtins(),
                descriptors: DescriptorRegistry::new(),
                models: DashMap::new(),
                synthesized: DashSet::new(),
                skipped_creators: DashSet::new(),
            }),
        }
    }

    /// The value factory repository shared by this context
    pub fn repository(&self) -> &ValueFactoryRepository {
        &self.inner.repository
    }

    /// Register a value factory for type `T`
    pub fn register_factory<T: Any>(&self, factory: ValueFactory) {
        self.inner.repository.register::<T>(factory);
    }

    /// Register a type descriptor
    pub fn register_descriptor(&self, descriptor: BeanDescriptor) -> Arc<BeanDescriptor> {
        self.inner.descriptors.register(descriptor)
    }

    /// Look up the descriptor for a type
    pub fn describe(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        self.inner.descriptors.describe(type_id)
    }

    /// Produce a value for a property, resolving a factory through the
    /// full fallback chain
    pub fn create_value(
        &self,
        owner: TypeInfo,
        property: &str,
        requested: TypeInfo,
        kind: ValueKind,
        overrides: Option<&VerifyConfig>,
    ) -> VerifyResult<Value> {
        FactoryLookup::new(self.clone())
            .find_factory(owner, property, requested, overrides)?
            .create(kind)
    }

    pub(crate) fn cached_model(&self, type_id: TypeId) -> Option<Arc<BeanModel>> {
        self.inner.models.get(&type_id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn cache_model(&self, model: Arc<BeanModel>) {
        self.inner.models.insert(model.bean_type().id(), model);
    }

    /// Record a dynamic synthesis for an (owner, property type) pair
    ///
    /// Returns `true` exactly when this pair has not been recorded before;
    /// callers emit their diagnostic only on `true`. The record set is
    /// trimmed toward a low-water mark once it passes the high-water mark;
    /// which members survive a trim is unspecified.
    pub(crate) fn note_synthesis(&self, owner: TypeInfo, requested: TypeInfo) -> bool {
        let records = &self.inner.synthesized;
        if records.len() > SYNTHESIS_HIGH_WATER {
            let mut excess = records.len().saturating_sub(SYNTHESIS_LOW_WATER);
            records.retain(|_| {
                if excess > 0 {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
        }
        records.insert(format!("{}.{}", owner.name(), requested.name()))
    }

    /// Number of recorded synthesis events (diagnostic bookkeeping)
    pub(crate) fn synthesis_record_count(&self) -> usize {
        self.inner.synthesized.len()
    }

    /// Warn once per skipped constructor whose parameter names are not
    /// recoverable
    pub(crate) fn note_skipped_creator(&self, bean_type: TypeInfo, signature: &str) {
        if self
            .inner
            .skipped_creators
            .insert((bean_type.id(), signature.to_string()))
        {
            warn!(
                bean_type = bean_type.name(),
                signature, "skipping constructor: parameter names are not recoverable"
            );
        }
    }
}

/// Per-run configuration: property factory overrides and hash checking
#[derive(Clone)]
pub struct VerifyConfig {
    overrides: HashMap<String, ValueFactory>,
    check_hashes: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl VerifyConfig {
    /// Create a configuration with no overrides and hash checking enabled
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            check_hashes: true,
        }
    }

    /// Override the factory used for one named property
    pub fn override_factory(mut self, property: &str, factory: ValueFactory) -> Self {
        self.overrides.insert(property.to_string(), factory);
        self
    }

    /// Enable or disable hash-code checking
    pub fn check_hashes(mut self, enabled: bool) -> Self {
        self.check_hashes = enabled;
        self
    }

    /// The override factory for a property, if configured
    pub fn override_for(&self, property: &str) -> Option<ValueFactory> {
        self.overrides.get(property).cloned()
    }

    /// Whether hash-code checking is enabled
    pub fn hashes_enabled(&self) -> bool {
        self.check_hashes
    }
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("check_hashes", &self.check_hashes)
            .finish()
    }
}
