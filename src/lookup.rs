// Copyright (c) 2025 - Cowboy AI, Inc.
//! Factory Resolution Engine
//!
//! Turns "I need a value of type `R` for property `P` of owner `O`" into a
//! reusable [`ValueFactory`], synthesizing one when none is registered.
//!
//! # Resolution Order
//!
//! First match wins:
//!
//! 1. An explicit per-property override from the caller's [`VerifyConfig`]
//! 2. An already-registered factory for the exact requested type
//! 3. For enumerations: a synthesized factory drawing uniformly from the
//!    constant set, registered for future lookups
//! 4. For a type different from the owner: a synthesized "populated"
//!    factory that resolves the type's full bean model and produces fully
//!    populated instances, smoke-tested once; any failure falls through
//!    with the original owner/property context
//! 5. A synthesized "unpopulated" factory that only performs default
//!    construction, smoke-tested once
//! 6. A resolution error naming the owner, the property and the requested
//!    type, with a hint to register a custom factory
//!
//! Synthesized factories are written back into the repository, amortizing
//! the cost across repeated lookups. Each bean synthesis for a given
//! (owner, property type) pair is diagnosed exactly once through the
//! context's anti-spam records.
//!
//! Self-referential properties degrade to unpopulated construction; deeper
//! cycles are cut by a visited-type stack and a depth limit carried per
//! resolution call.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::context::{TestContext, VerifyConfig};
use crate::errors::{VerifyError, VerifyResult};
use crate::model::BeanModel;
use crate::values::{TypeInfo, Value, ValueFactory, ValueKind};

/// Nested bean population stops at this depth and degrades to
/// unpopulated construction
const MAX_RESOLUTION_DEPTH: usize = 8;

/// Resolves value factories against one [`TestContext`]
#[derive(Debug, Clone)]
pub struct FactoryLookup {
    context: TestContext,
}

impl FactoryLookup {
    /// Create a lookup over the given context
    pub fn new(context: TestContext) -> Self {
        Self { context }
    }

    /// Resolve a factory for the requested type in the context of an
    /// owning property
    pub fn find_factory(
        &self,
        owner: TypeInfo,
        property: &str,
        requested: TypeInfo,
        config: Option<&VerifyConfig>,
    ) -> VerifyResult<ValueFactory> {
        let mut visited = Vec::new();
        self.find_with_stack(owner, property, requested, config, &mut visited)
    }

    fn find_with_stack(
        &self,
        owner: TypeInfo,
        property: &str,
        requested: TypeInfo,
        config: Option<&VerifyConfig>,
        visited: &mut Vec<TypeInfo>,
    ) -> VerifyResult<ValueFactory> {
        if let Some(config) = config {
            if let Some(factory) = config.override_for(property) {
                debug!(property, "using per-property override factory");
                return Ok(factory);
            }
        }

        if let Some(factory) = self.context.repository().find(requested.id()) {
            return Ok(factory);
        }

        if let Some(descriptor) = self.context.describe(requested.id()) {
            if descriptor.is_enumeration() {
                let factory = enum_factory(descriptor.enum_constants().to_vec());
                self.context.repository().register_type(requested, factory.clone());
                debug!(requested = requested.name(), "synthesized enumeration factory");
                return Ok(factory);
            }
        }

        let may_populate = requested.id() != owner.id()
            && !visited.iter().any(|seen| seen.id() == requested.id())
            && visited.len() < MAX_RESOLUTION_DEPTH;

        if may_populate {
            match self.synthesize_populated(requested, visited) {
                Ok(factory) => {
                    self.diagnose_synthesis(owner, property, requested);
                    self.context.repository().register_type(requested, factory.clone());
                    return Ok(factory);
                }
                Err(error) => {
                    debug!(
                        requested = requested.name(),
                        %error,
                        "populated factory synthesis failed, falling back to unpopulated"
                    );
                }
            }
        }

        match self.synthesize_unpopulated(requested) {
            Ok(factory) => {
                self.diagnose_synthesis(owner, property, requested);
                self.context.repository().register_type(requested, factory.clone());
                Ok(factory)
            }
            Err(error) => Err(VerifyError::Resolution {
                owner: owner.name(),
                property: property.to_string(),
                requested: requested.name(),
                source: Some(Box::new(error)),
            }),
        }
    }

    /// Synthesize a factory that produces fully populated instances
    ///
    /// Per-property factories are resolved eagerly, with the requested
    /// type pushed onto the visited stack, so a cached populated factory
    /// never re-enters resolution at creation time.
    fn synthesize_populated(
        &self,
        requested: TypeInfo,
        visited: &mut Vec<TypeInfo>,
    ) -> VerifyResult<ValueFactory> {
        let model = BeanModel::resolve(&self.context, requested, Vec::new())?;

        visited.push(requested);
        let mut factories: BTreeMap<String, ValueFactory> = BTreeMap::new();
        let mut result = Ok(());
        for name in model.populated_names() {
            let property = match model.require_property(&name) {
                Ok(property) => property,
                Err(error) => {
                    result = Err(error);
                    break;
                }
            };
            match self.find_with_stack(requested, &name, property.value_type(), None, visited) {
                Ok(factory) => {
                    factories.insert(name, factory);
                }
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
        visited.pop();
        result?;

        let factory = ValueFactory::new(move |kind| {
            let mut values = BTreeMap::new();
            for (name, factory) in &factories {
                values.insert(name.clone(), factory.create(kind)?);
            }
            model.construct(&values)
        });

        smoke_test(&factory)?;
        Ok(factory)
    }

    /// Synthesize a factory that only performs default construction
    fn synthesize_unpopulated(&self, requested: TypeInfo) -> VerifyResult<ValueFactory> {
        let descriptor = self.context.describe(requested.id()).ok_or_else(|| {
            VerifyError::configuration(format!("no descriptor registered for type {}", requested))
        })?;

        let constructor = descriptor
            .constructors()
            .iter()
            .find(|c| c.arity() == 0)
            .cloned()
            .ok_or_else(|| {
                VerifyError::configuration(format!(
                    "{} has no public no-argument constructor",
                    requested
                ))
            })?;

        let factory = ValueFactory::new(move |_kind| constructor.invoke(Vec::new()));
        smoke_test(&factory)?;
        Ok(factory)
    }

    fn diagnose_synthesis(&self, owner: TypeInfo, property: &str, requested: TypeInfo) {
        if self.context.note_synthesis(owner, requested) {
            warn!(
                property,
                requested = requested.name(),
                "using dynamically created factory; register a custom factory if this type needs canonical values"
            );
        }
    }
}

/// Build the uniform-choice factory for an enumeration's constants
fn enum_factory(constants: Vec<Value>) -> ValueFactory {
    ValueFactory::new(move |kind| {
        use rand::seq::SliceRandom;
        let value = match kind {
            ValueKind::Primary => &constants[0],
            ValueKind::Secondary => &constants[1.min(constants.len() - 1)],
            ValueKind::Random => constants
                .choose(&mut rand::thread_rng())
                .unwrap_or(&constants[0]),
        };
        Ok(value.clone())
    })
}

/// Invoke a candidate factory once, propagating any failure
fn smoke_test(factory: &ValueFactory) -> VerifyResult<()> {
    factory.create(ValueKind::Random).map(|_| ())
}
