// Copyright (c) 2025 - Cowboy AI, Inc.
//! Value Factory Repository
//!
//! Registry mapping a type to its value-generation strategy. Factories for
//! `Primary` and `Secondary` kinds must return the same value on every
//! call; `Random` values are independent per call.
//!
//! The repository is shared mutable state: concurrent verification runs
//! read and insert without coordination, and a later registration for the
//! same type simply replaces the earlier one.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::{VerifyError, VerifyResult};
use crate::values::{TypeInfo, Value, ValueKind};

/// A value-generation strategy for one type
///
/// Wraps a function from [`ValueKind`] to a freshly produced [`Value`].
/// Cloning a factory shares the underlying function.
#[derive(Clone)]
pub struct ValueFactory {
    create: Arc<dyn Fn(ValueKind) -> VerifyResult<Value> + Send + Sync>,
}

impl ValueFactory {
    /// Create a factory from a generation function
    pub fn new(create: impl Fn(ValueKind) -> VerifyResult<Value> + Send + Sync + 'static) -> Self {
        Self {
            create: Arc::new(create),
        }
    }

    /// Create a factory from two canonical values and a random generator
    pub fn from_values(
        primary: Value,
        secondary: Value,
        random: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |kind| {
            Ok(match kind {
                ValueKind::Primary => primary.clone(),
                ValueKind::Secondary => secondary.clone(),
                ValueKind::Random => random(),
            })
        })
    }

    /// Produce a value of the requested kind
    pub fn create(&self, kind: ValueKind) -> VerifyResult<Value> {
        (self.create)(kind)
    }
}

impl std::fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueFactory")
    }
}

/// Concurrent registry of value factories keyed by type
#[derive(Debug, Default)]
pub struct ValueFactoryRepository {
    factories: DashMap<TypeId, ValueFactory>,
}

impl ValueFactoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository preloaded with the built-in factories
    pub fn with_builtins() -> Self {
        let repository = Self::new();
        super::builtin::load(&repository);
        repository
    }

    /// Register a factory for type `T`
    pub fn register<T: Any>(&self, factory: ValueFactory) {
        self.factories.insert(TypeId::of::<T>(), factory);
    }

    /// Register a factory for a type known only by its `TypeInfo`
    pub fn register_type(&self, type_info: TypeInfo, factory: ValueFactory) {
        self.factories.insert(type_info.id(), factory);
    }

    /// Whether a factory is registered for the given type
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.factories.contains_key(&type_id)
    }

    /// Look up the factory for the given type
    pub fn find(&self, type_id: TypeId) -> Option<ValueFactory> {
        self.factories.get(&type_id).map(|entry| entry.clone())
    }

    /// Produce a value of the requested kind for the given type
    ///
    /// Fails with [`VerifyError::NoFactoryFound`] when no factory is
    /// registered for the type.
    pub fn create(&self, type_info: TypeInfo, kind: ValueKind) -> VerifyResult<Value> {
        match self.find(type_info.id()) {
            Some(factory) => factory.create(kind),
            None => Err(VerifyError::NoFactoryFound {
                type_name: type_info.name(),
            }),
        }
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the repository has no registered factories
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
