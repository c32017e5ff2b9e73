// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bean Models
//!
//! A [`BeanModel`] describes how one type is tested: its testable
//! properties and the [`Creator`] used to instantiate it. Models are
//! resolved from a registered [`BeanDescriptor`](descriptor::BeanDescriptor)
//! plus an ordered list of caller [`Spec`]s, validated eagerly, and cached
//! per type when no specs are supplied.
//!
//! # Creator Resolution
//!
//! Precedence, first match wins:
//!
//! 1. An explicit [`Spec::Creator`]
//! 2. A constructor matched against an explicit (name, type) list
//! 3. A constructor matched against an explicit type list
//! 4. A named factory method (with optional disambiguating types)
//! 5. Automatic selection: among constructors whose parameter names are
//!    recoverable, the one with the fewest parameters, ties broken by the
//!    textual signature
//!
//! Constructors without recoverable parameter names are skipped with a
//! one-time diagnostic; if no candidate qualifies, model build fails.

pub mod descriptor;
pub mod property;
pub mod specs;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::context::TestContext;
use crate::errors::{VerifyError, VerifyResult};
use crate::values::{TypeInfo, Value};

pub use descriptor::{
    ArgList, BeanDescriptor, BeanDescriptorBuilder, ConstructorDescriptor, DescriptorRegistry,
    PropertyAccessor, ReflectionProvider,
};
pub use property::{Creator, Property};
pub use specs::Spec;

/// The testable shape of one type: properties plus a creator
#[derive(Debug, Clone)]
pub struct BeanModel {
    bean_type: TypeInfo,
    properties: BTreeMap<String, Property>,
    creator: Creator,
}

impl BeanModel {
    /// Resolve the model for a type, applying the given specs in order
    ///
    /// Resolution with an empty spec list is cached in the context;
    /// rebuilding for the same type is deterministic either way.
    pub fn resolve(context: &TestContext, bean_type: TypeInfo, specs: Vec<Spec>) -> VerifyResult<Arc<Self>> {
        if specs.is_empty() {
            if let Some(model) = context.cached_model(bean_type.id()) {
                return Ok(model);
            }
        }

        let descriptor = context.describe(bean_type.id()).ok_or_else(|| {
            VerifyError::configuration(format!("no descriptor registered for type {}", bean_type))
        })?;

        let creator = resolve_creator(context, &descriptor, &specs)?;

        let mut properties: BTreeMap<String, Property> = descriptor
            .properties()
            .iter()
            .map(|accessor| (accessor.name().to_string(), Property::new(Arc::clone(accessor))))
            .collect();

        for spec in &specs {
            match spec {
                Spec::AddProperty(property) => {
                    properties.insert(property.name().to_string(), property.clone());
                }
                Spec::RemoveProperty(name) => {
                    properties.remove(name);
                }
                Spec::Customise(customiser) => {
                    for property in properties.values_mut() {
                        customiser(property);
                    }
                }
                _ => {}
            }
        }

        for (name, _type_info) in creator.params() {
            if !properties.contains_key(name) {
                return Err(VerifyError::configuration(format!(
                    "creator parameter '{}' of '{}' has no matching property",
                    name,
                    creator.signature()
                )));
            }
        }

        debug!(
            bean_type = bean_type.name(),
            creator = creator.signature(),
            properties = properties.len(),
            "resolved bean model"
        );

        let model = Arc::new(Self {
            bean_type,
            properties,
            creator,
        });

        if specs.is_empty() {
            context.cache_model(Arc::clone(&model));
        }

        Ok(model)
    }

    /// Identity of the modelled type
    pub fn bean_type(&self) -> TypeInfo {
        self.bean_type
    }

    /// The resolved creator
    pub fn creator(&self) -> &Creator {
        &self.creator
    }

    /// All properties of the model, ordered by name
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Look up a property by name, failing with `UnknownProperty`
    pub fn require_property(&self, name: &str) -> VerifyResult<&Property> {
        self.property(name).ok_or_else(|| VerifyError::UnknownProperty {
            owner: self.bean_type.name(),
            property: name.to_string(),
        })
    }

    /// Names of all testable (non-ignored) properties, in order
    pub fn testable_names(&self) -> Vec<String> {
        self.properties
            .values()
            .filter(|p| p.is_testable())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Names of the properties that must hold a value before construction:
    /// every testable property plus every creator parameter
    pub fn populated_names(&self) -> Vec<String> {
        let mut names: BTreeMap<&str, ()> = self
            .properties
            .values()
            .filter(|p| p.is_testable())
            .map(|p| (p.name(), ()))
            .collect();
        for (name, _) in self.creator.params() {
            names.entry(name).or_insert(());
        }
        names.into_keys().map(str::to_string).collect()
    }

    /// Construct a fresh instance from a map of property values
    ///
    /// Creator parameters are drawn from the map by name; every other
    /// testable property present in the map is applied through its
    /// accessor afterwards.
    pub fn construct(&self, values: &BTreeMap<String, Value>) -> VerifyResult<Value> {
        let mut args = Vec::with_capacity(self.creator.arity());
        for (name, _type_info) in self.creator.params() {
            let value = values.get(name).ok_or_else(|| {
                VerifyError::creation(format!(
                    "no value available for creator parameter '{}' of '{}'",
                    name,
                    self.creator.signature()
                ))
            })?;
            args.push(value.clone());
        }

        let mut instance = self.creator.invoke(args)?;

        let creator_params: Vec<&str> = self.creator.param_names().iter().map(String::as_str).collect();
        for property in self.properties.values() {
            if !property.is_testable() || creator_params.contains(&property.name()) {
                continue;
            }
            if let Some(value) = values.get(property.name()) {
                instance = property.set(instance, value.clone())?;
            }
        }

        Ok(instance)
    }
}

fn find_by_types<'a>(
    descriptor: &'a BeanDescriptor,
    types: &[TypeInfo],
) -> Option<&'a ConstructorDescriptor> {
    descriptor
        .constructors()
        .iter()
        .filter(|c| c.factory_name().is_none())
        .find(|c| c.param_types() == types)
}

fn resolve_creator(
    context: &TestContext,
    descriptor: &BeanDescriptor,
    specs: &[Spec],
) -> VerifyResult<Creator> {
    for spec in specs {
        match spec {
            Spec::Creator(creator) => return Ok(creator.clone()),
            Spec::ConstructorNamed { names, types } => {
                let constructor = find_by_types(descriptor, types).ok_or_else(|| {
                    VerifyError::configuration(format!(
                        "{} has no constructor with parameter types {:?}",
                        descriptor.bean_type(),
                        types.iter().map(|t| t.short_name()).collect::<Vec<_>>()
                    ))
                })?;
                return Creator::from_constructor_with_names(constructor, names.clone());
            }
            Spec::ConstructorTyped { types } => {
                let constructor = find_by_types(descriptor, types).ok_or_else(|| {
                    VerifyError::configuration(format!(
                        "{} has no constructor with parameter types {:?}",
                        descriptor.bean_type(),
                        types.iter().map(|t| t.short_name()).collect::<Vec<_>>()
                    ))
                })?;
                return Creator::from_constructor(constructor);
            }
            Spec::FactoryMethod { name, types } => {
                let mut candidates: Vec<&ConstructorDescriptor> = descriptor
                    .constructors()
                    .iter()
                    .filter(|c| c.factory_name() == Some(name.as_str()))
                    .collect();
                if let Some(types) = types {
                    candidates.retain(|c| c.param_types() == types.as_slice());
                }
                match candidates.len() {
                    0 => {
                        return Err(VerifyError::configuration(format!(
                            "no factory method named '{}' found on {}",
                            name,
                            descriptor.bean_type()
                        )))
                    }
                    1 => return Creator::from_constructor(candidates[0]),
                    _ => {
                        return Err(VerifyError::configuration(format!(
                            "multiple factory methods named '{}' found on {}; supply parameter types",
                            name,
                            descriptor.bean_type()
                        )))
                    }
                }
            }
            _ => {}
        }
    }

    automatic_creator(context, descriptor)
}

fn automatic_creator(context: &TestContext, descriptor: &BeanDescriptor) -> VerifyResult<Creator> {
    let mut candidates: Vec<&ConstructorDescriptor> = descriptor
        .constructors()
        .iter()
        .filter(|c| c.factory_name().is_none())
        .collect();
    candidates.sort_by(|a, b| a.arity().cmp(&b.arity()).then_with(|| a.signature().cmp(b.signature())));

    for candidate in &candidates {
        if candidate.param_names().is_none() {
            context.note_skipped_creator(descriptor.bean_type(), candidate.signature());
            continue;
        }
        return Creator::from_constructor(candidate);
    }

    Err(VerifyError::configuration(format!(
        "no suitable constructor found for {}: no public constructor with recoverable parameter names",
        descriptor.bean_type()
    )))
}
