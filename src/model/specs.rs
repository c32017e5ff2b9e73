// Copyright (c) 2025 - Cowboy AI, Inc.
//! Model Specifications
//!
//! Callers shape a bean model with an ordered list of [`Spec`]s: creator
//! selection, property customisation, and property addition/removal.
//! Customisers run once, in order, after base property discovery; order
//! sensitivity (e.g. `ignored_except` before an individual `significant`)
//! is the caller's responsibility.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::model::descriptor::PropertyAccessor;
use crate::model::property::{Creator, Property};
use crate::values::TypeInfo;

/// A property customisation function, applied to every discovered property
pub type Customiser = Arc<dyn Fn(&mut Property) + Send + Sync>;

/// One instruction for shaping a bean model
#[derive(Clone)]
pub enum Spec {
    /// Use this exact creator
    Creator(Creator),
    /// Use the constructor with these parameter types, under these names
    ConstructorNamed {
        /// Caller-supplied parameter names
        names: Vec<String>,
        /// Parameter types identifying the constructor overload
        types: Vec<TypeInfo>,
    },
    /// Use the unique constructor with exactly these parameter types
    ConstructorTyped {
        /// Parameter types identifying the constructor overload
        types: Vec<TypeInfo>,
    },
    /// Use the factory method with this name
    FactoryMethod {
        /// Name of the factory method
        name: String,
        /// Disambiguating parameter types, when more than one method
        /// shares the name
        types: Option<Vec<TypeInfo>>,
    },
    /// Apply a customiser to every property
    Customise(Customiser),
    /// Add a property to the model
    AddProperty(Property),
    /// Remove a named property from the model
    RemoveProperty(String),
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spec::Creator(creator) => write!(f, "Creator({})", creator.signature()),
            Spec::ConstructorNamed { names, .. } => write!(f, "ConstructorNamed({:?})", names),
            Spec::ConstructorTyped { types } => {
                let names: Vec<&str> = types.iter().map(|t| t.short_name()).collect();
                write!(f, "ConstructorTyped({:?})", names)
            }
            Spec::FactoryMethod { name, .. } => write!(f, "FactoryMethod({})", name),
            Spec::Customise(_) => write!(f, "Customise(..)"),
            Spec::AddProperty(property) => write!(f, "AddProperty({})", property.name()),
            Spec::RemoveProperty(name) => write!(f, "RemoveProperty({})", name),
        }
    }
}

fn name_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Mark the named properties as ignored
pub fn ignored(names: &[&str]) -> Spec {
    let names = name_set(names);
    Spec::Customise(Arc::new(move |property| {
        if names.contains(property.name()) {
            property.set_ignored(true);
        }
    }))
}

/// Mark every property as ignored except the named ones
pub fn ignored_except(names: &[&str]) -> Spec {
    let names = name_set(names);
    Spec::Customise(Arc::new(move |property| {
        if !names.contains(property.name()) {
            property.set_ignored(true);
        }
    }))
}

/// Mark the named properties as nullable
pub fn nullable(names: &[&str]) -> Spec {
    let names = name_set(names);
    Spec::Customise(Arc::new(move |property| {
        if names.contains(property.name()) {
            property.set_nullable(true);
        }
    }))
}

/// Mark the named properties as not nullable
pub fn not_null(names: &[&str]) -> Spec {
    let names = name_set(names);
    Spec::Customise(Arc::new(move |property| {
        if names.contains(property.name()) {
            property.set_nullable(false);
        }
    }))
}

/// Mark the named properties as significant
pub fn significant(names: &[&str]) -> Spec {
    let names = name_set(names);
    Spec::Customise(Arc::new(move |property| {
        if names.contains(property.name()) {
            property.set_significant(true);
        }
    }))
}

/// Mark the named properties as not significant
pub fn not_significant(names: &[&str]) -> Spec {
    let names = name_set(names);
    Spec::Customise(Arc::new(move |property| {
        if names.contains(property.name()) {
            property.set_significant(false);
        }
    }))
}

/// Override the declared type of one named property
pub fn with_type(name: &str, type_info: TypeInfo) -> Spec {
    let name = name.to_string();
    Spec::Customise(Arc::new(move |property| {
        if property.name() == name {
            property.set_type_override(type_info);
        }
    }))
}

/// Select the constructor with the given parameter types, naming its
/// parameters
pub fn constructor_with(names: &[&str], types: &[TypeInfo]) -> Spec {
    Spec::ConstructorNamed {
        names: names.iter().map(|n| n.to_string()).collect(),
        types: types.to_vec(),
    }
}

/// Select the unique constructor with exactly the given parameter types
pub fn constructor_of(types: &[TypeInfo]) -> Spec {
    Spec::ConstructorTyped {
        types: types.to_vec(),
    }
}

/// Select the uniquely named factory method
pub fn factory_method(name: &str) -> Spec {
    Spec::FactoryMethod {
        name: name.to_string(),
        types: None,
    }
}

/// Select the factory method with the given name and parameter types
pub fn factory_method_with(name: &str, types: &[TypeInfo]) -> Spec {
    Spec::FactoryMethod {
        name: name.to_string(),
        types: Some(types.to_vec()),
    }
}

/// Add a plain property to the model
pub fn add_property<T, V, G, S>(name: &str, get: G, set: S) -> Spec
where
    T: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
    V: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
    G: Fn(&T) -> V + Send + Sync + 'static,
    S: Fn(&mut T, V) + Send + Sync + 'static,
{
    Spec::AddProperty(Property::new(PropertyAccessor::of::<T, V, G, S>(name, get, set)))
}

/// Remove a named property from the model
pub fn remove_property(name: &str) -> Spec {
    Spec::RemoveProperty(name.to_string())
}
