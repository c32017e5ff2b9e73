// Copyright (c) 2025 - Cowboy AI, Inc.
//! Type Descriptors
//!
//! Rust has no runtime reflection, so every type that takes part in
//! verification is described ahead of time by a [`BeanDescriptor`]: its
//! constructors and factory methods, its readable/writable properties, and
//! (for enumerations) its constant set. Descriptors are built with
//! [`BeanDescriptor::builder`] and registered in a [`DescriptorRegistry`],
//! which implements the [`ReflectionProvider`] capability consumed by the
//! rest of the crate.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! struct Widget {
//!     id: i64,
//!     note: String,
//! }
//!
//! let descriptor = BeanDescriptor::builder::<Widget>()
//!     .constructor(&["id", "note"], &[TypeInfo::of::<i64>(), TypeInfo::of::<String>()], |mut args| {
//!         Ok(Widget { id: args.take()?, note: args.take()? })
//!     })
//!     .property("id", |w: &Widget| w.id, |w, v| w.id = v)
//!     .property("note", |w: &Widget| w.note.clone(), |w, v| w.note = v)
//!     .build()?;
//! ```

use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::{VerifyError, VerifyResult};
use crate::values::{TypeInfo, Value};

/// Ordered argument list handed to a constructor closure
pub struct ArgList {
    values: std::vec::IntoIter<Value>,
}

impl ArgList {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Take the next argument as `T`
    pub fn take<T: Any + Clone>(&mut self) -> VerifyResult<T> {
        self.next_value()?.extract()
    }

    /// Take the next argument as `Option<T>`, mapping absent to `None`
    pub fn take_optional<T: Any + Clone>(&mut self) -> VerifyResult<Option<T>> {
        self.next_value()?.extract_optional()
    }

    fn next_value(&mut self) -> VerifyResult<Value> {
        self.values
            .next()
            .ok_or_else(|| VerifyError::creation("constructor received too few arguments"))
    }
}

/// How to read and write one named property of a bean
///
/// Setters are functional: they consume the owning instance and return the
/// updated one, so instances themselves stay immutable.
#[derive(Clone)]
pub struct PropertyAccessor {
    name: String,
    value_type: TypeInfo,
    nullable: bool,
    get: Arc<dyn Fn(&Value) -> VerifyResult<Value> + Send + Sync>,
    set: Arc<dyn Fn(Value, Value) -> VerifyResult<Value> + Send + Sync>,
}

impl PropertyAccessor {
    fn from_parts<T, V, G, S>(wrap: fn(T) -> Value, name: &str, get: G, set: S, nullable: bool) -> Arc<Self>
    where
        T: Any + Clone + Send + Sync,
        V: Any + Clone + PartialEq + fmt::Debug + Send + Sync,
        G: Fn(&T) -> VerifyResult<Value> + Send + Sync + 'static,
        S: Fn(&mut T, &Value) -> VerifyResult<()> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.to_string(),
            value_type: TypeInfo::of::<V>(),
            nullable,
            get: Arc::new(move |owner: &Value| {
                let bean = owner.downcast_ref::<T>().ok_or(VerifyError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                    actual: owner.type_info().name(),
                })?;
                get(bean)
            }),
            set: Arc::new(move |owner: Value, value: Value| {
                let mut bean: T = owner.extract()?;
                set(&mut bean, &value)?;
                Ok(wrap(bean))
            }),
        })
    }

    /// Accessor for a plain hashable property
    pub fn of<T, V, G, S>(name: &str, get: G, set: S) -> Arc<Self>
    where
        T: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        V: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_wrap(Value::new::<T>, name, get, set)
    }

    pub(crate) fn with_wrap<T, V, G, S>(wrap: fn(T) -> Value, name: &str, get: G, set: S) -> Arc<Self>
    where
        T: Any + Clone + Send + Sync,
        V: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::from_parts::<T, V, _, _>(
            wrap,
            name,
            move |bean| Ok(Value::new(get(bean))),
            move |bean, value| {
                set(bean, value.extract::<V>()?);
                Ok(())
            },
            false,
        )
    }

    pub(crate) fn with_wrap_nullable<T, V, G, S>(wrap: fn(T) -> Value, name: &str, get: G, set: S) -> Arc<Self>
    where
        T: Any + Clone + Send + Sync,
        V: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        G: Fn(&T) -> Option<V> + Send + Sync + 'static,
        S: Fn(&mut T, Option<V>) + Send + Sync + 'static,
    {
        Self::from_parts::<T, V, _, _>(
            wrap,
            name,
            move |bean| {
                Ok(match get(bean) {
                    Some(value) => Value::new(value),
                    None => Value::absent::<V>(),
                })
            },
            move |bean, value| {
                set(bean, value.extract_optional::<V>()?);
                Ok(())
            },
            true,
        )
    }

    pub(crate) fn with_wrap_without_hash<T, V, G, S>(wrap: fn(T) -> Value, name: &str, get: G, set: S) -> Arc<Self>
    where
        T: Any + Clone + Send + Sync,
        V: Any + Clone + PartialEq + fmt::Debug + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::from_parts::<T, V, _, _>(
            wrap,
            name,
            move |bean| Ok(Value::without_hash(get(bean))),
            move |bean, value| {
                set(bean, value.extract::<V>()?);
                Ok(())
            },
            false,
        )
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the property's value
    pub fn value_type(&self) -> TypeInfo {
        self.value_type
    }

    /// Whether the property legitimately holds an absent value
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Read the property from an instance
    pub fn get(&self, owner: &Value) -> VerifyResult<Value> {
        (self.get)(owner)
    }

    /// Write the property, returning the updated instance
    pub fn set(&self, owner: Value, value: Value) -> VerifyResult<Value> {
        (self.set)(owner, value)
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("name", &self.name)
            .field("value_type", &self.value_type.short_name())
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// One way of constructing an instance: a constructor or factory method
#[derive(Clone)]
pub struct ConstructorDescriptor {
    param_names: Option<Vec<String>>,
    param_types: Vec<TypeInfo>,
    factory_name: Option<String>,
    signature: String,
    invoke: Arc<dyn Fn(Vec<Value>) -> VerifyResult<Value> + Send + Sync>,
}

impl ConstructorDescriptor {
    /// Parameter names, when recoverable
    pub fn param_names(&self) -> Option<&[String]> {
        self.param_names.as_deref()
    }

    /// Parameter types, in order
    pub fn param_types(&self) -> &[TypeInfo] {
        &self.param_types
    }

    /// Name of the factory method, or `None` for a plain constructor
    pub fn factory_name(&self) -> Option<&str> {
        self.factory_name.as_deref()
    }

    /// Textual signature, used for deterministic ordering and diagnostics
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// Construct an instance from the given arguments
    pub fn invoke(&self, args: Vec<Value>) -> VerifyResult<Value> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorDescriptor({})", self.signature)
    }
}

/// Everything the crate knows about one type
#[derive(Debug, Clone)]
pub struct BeanDescriptor {
    bean_type: TypeInfo,
    constructors: Vec<ConstructorDescriptor>,
    properties: Vec<Arc<PropertyAccessor>>,
    enum_constants: Vec<Value>,
}

impl BeanDescriptor {
    /// Start a descriptor for a hashable type
    pub fn builder<T>() -> BeanDescriptorBuilder<T>
    where
        T: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
    {
        BeanDescriptorBuilder::new(Value::new::<T>)
    }

    /// Start a descriptor for a type that does not implement `Hash`
    ///
    /// Hash-code assertions are skipped for instances of such a type.
    pub fn builder_without_hash<T>() -> BeanDescriptorBuilder<T>
    where
        T: Any + Clone + PartialEq + fmt::Debug + Send + Sync,
    {
        BeanDescriptorBuilder::new(Value::without_hash::<T>)
    }

    /// Describe an enumeration by its full constant set
    pub fn enumeration<T, I>(constants: I) -> VerifyResult<Self>
    where
        T: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        let constants: Vec<Value> = constants.into_iter().map(Value::new).collect();
        if constants.is_empty() {
            return Err(VerifyError::configuration(format!(
                "enumeration {} must declare at least one constant",
                std::any::type_name::<T>()
            )));
        }
        Ok(Self {
            bean_type: TypeInfo::of::<T>(),
            constructors: Vec::new(),
            properties: Vec::new(),
            enum_constants: constants,
        })
    }

    /// Identity of the described type
    pub fn bean_type(&self) -> TypeInfo {
        self.bean_type
    }

    /// All declared constructors and factory methods
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// All declared properties
    pub fn properties(&self) -> &[Arc<PropertyAccessor>] {
        &self.properties
    }

    /// Constants of an enumeration type, empty for non-enums
    pub fn enum_constants(&self) -> &[Value] {
        &self.enum_constants
    }

    /// Whether this descriptor describes an enumeration
    pub fn is_enumeration(&self) -> bool {
        !self.enum_constants.is_empty()
    }

    /// Find a declared property by name
    pub fn find_property(&self, name: &str) -> Option<&Arc<PropertyAccessor>> {
        self.properties.iter().find(|p| p.name() == name)
    }
}

/// Builder for [`BeanDescriptor`]
pub struct BeanDescriptorBuilder<T> {
    bean_type: TypeInfo,
    wrap: fn(T) -> Value,
    constructors: Vec<ConstructorDescriptor>,
    properties: Vec<Arc<PropertyAccessor>>,
    defect: Option<VerifyError>,
}

impl<T> BeanDescriptorBuilder<T>
where
    T: Any + Clone + Send + Sync,
{
    fn new(wrap: fn(T) -> Value) -> Self {
        Self {
            bean_type: TypeInfo::of::<T>(),
            wrap,
            constructors: Vec::new(),
            properties: Vec::new(),
            defect: None,
        }
    }

    fn signature(&self, factory_name: Option<&str>, names: Option<&[String]>, types: &[TypeInfo]) -> String {
        let mut parts = Vec::with_capacity(types.len());
        for (index, ty) in types.iter().enumerate() {
            match names.and_then(|n| n.get(index)) {
                Some(name) => parts.push(format!("{}: {}", name, ty.short_name())),
                None => parts.push(ty.short_name().to_string()),
            }
        }
        match factory_name {
            Some(factory) => format!("{}::{}({})", self.bean_type.short_name(), factory, parts.join(", ")),
            None => format!("{}({})", self.bean_type.short_name(), parts.join(", ")),
        }
    }

    fn push_constructor<F>(
        mut self,
        factory_name: Option<&str>,
        names: Option<Vec<String>>,
        types: Vec<TypeInfo>,
        invoke: F,
    ) -> Self
    where
        F: Fn(ArgList) -> VerifyResult<T> + Send + Sync + 'static,
    {
        if let Some(names) = &names {
            if names.len() != types.len() {
                self.defect = Some(VerifyError::configuration(format!(
                    "constructor for {} declares {} parameter names but {} parameter types",
                    self.bean_type.name(),
                    names.len(),
                    types.len()
                )));
                return self;
            }
        }
        let signature = self.signature(factory_name, names.as_deref(), &types);
        let wrap = self.wrap;
        let arity = types.len();
        self.constructors.push(ConstructorDescriptor {
            param_names: names,
            param_types: types,
            factory_name: factory_name.map(str::to_string),
            signature,
            invoke: Arc::new(move |args: Vec<Value>| {
                if args.len() != arity {
                    return Err(VerifyError::creation(format!(
                        "expected {} constructor arguments, got {}",
                        arity,
                        args.len()
                    )));
                }
                invoke(ArgList::new(args)).map(wrap)
            }),
        });
        self
    }

    /// Declare a constructor with named parameters
    pub fn constructor<F>(self, names: &[&str], types: &[TypeInfo], invoke: F) -> Self
    where
        F: Fn(ArgList) -> VerifyResult<T> + Send + Sync + 'static,
    {
        let names = names.iter().map(|n| n.to_string()).collect();
        self.push_constructor(None, Some(names), types.to_vec(), invoke)
    }

    /// Declare a constructor whose parameter names are not recoverable
    /// (e.g. a tuple struct)
    pub fn constructor_unnamed<F>(self, types: &[TypeInfo], invoke: F) -> Self
    where
        F: Fn(ArgList) -> VerifyResult<T> + Send + Sync + 'static,
    {
        self.push_constructor(None, None, types.to_vec(), invoke)
    }

    /// Declare a no-argument constructor
    pub fn constructor_no_args<F>(self, construct: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.push_constructor(None, Some(Vec::new()), Vec::new(), move |_| Ok(construct()))
    }

    /// Declare a named factory method
    pub fn factory_method<F>(self, name: &str, param_names: &[&str], types: &[TypeInfo], invoke: F) -> Self
    where
        F: Fn(ArgList) -> VerifyResult<T> + Send + Sync + 'static,
    {
        let param_names = param_names.iter().map(|n| n.to_string()).collect();
        self.push_constructor(Some(name), Some(param_names), types.to_vec(), invoke)
    }

    /// Declare a plain property
    pub fn property<V, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        V: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.properties.push(PropertyAccessor::with_wrap(self.wrap, name, get, set));
        self
    }

    /// Declare a nullable property backed by an `Option` field
    pub fn property_nullable<V, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        V: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
        G: Fn(&T) -> Option<V> + Send + Sync + 'static,
        S: Fn(&mut T, Option<V>) + Send + Sync + 'static,
    {
        self.properties.push(PropertyAccessor::with_wrap_nullable(self.wrap, name, get, set));
        self
    }

    /// Declare a property whose value type does not implement `Hash`
    pub fn property_without_hash<V, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        V: Any + Clone + PartialEq + fmt::Debug + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.properties
            .push(PropertyAccessor::with_wrap_without_hash(self.wrap, name, get, set));
        self
    }

    /// Finish the descriptor, validating its internal consistency
    pub fn build(self) -> VerifyResult<BeanDescriptor> {
        if let Some(defect) = self.defect {
            return Err(defect);
        }

        let mut seen = BTreeSet::new();
        for property in &self.properties {
            if !seen.insert(property.name().to_string()) {
                return Err(VerifyError::configuration(format!(
                    "duplicate property '{}' on {}",
                    property.name(),
                    self.bean_type.name()
                )));
            }
        }

        Ok(BeanDescriptor {
            bean_type: self.bean_type,
            constructors: self.constructors,
            properties: self.properties,
            enum_constants: Vec::new(),
        })
    }
}

/// Capability interface for looking up type descriptors
pub trait ReflectionProvider: Send + Sync {
    /// Describe a type, or `None` when it has no registered descriptor
    fn describe(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>>;
}

/// Concurrent registry of type descriptors
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: DashMap<TypeId, Arc<BeanDescriptor>>,
}

impl DescriptorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any earlier one for the same type
    pub fn register(&self, descriptor: BeanDescriptor) -> Arc<BeanDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors.insert(descriptor.bean_type().id(), Arc::clone(&descriptor));
        descriptor
    }

    /// Look up the descriptor for a type
    pub fn get(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        self.descriptors.get(&type_id).map(|entry| Arc::clone(entry.value()))
    }
}

impl ReflectionProvider for DescriptorRegistry {
    fn describe(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        self.get(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Sample {
        id: i64,
        note: String,
    }

    fn sample_descriptor() -> BeanDescriptor {
        BeanDescriptor::builder::<Sample>()
            .constructor(
                &["id", "note"],
                &[TypeInfo::of::<i64>(), TypeInfo::of::<String>()],
                |mut args| {
                    Ok(Sample {
                        id: args.take()?,
                        note: args.take()?,
                    })
                },
            )
            .property("id", |s: &Sample| s.id, |s, v| s.id = v)
            .property("note", |s: &Sample| s.note.clone(), |s, v| s.note = v)
            .build()
            .unwrap()
    }

    #[test]
    fn test_constructor_invoke() {
        let descriptor = sample_descriptor();
        let instance = descriptor.constructors()[0]
            .invoke(vec![Value::new(7_i64), Value::new("x".to_string())])
            .unwrap();

        let sample = instance.extract::<Sample>().unwrap();
        assert_eq!(sample.id, 7);
        assert_eq!(sample.note, "x");
    }

    #[test]
    fn test_constructor_arity_checked() {
        let descriptor = sample_descriptor();
        let result = descriptor.constructors()[0].invoke(vec![Value::new(7_i64)]);
        assert!(matches!(result, Err(VerifyError::Creation(_))));
    }

    #[test]
    fn test_property_round_trip() {
        let descriptor = sample_descriptor();
        let instance = descriptor.constructors()[0]
            .invoke(vec![Value::new(1_i64), Value::new("a".to_string())])
            .unwrap();

        let accessor = descriptor.find_property("id").unwrap();
        let updated = accessor.set(instance, Value::new(42_i64)).unwrap();
        let read = accessor.get(&updated).unwrap();
        assert_eq!(read.extract::<i64>().unwrap(), 42);
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let result = BeanDescriptor::builder::<Sample>()
            .property("id", |s: &Sample| s.id, |s, v| s.id = v)
            .property("id", |s: &Sample| s.id, |s, v| s.id = v)
            .build();
        assert!(matches!(result, Err(VerifyError::Configuration(_))));
    }

    #[test]
    fn test_name_type_length_mismatch_rejected() {
        let result = BeanDescriptor::builder::<Sample>()
            .constructor(&["id"], &[TypeInfo::of::<i64>(), TypeInfo::of::<String>()], |mut args| {
                Ok(Sample {
                    id: args.take()?,
                    note: args.take()?,
                })
            })
            .build();
        assert!(matches!(result, Err(VerifyError::Configuration(_))));
    }

    #[test]
    fn test_signature_rendering() {
        let descriptor = sample_descriptor();
        assert_eq!(descriptor.constructors()[0].signature(), "Sample(id: i64, note: String)");
    }

    #[test]
    fn test_enumeration_descriptor() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        enum Color {
            Red,
            Green,
        }

        let descriptor = BeanDescriptor::enumeration([Color::Red, Color::Green]).unwrap();
        assert!(descriptor.is_enumeration());
        assert_eq!(descriptor.enum_constants().len(), 2);

        let empty: [Color; 0] = [];
        assert!(BeanDescriptor::enumeration(empty).is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = DescriptorRegistry::new();
        registry.register(sample_descriptor());

        assert!(registry.describe(TypeId::of::<Sample>()).is_some());
        assert!(registry.describe(TypeId::of::<u128>()).is_none());
    }
}
