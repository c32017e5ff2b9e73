// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties and Creators
//!
//! A [`Property`] is one testable slot of a bean model: an accessor plus
//! the flags that drive verification. Flags are mutable only while
//! customisers run at model-build time; the model is immutable afterwards.
//!
//! A [`Creator`] is the resolved construction path: an ordered parameter
//! signature plus the function that instantiates the bean.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::errors::{VerifyError, VerifyResult};
use crate::model::descriptor::{ConstructorDescriptor, PropertyAccessor};
use crate::values::{TypeInfo, Value};

/// One testable property of a bean model
#[derive(Clone)]
pub struct Property {
    accessor: Arc<PropertyAccessor>,
    nullable: bool,
    significant: bool,
    ignored: bool,
    type_override: Option<TypeInfo>,
}

impl Property {
    /// Wrap an accessor with default flags
    ///
    /// Properties start significant, not ignored, and inherit the
    /// accessor's nullability.
    pub fn new(accessor: Arc<PropertyAccessor>) -> Self {
        let nullable = accessor.nullable();
        Self {
            accessor,
            nullable,
            significant: true,
            ignored: false,
            type_override: None,
        }
    }

    /// Property name, unique within its owner
    pub fn name(&self) -> &str {
        self.accessor.name()
    }

    /// Effective value type: the explicit override if set, otherwise the
    /// accessor's declared type
    pub fn value_type(&self) -> TypeInfo {
        self.type_override.unwrap_or_else(|| self.accessor.value_type())
    }

    /// Whether the property may hold an absent value
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the property participates in equality
    pub fn is_significant(&self) -> bool {
        self.significant
    }

    /// Whether the property is excluded from all testing
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whether the property takes part in generation and verification
    pub fn is_testable(&self) -> bool {
        !self.ignored
    }

    /// Set the nullable flag (customiser use)
    pub fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    /// Set the significant flag (customiser use)
    pub fn set_significant(&mut self, significant: bool) {
        self.significant = significant;
    }

    /// Set the ignored flag (customiser use)
    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Override the declared value type (customiser use)
    pub fn set_type_override(&mut self, type_info: TypeInfo) {
        self.type_override = Some(type_info);
    }

    /// Read this property from an instance
    pub fn get(&self, owner: &Value) -> VerifyResult<Value> {
        self.accessor.get(owner)
    }

    /// Write this property, returning the updated instance
    pub fn set(&self, owner: Value, value: Value) -> VerifyResult<Value> {
        self.accessor.set(owner, value)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name())
            .field("value_type", &self.value_type().short_name())
            .field("nullable", &self.nullable)
            .field("significant", &self.significant)
            .field("ignored", &self.ignored)
            .finish()
    }
}

/// The resolved construction path for a bean
#[derive(Clone)]
pub struct Creator {
    param_names: Vec<String>,
    param_types: Vec<TypeInfo>,
    signature: String,
    invoke: Arc<dyn Fn(Vec<Value>) -> VerifyResult<Value> + Send + Sync>,
}

impl Creator {
    /// Build a creator from an explicit signature and invoke function
    ///
    /// Validates the signature invariants: equal-length name and type
    /// lists, no empty names, unique names.
    pub fn new(
        param_names: Vec<String>,
        param_types: Vec<TypeInfo>,
        signature: String,
        invoke: Arc<dyn Fn(Vec<Value>) -> VerifyResult<Value> + Send + Sync>,
    ) -> VerifyResult<Self> {
        if param_names.len() != param_types.len() {
            return Err(VerifyError::configuration(format!(
                "creator '{}' declares {} parameter names but {} parameter types",
                signature,
                param_names.len(),
                param_types.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for name in &param_names {
            if name.is_empty() {
                return Err(VerifyError::configuration(format!(
                    "creator '{}' declares an empty parameter name",
                    signature
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(VerifyError::configuration(format!(
                    "creator '{}' declares duplicate parameter name '{}'",
                    signature, name
                )));
            }
        }
        Ok(Self {
            param_names,
            param_types,
            signature,
            invoke,
        })
    }

    /// Build a creator from a constructor descriptor with recoverable names
    pub fn from_constructor(constructor: &ConstructorDescriptor) -> VerifyResult<Self> {
        let names = constructor.param_names().ok_or_else(|| {
            VerifyError::configuration(format!(
                "parameter names are not recoverable for '{}'",
                constructor.signature()
            ))
        })?;
        Self::new(
            names.to_vec(),
            constructor.param_types().to_vec(),
            constructor.signature().to_string(),
            {
                let constructor = constructor.clone();
                Arc::new(move |args| constructor.invoke(args))
            },
        )
    }

    /// Build a creator from a constructor descriptor, substituting
    /// caller-supplied parameter names
    pub fn from_constructor_with_names(
        constructor: &ConstructorDescriptor,
        names: Vec<String>,
    ) -> VerifyResult<Self> {
        Self::new(
            names,
            constructor.param_types().to_vec(),
            constructor.signature().to_string(),
            {
                let constructor = constructor.clone();
                Arc::new(move |args| constructor.invoke(args))
            },
        )
    }

    /// Ordered (name, type) parameter pairs
    pub fn params(&self) -> impl Iterator<Item = (&str, TypeInfo)> {
        self.param_names
            .iter()
            .map(String::as_str)
            .zip(self.param_types.iter().copied())
    }

    /// Parameter names, in order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// Textual signature of the resolved construction path
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Construct an instance from ordered argument values
    pub fn invoke(&self, args: Vec<Value>) -> VerifyResult<Value> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Creator({})", self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop_invoke() -> Arc<dyn Fn(Vec<Value>) -> VerifyResult<Value> + Send + Sync> {
        Arc::new(|_| Ok(Value::new(0_i32)))
    }

    #[test]
    fn test_creator_validation() {
        let ok = Creator::new(
            vec!["a".to_string(), "b".to_string()],
            vec![TypeInfo::of::<i32>(), TypeInfo::of::<String>()],
            "T(a, b)".to_string(),
            noop_invoke(),
        );
        assert!(ok.is_ok());

        let mismatched = Creator::new(
            vec!["a".to_string()],
            vec![TypeInfo::of::<i32>(), TypeInfo::of::<String>()],
            "T(a)".to_string(),
            noop_invoke(),
        );
        assert!(matches!(mismatched, Err(VerifyError::Configuration(_))));

        let duplicate = Creator::new(
            vec!["a".to_string(), "a".to_string()],
            vec![TypeInfo::of::<i32>(), TypeInfo::of::<i32>()],
            "T(a, a)".to_string(),
            noop_invoke(),
        );
        assert!(matches!(duplicate, Err(VerifyError::Configuration(_))));

        let empty = Creator::new(
            vec!["".to_string()],
            vec![TypeInfo::of::<i32>()],
            "T()".to_string(),
            noop_invoke(),
        );
        assert!(matches!(empty, Err(VerifyError::Configuration(_))));
    }

    #[test]
    fn test_creator_params_iteration() {
        let creator = Creator::new(
            vec!["x".to_string(), "y".to_string()],
            vec![TypeInfo::of::<u8>(), TypeInfo::of::<u16>()],
            "P(x, y)".to_string(),
            noop_invoke(),
        )
        .unwrap();

        let params: Vec<(&str, TypeInfo)> = creator.params().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].0, "x");
        assert_eq!(params[1].1, TypeInfo::of::<u16>());
    }
}
