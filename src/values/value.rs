// Copyright (c) 2025 - Cowboy AI, Inc.
//! Type-Erased Value Handles
//!
//! A [`Value`] wraps one instance of an arbitrary type together with the
//! comparison, hashing and formatting functions captured from that type's
//! trait implementations. Values are how property contents and bean
//! instances flow through factories, holders and the verifier without the
//! crate knowing their concrete types.
//!
//! # Characteristics
//!
//! - **Immutable**: the wrapped instance is never mutated; cloning a Value
//!   shares the payload
//! - **Comparable**: [`Value::value_eq`] dispatches to the wrapped type's
//!   `PartialEq` implementation
//! - **Optionally hashable**: hash support is captured at construction and
//!   absent for types that do not implement `Hash`
//! - **Nullable**: a distinguished *absent* state models a property that
//!   legitimately holds no value
//!
//! # Examples
//!
//! ```rust
//! use beancheck::values::Value;
//!
//! let a = Value::new(42_i64);
//! let b = Value::new(42_i64);
//! let c = Value::new(7_i64);
//!
//! assert!(a.value_eq(&b));
//! assert!(!a.value_eq(&c));
//! assert_eq!(a.hash_value(), b.hash_value());
//! ```

use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{VerifyError, VerifyResult};

/// The kind of value a factory is asked to produce
///
/// `Primary` and `Secondary` are fixed canonical values that are stable
/// across calls and distinct from each other. `Random` values differ
/// between calls with high probability and carry no reproducibility
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// First canonical value, stable across calls
    Primary,
    /// Second canonical value, stable across calls and distinct from Primary
    Secondary,
    /// Independent value per call
    Random,
}

/// Identity of a Rust type: its `TypeId` plus its name for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Capture the identity of type `T`
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the described type
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full name of the described type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name without its module path
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

type AnyPayload = dyn Any + Send + Sync;

#[derive(Clone)]
enum Inner {
    Absent,
    Present {
        payload: Arc<AnyPayload>,
        eq_fn: fn(&AnyPayload, &AnyPayload) -> bool,
        hash_fn: Option<fn(&AnyPayload) -> u64>,
        debug_fn: fn(&AnyPayload) -> String,
    },
}

/// Type-erased handle around one instance of an arbitrary type
#[derive(Clone)]
pub struct Value {
    type_info: TypeInfo,
    inner: Inner,
}

fn eq_impl<T: Any + PartialEq>(a: &AnyPayload, b: &AnyPayload) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn hash_impl<T: Any + Hash>(value: &AnyPayload) -> u64 {
    let mut hasher = DefaultHasher::new();
    if let Some(v) = value.downcast_ref::<T>() {
        v.hash(&mut hasher);
    }
    hasher.finish()
}

fn debug_impl<T: Any + fmt::Debug>(value: &AnyPayload) -> String {
    match value.downcast_ref::<T>() {
        Some(v) => format!("{:?}", v),
        None => "<corrupt>".to_string(),
    }
}

impl Value {
    /// Wrap a value of a hashable type
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Clone + PartialEq + Hash + fmt::Debug + Send + Sync,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            inner: Inner::Present {
                payload: Arc::new(value),
                eq_fn: eq_impl::<T>,
                hash_fn: Some(hash_impl::<T>),
                debug_fn: debug_impl::<T>,
            },
        }
    }

    /// Wrap a value of a type that does not implement `Hash` (e.g. `f64`)
    pub fn without_hash<T>(value: T) -> Self
    where
        T: Any + Clone + PartialEq + fmt::Debug + Send + Sync,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            inner: Inner::Present {
                payload: Arc::new(value),
                eq_fn: eq_impl::<T>,
                hash_fn: None,
                debug_fn: debug_impl::<T>,
            },
        }
    }

    /// The absent value of type `T`
    pub fn absent<T: Any>() -> Self {
        Self::absent_of(TypeInfo::of::<T>())
    }

    /// The absent value of a type known only by its `TypeInfo`
    pub fn absent_of(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            inner: Inner::Absent,
        }
    }

    /// Identity of the wrapped type
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Whether this value is the absent state
    pub fn is_absent(&self) -> bool {
        matches!(self.inner, Inner::Absent)
    }

    /// Whether hash support was captured at construction
    pub fn supports_hash(&self) -> bool {
        match &self.inner {
            Inner::Absent => true,
            Inner::Present { hash_fn, .. } => hash_fn.is_some(),
        }
    }

    /// Compare two values through the wrapped type's `PartialEq`
    ///
    /// Values of different declared types are never equal. Two absent
    /// values of the same declared type are equal; an absent value never
    /// equals a present one.
    pub fn value_eq(&self, other: &Value) -> bool {
        if self.type_info.id() != other.type_info.id() {
            return false;
        }
        match (&self.inner, &other.inner) {
            (Inner::Absent, Inner::Absent) => true,
            (Inner::Present { payload, eq_fn, .. }, Inner::Present { payload: other_payload, .. }) => {
                eq_fn(payload.as_ref(), other_payload.as_ref())
            }
            _ => false,
        }
    }

    /// Hash of the wrapped value, or `None` when the type is not hashable
    ///
    /// The absent value hashes to a fixed sentinel so that equal values
    /// produce equal hashes.
    pub fn hash_value(&self) -> Option<u64> {
        match &self.inner {
            Inner::Absent => Some(0),
            Inner::Present { payload, hash_fn, .. } => hash_fn.map(|f| f(payload.as_ref())),
        }
    }

    /// Borrow the wrapped instance as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.inner {
            Inner::Absent => None,
            Inner::Present { payload, .. } => payload.downcast_ref::<T>(),
        }
    }

    /// Clone the wrapped instance out as `T`
    ///
    /// Fails with a type mismatch when the value is absent or holds a
    /// different type.
    pub fn extract<T: Any + Clone>(&self) -> VerifyResult<T> {
        self.downcast_ref::<T>().cloned().ok_or(VerifyError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            actual: if self.is_absent() { "<absent>" } else { self.type_info.name() },
        })
    }

    /// Clone the wrapped instance out as `Option<T>`, mapping absent to `None`
    pub fn extract_optional<T: Any + Clone>(&self) -> VerifyResult<Option<T>> {
        if self.is_absent() {
            return Ok(None);
        }
        self.extract().map(Some)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Absent => write!(f, "Value<{}>(<absent>)", self.type_info.short_name()),
            Inner::Present { payload, debug_fn, .. } => {
                write!(f, "Value<{}>({})", self.type_info.short_name(), debug_fn(payload.as_ref()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_equality() {
        let a = Value::new("hello".to_string());
        let b = Value::new("hello".to_string());
        let c = Value::new("world".to_string());

        assert!(a.value_eq(&b));
        assert!(b.value_eq(&a));
        assert!(!a.value_eq(&c));
    }

    #[test]
    fn test_values_of_different_types_are_unequal() {
        let a = Value::new(1_i32);
        let b = Value::new(1_i64);
        assert!(!a.value_eq(&b));
    }

    #[test]
    fn test_absent_semantics() {
        let absent = Value::absent::<String>();
        let other_absent = Value::absent::<String>();
        let present = Value::new("x".to_string());

        assert!(absent.is_absent());
        assert!(absent.value_eq(&other_absent));
        assert!(!absent.value_eq(&present));
        assert!(!present.value_eq(&absent));
        assert_eq!(absent.hash_value(), other_absent.hash_value());
    }

    #[test]
    fn test_hash_consistency() {
        let a = Value::new(1234_u64);
        let b = Value::new(1234_u64);
        assert_eq!(a.hash_value(), a.hash_value());
        assert_eq!(a.hash_value(), b.hash_value());
        assert!(a.supports_hash());
    }

    #[test]
    fn test_without_hash() {
        let a = Value::without_hash(1.5_f64);
        let b = Value::without_hash(1.5_f64);
        assert!(a.value_eq(&b));
        assert!(!a.supports_hash());
        assert_eq!(a.hash_value(), None);
    }

    #[test]
    fn test_extract() {
        let a = Value::new(7_i32);
        assert_eq!(a.extract::<i32>().unwrap(), 7);
        assert!(a.extract::<i64>().is_err());

        let absent = Value::absent::<i32>();
        assert!(absent.extract::<i32>().is_err());
        assert_eq!(absent.extract_optional::<i32>().unwrap(), None);
        assert_eq!(a.extract_optional::<i32>().unwrap(), Some(7));
    }

    #[test]
    fn test_type_info_short_name() {
        let info = TypeInfo::of::<String>();
        assert_eq!(info.short_name(), "String");
    }

    #[test]
    fn test_debug_format() {
        let a = Value::new(5_u8);
        assert_eq!(format!("{:?}", a), "Value<u8>(5)");
        let absent = Value::absent::<u8>();
        assert_eq!(format!("{:?}", absent), "Value<u8>(<absent>)");
    }
}
