// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bean Holders
//!
//! A [`BeanHolder`] wraps one bean model together with a mutable map of
//! current property values. Instances are never mutated in place:
//! [`BeanHolder::bean`] constructs a fresh instance from the current
//! values on every call, so two consecutive calls yield structurally
//! identical but distinct instances.
//!
//! Holders are cloned to isolate combinatorial trials; a clone shares no
//! mutable state with its source, so mutating one is never observable in
//! the other.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::{TestContext, VerifyConfig};
use crate::errors::{VerifyError, VerifyResult};
use crate::model::BeanModel;
use crate::values::{Value, ValueKind};

/// A bean model plus the current value of every populated property
#[derive(Debug, Clone)]
pub struct BeanHolder {
    context: TestContext,
    model: Arc<BeanModel>,
    config: VerifyConfig,
    values: BTreeMap<String, Value>,
}

impl BeanHolder {
    /// Create a holder with every populated property set to an
    /// independent random value
    pub fn new(context: &TestContext, model: Arc<BeanModel>) -> VerifyResult<Self> {
        Self::with_config(context, model, VerifyConfig::new())
    }

    /// Create a holder with a per-run configuration
    pub fn with_config(
        context: &TestContext,
        model: Arc<BeanModel>,
        config: VerifyConfig,
    ) -> VerifyResult<Self> {
        let mut holder = Self {
            context: context.clone(),
            model,
            config,
            values: BTreeMap::new(),
        };
        holder.reset()?;
        Ok(holder)
    }

    /// The model this holder populates
    pub fn model(&self) -> &Arc<BeanModel> {
        &self.model
    }

    /// The configuration this holder resolves values with
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Names of the testable properties, in model order
    pub fn property_names(&self) -> Vec<String> {
        self.model.testable_names()
    }

    /// Whether the named property participates in equality
    pub fn is_significant(&self, name: &str) -> VerifyResult<bool> {
        Ok(self.model.require_property(name)?.is_significant())
    }

    /// Whether the named property may hold an absent value
    pub fn is_nullable(&self, name: &str) -> VerifyResult<bool> {
        Ok(self.model.require_property(name)?.is_nullable())
    }

    /// Produce a value of the requested kind for the named property
    pub fn create_value(&self, kind: ValueKind, name: &str) -> VerifyResult<Value> {
        let property = self.model.require_property(name)?;
        self.context.create_value(
            self.model.bean_type(),
            name,
            property.value_type(),
            kind,
            Some(&self.config),
        )
    }

    /// Set the named property, reporting whether the stored value
    /// actually changed
    ///
    /// Change detection compares the old and new values through the value
    /// type's equality; two random draws that coincide count as "no
    /// change".
    pub fn set_property(&mut self, name: &str, value: Value) -> VerifyResult<bool> {
        let property = self.model.require_property(name)?;
        let expected = property.value_type();
        if value.type_info().id() != expected.id() {
            return Err(VerifyError::TypeMismatch {
                expected: expected.name(),
                actual: value.type_info().name(),
            });
        }

        let changed = match self.values.get(name) {
            Some(current) => !current.value_eq(&value),
            None => true,
        };
        self.values.insert(name.to_string(), value);
        Ok(changed)
    }

    /// Current value of the named property
    pub fn property_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set every populated property to a fresh value of the given kind
    pub fn set_all_properties(&mut self, kind: ValueKind) -> VerifyResult<()> {
        for name in self.model.populated_names() {
            let value = self.create_value(kind, &name)?;
            self.set_property(&name, value)?;
        }
        Ok(())
    }

    /// Repopulate every property with independent random values
    pub fn reset(&mut self) -> VerifyResult<()> {
        self.set_all_properties(ValueKind::Random)
    }

    /// Construct a fresh instance from the current property values
    pub fn bean(&self) -> VerifyResult<Value> {
        self.model.construct(&self.values)
    }

    /// Independent copy of this holder's state
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{specs, BeanDescriptor, BeanModel, Spec};
    use crate::values::{TypeInfo, ValueFactory};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Account {
        id: u64,
        nickname: Option<String>,
    }

    fn account_context() -> TestContext {
        let context = TestContext::new();
        context.register_descriptor(
            BeanDescriptor::builder::<Account>()
                .constructor(&["id"], &[TypeInfo::of::<u64>()], |mut args| {
                    Ok(Account {
                        id: args.take()?,
                        nickname: None,
                    })
                })
                .property("id", |a: &Account| a.id, |a, v| a.id = v)
                .property_nullable(
                    "nickname",
                    |a: &Account| a.nickname.clone(),
                    |a, v| a.nickname = v,
                )
                .build()
                .unwrap(),
        );
        context
    }

    fn account_holder(specs: Vec<Spec>) -> BeanHolder {
        let context = account_context();
        let model = BeanModel::resolve(&context, TypeInfo::of::<Account>(), specs).unwrap();
        BeanHolder::new(&context, model).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let mut holder = account_holder(Vec::new());

        holder.set_property("id", Value::new(77_u64)).unwrap();
        let bean = holder.bean().unwrap();
        assert_eq!(bean.extract::<Account>().unwrap().id, 77);
    }

    #[test]
    fn test_absent_round_trip_for_nullable() {
        let mut holder = account_holder(Vec::new());

        holder
            .set_property("nickname", Value::absent::<String>())
            .unwrap();
        let bean = holder.bean().unwrap();
        assert_eq!(bean.extract::<Account>().unwrap().nickname, None);
    }

    #[test]
    fn test_set_property_reports_actual_change() {
        let mut holder = account_holder(Vec::new());

        holder.set_property("id", Value::new(5_u64)).unwrap();
        assert!(!holder.set_property("id", Value::new(5_u64)).unwrap());
        assert!(holder.set_property("id", Value::new(6_u64)).unwrap());
    }

    #[test]
    fn test_set_property_rejects_wrong_type() {
        let mut holder = account_holder(Vec::new());
        let result = holder.set_property("id", Value::new(5_i64));
        assert!(matches!(result, Err(VerifyError::TypeMismatch { .. })));
    }

    #[test]
    fn test_copies_are_independent() {
        let mut holder = account_holder(Vec::new());
        holder.set_property("id", Value::new(1_u64)).unwrap();

        let mut copy = holder.copy();
        copy.set_property("id", Value::new(2_u64)).unwrap();

        assert_eq!(holder.bean().unwrap().extract::<Account>().unwrap().id, 1);
        assert_eq!(copy.bean().unwrap().extract::<Account>().unwrap().id, 2);
    }

    #[test]
    fn test_beans_are_structurally_identical_across_calls() {
        let holder = account_holder(Vec::new());
        let a = holder.bean().unwrap();
        let b = holder.bean().unwrap();
        assert!(a.value_eq(&b));
    }

    #[test]
    fn test_ignored_property_not_populated() {
        let holder = account_holder(vec![specs::ignored(&["nickname"])]);
        assert_eq!(holder.property_names(), vec!["id".to_string()]);
        assert!(holder.property_value("nickname").is_none());
    }

    #[test]
    fn test_override_factory_used_for_property() {
        let context = account_context();
        let model = BeanModel::resolve(&context, TypeInfo::of::<Account>(), Vec::new()).unwrap();
        let config = VerifyConfig::new().override_factory(
            "id",
            ValueFactory::from_values(Value::new(100_u64), Value::new(200_u64), || {
                Value::new(300_u64)
            }),
        );
        let holder = BeanHolder::with_config(&context, model, config).unwrap();

        let value = holder.create_value(ValueKind::Primary, "id").unwrap();
        assert_eq!(value.extract::<u64>().unwrap(), 100);
    }
}
