// Copyright (c) 2025 - Cowboy AI, Inc.
//! Equality Contract Verifier
//!
//! Proves that a type's equality and hash-code behavior matches its
//! declared significance model: changing a significant property must make
//! an instance unequal to its prior state, while changing a
//! non-significant property (or making no actual change) must leave it
//! equal, with matching hash codes.
//!
//! # Test Protocol
//!
//! For every testable property a six-slot vector is built:
//! `[primary, secondary, random, random, random, random]`, with slot 2
//! forced to the absent value for nullable properties.
//!
//! The **exhaustive phase** starts from a fully randomized baseline and,
//! per property, walks every ordered pair of vector slots: set the first
//! value, snapshot, run the base equality battery, then set the second
//! value on a copy and apply the consistency rule. Whether a change
//! "actually happened" is decided by value equality, never by slot index,
//! so coinciding random draws take the no-change branch.
//!
//! The **randomized phase** re-randomizes all properties a fixed number of
//! times per property, asserts that two instances produced from the same
//! state are equal, then tries a bounded number of times to mutate the
//! target property and applies the same consistency rule to the outcome.
//!
//! Verification is fail-fast: the first violated expectation is reported
//! with the owner type and property name, and no further checks run.

use std::any::Any;
use std::collections::BTreeMap;

use tracing::debug;

use crate::context::TestContext;
use crate::errors::{VerifyError, VerifyResult};
use crate::holder::BeanHolder;
use crate::model::{BeanModel, Spec};
use crate::values::{TypeInfo, Value, ValueKind};

/// Slots in each property's test vector
const VECTOR_SLOTS: usize = 6;

/// Re-randomization rounds per property in the randomized phase
const RANDOM_TRIALS: usize = 5;

/// Bounded attempts to observe an actual change when mutating one property
const MUTATION_ATTEMPTS: usize = 5;

/// A type no bean should ever consider itself equal to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NotEqualToAnything;

/// Verifies the equality contract of one populated holder
#[derive(Debug)]
pub struct EqualsTester {
    holder: BeanHolder,
    check_hashes: bool,
}

impl EqualsTester {
    /// Create a tester over the given holder
    ///
    /// Hash-code checking starts enabled and can be disabled with
    /// [`EqualsTester::check_hashes`]; it also respects the holder's
    /// configuration.
    pub fn new(holder: BeanHolder) -> Self {
        let check_hashes = holder.config().hashes_enabled();
        Self {
            holder,
            check_hashes,
        }
    }

    /// Enable or disable hash-code checking
    pub fn check_hashes(mut self, enabled: bool) -> Self {
        self.check_hashes = enabled;
        self
    }

    /// Run both verification phases, failing fast on the first violation
    pub fn verify(mut self) -> VerifyResult<()> {
        let vectors = self.build_vectors()?;
        self.exhaustive_phase(&vectors)?;
        self.randomized_phase()?;
        Ok(())
    }

    /// Build the per-property test vectors
    fn build_vectors(&self) -> VerifyResult<BTreeMap<String, Vec<Value>>> {
        let mut vectors = BTreeMap::new();
        for name in self.holder.property_names() {
            let mut vector = Vec::with_capacity(VECTOR_SLOTS);
            vector.push(self.holder.create_value(ValueKind::Primary, &name)?);
            vector.push(self.holder.create_value(ValueKind::Secondary, &name)?);
            for _ in 2..VECTOR_SLOTS {
                vector.push(self.holder.create_value(ValueKind::Random, &name)?);
            }
            if self.holder.is_nullable(&name)? {
                let value_type = self
                    .holder
                    .model()
                    .require_property(&name)?
                    .value_type();
                vector[2] = Value::absent_of(value_type);
            }
            vectors.insert(name, vector);
        }
        Ok(vectors)
    }

    fn exhaustive_phase(&mut self, vectors: &BTreeMap<String, Vec<Value>>) -> VerifyResult<()> {
        self.holder.reset()?;
        let owner = self.holder.model().bean_type();

        for (name, vector) in vectors {
            let significant = self.holder.is_significant(name)?;
            debug!(property = name.as_str(), significant, "exhaustive sweep");

            for first in vector {
                let mut with_first = self.holder.copy();
                with_first.set_property(name, first.clone())?;
                let before = with_first.bean()?;
                let fresh = with_first.bean()?;
                self.verify_base_equality(owner, name, &before, &fresh)?;

                for second in vector {
                    let mut with_second = with_first.copy();
                    let changed = with_second.set_property(name, second.clone())?;
                    let after = with_second.bean()?;
                    self.check_consistent(owner, name, significant, changed, &before, &after)?;
                }
            }
        }
        Ok(())
    }

    fn randomized_phase(&mut self) -> VerifyResult<()> {
        let owner = self.holder.model().bean_type();

        for _ in 0..RANDOM_TRIALS {
            for name in self.holder.property_names() {
                self.holder.set_all_properties(ValueKind::Random)?;
                let before = self.holder.bean()?;
                let again = self.holder.bean()?;
                if !before.value_eq(&again) {
                    return Err(violation(
                        owner,
                        &name,
                        "eq() is not reflexive under fully randomized state",
                    ));
                }

                let significant = self.holder.is_significant(&name)?;
                let mut changed = false;
                for _ in 0..MUTATION_ATTEMPTS {
                    if changed {
                        break;
                    }
                    let value = self.holder.create_value(ValueKind::Random, &name)?;
                    changed = self.holder.set_property(&name, value)?;
                }

                let after = self.holder.bean()?;
                self.check_consistent(owner, &name, significant, changed, &before, &after)?;
            }
        }
        Ok(())
    }

    /// The consistency rule: a changed significant property must break
    /// equality; anything else must preserve it (and the hash code)
    fn check_consistent(
        &self,
        owner: TypeInfo,
        name: &str,
        significant: bool,
        changed: bool,
        before: &Value,
        after: &Value,
    ) -> VerifyResult<()> {
        if significant && changed {
            if before.value_eq(after) {
                return Err(violation(
                    owner,
                    name,
                    "eq() is not consistent with changing a significant property",
                ));
            }
            return Ok(());
        }

        if !before.value_eq(after) {
            let expectation = if changed {
                "eq() returned false after changing a non-significant property"
            } else {
                "eq() returned false after not changing the property"
            };
            return Err(violation(owner, name, expectation));
        }

        if self.check_hashes {
            if let (Some(hash_before), Some(hash_after)) = (before.hash_value(), after.hash_value()) {
                if hash_before != hash_after {
                    let expectation = if changed {
                        "hash() returned a different value after changing a non-significant property"
                    } else {
                        "hash() returned a different value after not changing the property"
                    };
                    return Err(violation(owner, name, expectation));
                }
            }
        }

        Ok(())
    }

    /// Base equality battery, run once per snapshot of the exhaustive phase
    fn verify_base_equality(
        &self,
        owner: TypeInfo,
        name: &str,
        before: &Value,
        fresh: &Value,
    ) -> VerifyResult<()> {
        if before.value_eq(&Value::absent_of(owner)) {
            return Err(violation(owner, name, "eq() must not equal the absent value"));
        }

        if before.value_eq(&Value::new(NotEqualToAnything)) {
            return Err(violation(owner, name, "eq() must not equal an unrelated type"));
        }

        if !before.value_eq(before) {
            return Err(violation(owner, name, "eq() is not identity reflexive"));
        }

        if !before.value_eq(fresh) {
            return Err(violation(
                owner,
                name,
                "eq() returned false for a structurally identical instance",
            ));
        }

        if self.check_hashes {
            if before.hash_value() != before.hash_value() {
                return Err(violation(owner, name, "hash() is not self-consistent"));
            }
            if let (Some(hash_before), Some(hash_fresh)) = (before.hash_value(), fresh.hash_value()) {
                if hash_before != hash_fresh {
                    return Err(violation(
                        owner,
                        name,
                        "hash() differs for a structurally identical instance",
                    ));
                }
            }
        }

        Ok(())
    }
}

fn violation(owner: TypeInfo, property: &str, expectation: &str) -> VerifyError {
    VerifyError::ContractViolation {
        owner: owner.name(),
        property: property.to_string(),
        expectation: expectation.to_string(),
    }
}

/// Resolve a model for `T`, populate a holder, and verify the equality
/// contract in one call
pub fn verify_equality<T: Any>(context: &TestContext, specs: Vec<Spec>) -> VerifyResult<()> {
    let model = BeanModel::resolve(context, TypeInfo::of::<T>(), specs)?;
    let holder = BeanHolder::new(context, model)?;
    EqualsTester::new(holder).verify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{specs, BeanDescriptor};
    use pretty_assertions::assert_eq;

    // A well-behaved bean: equality considers id but not note.
    #[derive(Debug, Clone, Eq)]
    struct Document {
        id: i64,
        note: String,
    }

    impl PartialEq for Document {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl std::hash::Hash for Document {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    fn document_context() -> TestContext {
        let context = TestContext::new();
        context.register_descriptor(
            BeanDescriptor::builder::<Document>()
                .constructor(
                    &["id", "note"],
                    &[TypeInfo::of::<i64>(), TypeInfo::of::<String>()],
                    |mut args| {
                        Ok(Document {
                            id: args.take()?,
                            note: args.take()?,
                        })
                    },
                )
                .property("id", |d: &Document| d.id, |d, v| d.id = v)
                .property("note", |d: &Document| d.note.clone(), |d, v| d.note = v)
                .build()
                .unwrap(),
        );
        context
    }

    #[test]
    fn test_declared_significance_passes() {
        let context = document_context();
        verify_equality::<Document>(&context, vec![specs::not_significant(&["note"])]).unwrap();
    }

    #[test]
    fn test_wrongly_declared_significance_fails() {
        let context = document_context();

        // Claiming note is significant must fail: eq() ignores it.
        let result = verify_equality::<Document>(&context, Vec::new());
        match result {
            Err(VerifyError::ContractViolation { property, .. }) => {
                assert_eq!(property, "note");
            }
            other => panic!("expected contract violation, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_inconsistency_detected() {
        // Equality ignores tag, but the hash includes it.
        #[derive(Debug, Clone, Eq)]
        struct Sloppy {
            id: u32,
            tag: u32,
        }

        impl PartialEq for Sloppy {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl std::hash::Hash for Sloppy {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
                self.tag.hash(state);
            }
        }

        let context = TestContext::new();
        context.register_descriptor(
            BeanDescriptor::builder::<Sloppy>()
                .constructor(
                    &["id", "tag"],
                    &[TypeInfo::of::<u32>(), TypeInfo::of::<u32>()],
                    |mut args| {
                        Ok(Sloppy {
                            id: args.take()?,
                            tag: args.take()?,
                        })
                    },
                )
                .property("id", |s: &Sloppy| s.id, |s, v| s.id = v)
                .property("tag", |s: &Sloppy| s.tag, |s, v| s.tag = v)
                .build()
                .unwrap(),
        );

        let with_hashes =
            verify_equality::<Sloppy>(&context, vec![specs::not_significant(&["tag"])]);
        assert!(matches!(with_hashes, Err(VerifyError::ContractViolation { .. })));

        // With hash checking disabled the same declaration passes.
        let model =
            BeanModel::resolve(&context, TypeInfo::of::<Sloppy>(), vec![specs::not_significant(&["tag"])])
                .unwrap();
        let holder = BeanHolder::new(&context, model).unwrap();
        EqualsTester::new(holder).check_hashes(false).verify().unwrap();
    }

    #[test]
    fn test_violation_names_owner_and_property() {
        let context = document_context();
        let error = verify_equality::<Document>(&context, Vec::new()).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Document"));
        assert!(message.contains("note"));
    }
}
