// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Significance Laws
//!
//! These tests prove, over arbitrary inputs, the two laws the verifier is
//! built on:
//!
//! - **Significance law**: for a significant property, any actual value
//!   change makes the instance unequal to its prior snapshot
//! - **Non-significance law**: for a non-significant property, every
//!   change leaves the instance equal (and hash-equal)
//!
//! Change detection itself is also pinned down: the holder reports a
//! change exactly when the old and new values differ, never based on
//! where the values came from.

use beancheck::{BeanHolder, BeanModel, TypeInfo, Value};
use proptest::prelude::*;

use crate::fixtures::{fixture_context, Record};

fn record_holder() -> BeanHolder {
    let context = fixture_context();
    let model = BeanModel::resolve(&context, TypeInfo::of::<Record>(), Vec::new()).unwrap();
    BeanHolder::new(&context, model).unwrap()
}

proptest! {
    /// The holder reports an actual change iff the values differ.
    #[test]
    fn prop_change_detection_matches_value_inequality(a in any::<i32>(), b in any::<i32>()) {
        let mut holder = record_holder();

        holder.set_property("id", Value::new(a)).unwrap();
        let changed = holder.set_property("id", Value::new(b)).unwrap();
        prop_assert_eq!(changed, a != b);
    }

    /// Significance law for Record.id: an actual id change always breaks
    /// equality with the prior snapshot.
    #[test]
    fn prop_significant_change_breaks_equality(a in any::<i32>(), b in any::<i32>(), note in ".*") {
        let mut holder = record_holder();
        holder.set_property("note", Value::new(note)).unwrap();

        holder.set_property("id", Value::new(a)).unwrap();
        let before = holder.bean().unwrap();

        let changed = holder.set_property("id", Value::new(b)).unwrap();
        let after = holder.bean().unwrap();

        if changed {
            prop_assert!(!before.value_eq(&after));
        } else {
            prop_assert!(before.value_eq(&after));
        }
    }

    /// Non-significance law for Record.note: any note change leaves the
    /// instance equal and hash-equal.
    #[test]
    fn prop_non_significant_change_preserves_equality(
        id in any::<i32>(),
        first in ".*",
        second in ".*",
    ) {
        let mut holder = record_holder();
        holder.set_property("id", Value::new(id)).unwrap();

        holder.set_property("note", Value::new(first)).unwrap();
        let before = holder.bean().unwrap();

        holder.set_property("note", Value::new(second)).unwrap();
        let after = holder.bean().unwrap();

        prop_assert!(before.value_eq(&after));
        prop_assert_eq!(before.hash_value(), after.hash_value());
    }

    /// Two instances constructed from the same holder state are always
    /// structurally identical.
    #[test]
    fn prop_construction_is_deterministic(id in any::<i32>(), note in ".*") {
        let mut holder = record_holder();
        holder.set_property("id", Value::new(id)).unwrap();
        holder.set_property("note", Value::new(note)).unwrap();

        let first = holder.bean().unwrap();
        let second = holder.bean().unwrap();
        prop_assert!(first.value_eq(&second));
        prop_assert_eq!(first.hash_value(), second.hash_value());
    }
}
