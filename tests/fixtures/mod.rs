// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for beancheck
//!
//! Shared bean types with known equality semantics, and a helper that
//! registers their descriptors into a fresh context. Tests use these
//! fixtures instead of redefining descriptors inline.

#![allow(dead_code)]

use beancheck::{BeanDescriptor, TestContext, TypeInfo};

/// Equality and hash consider `id` only; `note` is free-floating state.
#[derive(Debug, Clone, Eq)]
pub struct Record {
    pub id: i32,
    pub note: String,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::hash::Hash for Record {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Every property is significant; `alias` is genuinely optional.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile {
    pub name: String,
    pub alias: Option<String>,
}

/// A simple enumeration with three constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A nested value type with no registered factory of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Engine {
    pub serial: u64,
}

/// A bean holding a nested bean-typed property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Machine {
    pub engine: Engine,
    pub label: String,
}

/// A type with no usable constructor; resolution for it must fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sealed {
    token: u8,
}

impl Sealed {
    /// Escape hatch for tests that register a custom factory.
    pub fn fixture(token: u8) -> Self {
        Self { token }
    }
}

/// Register descriptors for every fixture type
pub fn register_all(context: &TestContext) {
    context.register_descriptor(
        BeanDescriptor::builder::<Record>()
            .constructor(
                &["id", "note"],
                &[TypeInfo::of::<i32>(), TypeInfo::of::<String>()],
                |mut args| {
                    Ok(Record {
                        id: args.take()?,
                        note: args.take()?,
                    })
                },
            )
            .property("id", |r: &Record| r.id, |r, v| r.id = v)
            .property("note", |r: &Record| r.note.clone(), |r, v| r.note = v)
            .build()
            .expect("Record descriptor"),
    );

    context.register_descriptor(
        BeanDescriptor::builder::<Profile>()
            .constructor(&["name"], &[TypeInfo::of::<String>()], |mut args| {
                Ok(Profile {
                    name: args.take()?,
                    alias: None,
                })
            })
            .property("name", |p: &Profile| p.name.clone(), |p, v| p.name = v)
            .property_nullable("alias", |p: &Profile| p.alias.clone(), |p, v| p.alias = v)
            .build()
            .expect("Profile descriptor"),
    );

    context.register_descriptor(
        BeanDescriptor::enumeration([Priority::Low, Priority::Medium, Priority::High])
            .expect("Priority descriptor"),
    );

    context.register_descriptor(
        BeanDescriptor::builder::<Engine>()
            .constructor(&["serial"], &[TypeInfo::of::<u64>()], |mut args| {
                Ok(Engine {
                    serial: args.take()?,
                })
            })
            .property("serial", |e: &Engine| e.serial, |e, v| e.serial = v)
            .build()
            .expect("Engine descriptor"),
    );

    context.register_descriptor(
        BeanDescriptor::builder::<Machine>()
            .constructor(
                &["engine", "label"],
                &[TypeInfo::of::<Engine>(), TypeInfo::of::<String>()],
                |mut args| {
                    Ok(Machine {
                        engine: args.take()?,
                        label: args.take()?,
                    })
                },
            )
            .property("engine", |m: &Machine| m.engine.clone(), |m, v| m.engine = v)
            .property("label", |m: &Machine| m.label.clone(), |m, v| m.label = v)
            .build()
            .expect("Machine descriptor"),
    );

    // Sealed deliberately registers no constructors.
    context.register_descriptor(
        BeanDescriptor::builder::<Sealed>()
            .property("token", |s: &Sealed| s.token, |s, v| s.token = v)
            .build()
            .expect("Sealed descriptor"),
    );
}

/// A fresh context with every fixture descriptor registered
pub fn fixture_context() -> TestContext {
    let context = TestContext::new();
    register_all(&context);
    context
}
