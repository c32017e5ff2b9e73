//! Automatic equality and hash-code contract verification for data-holding types
//!
//! This crate verifies that a type's `eq()`/`hash()` behavior matches a
//! declared significance model (which properties participate in equality)
//! without hand-written per-type fixtures. Value-generation strategies are
//! synthesized on demand for property types that have none registered, and
//! a combinatorial plus randomized protocol proves the declared model.
//!
//! # Architecture
//!
//! ```text
//! BeanDescriptor ──▶ BeanModel ──▶ BeanHolder ──▶ EqualsTester
//!                        │              │
//!                        ▼              ▼
//!                  FactoryLookup ◀── TestContext ──▶ ValueFactoryRepository
//! ```
//!
//! A [`TestContext`] owns all shared state. Types register a descriptor
//! (their constructors and properties), a [`model::BeanModel`] is resolved
//! from descriptor plus caller specs, a [`BeanHolder`] populates instances
//! through resolved factories, and the [`verify::EqualsTester`] drives the
//! verification protocol.
//!
//! # Example
//!
//! ```rust,ignore
//! use beancheck::{specs, verify_equality, BeanDescriptor, TestContext, TypeInfo};
//!
//! let context = TestContext::new();
//! context.register_descriptor(
//!     BeanDescriptor::builder::<Invoice>()
//!         .constructor(&["id", "memo"], &[TypeInfo::of::<u64>(), TypeInfo::of::<String>()],
//!             |mut args| Ok(Invoice { id: args.take()?, memo: args.take()? }))
//!         .property("id", |i: &Invoice| i.id, |i, v| i.id = v)
//!         .property("memo", |i: &Invoice| i.memo.clone(), |i, v| i.memo = v)
//!         .build()?,
//! );
//!
//! verify_equality::<Invoice>(&context, vec![specs::not_significant(&["memo"])])?;
//! ```

pub mod context;
pub mod errors;
pub mod holder;
pub mod lookup;
pub mod model;
pub mod values;
pub mod verify;

// Re-export commonly used types
pub use context::{default_context, TestContext, VerifyConfig};
pub use errors::{VerifyError, VerifyResult};
pub use holder::BeanHolder;
pub use lookup::FactoryLookup;
pub use model::{specs, BeanDescriptor, BeanModel, Creator, Property, Spec};
pub use values::{TypeInfo, Value, ValueFactory, ValueKind};
pub use verify::{verify_equality, EqualsTester};
