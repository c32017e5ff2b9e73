// Copyright (c) 2025 - Cowboy AI, Inc.
//! Built-In Value Factories
//!
//! Canonical and random generators for primitive-like types, text, common
//! temporal and identifier value objects, and filesystem-path handles.
//!
//! Path factories follow the ephemeral-path policy: `Primary` and
//! `Secondary` are two fixed, distinct paths allocated once for the life
//! of the process; `Random` yields a fresh path per call. None of them is
//! ever materialized on disk and no cleanup is required.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use rand::{thread_rng, Rng};
use uuid::Uuid;

use crate::values::{Value, ValueFactory, ValueFactoryRepository, ValueKind};

static PRIMARY_PATH: Lazy<PathBuf> = Lazy::new(ephemeral_path);
static SECONDARY_PATH: Lazy<PathBuf> = Lazy::new(ephemeral_path);

fn ephemeral_path() -> PathBuf {
    std::env::temp_dir().join(format!("beancheck-{}.tmp", Uuid::new_v4()))
}

fn epoch_plus_seconds(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(seconds)
}

macro_rules! integer_factories {
    ($repository:expr, $( $ty:ty ),* $(,)?) => {
        $(
            $repository.register::<$ty>(ValueFactory::new(|kind| {
                Ok(match kind {
                    ValueKind::Primary => Value::new(1 as $ty),
                    ValueKind::Secondary => Value::new(2 as $ty),
                    ValueKind::Random => Value::new(thread_rng().gen::<$ty>()),
                })
            }));
        )*
    };
}

/// Load every built-in factory into the repository
pub fn load(repository: &ValueFactoryRepository) {
    integer_factories!(repository, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, usize, isize);

    repository.register::<bool>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new(true),
            ValueKind::Secondary => Value::new(false),
            ValueKind::Random => Value::new(thread_rng().gen::<bool>()),
        })
    }));

    repository.register::<char>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new('a'),
            ValueKind::Secondary => Value::new('b'),
            ValueKind::Random => Value::new(thread_rng().gen_range('a'..='z')),
        })
    }));

    repository.register::<f32>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::without_hash(1.0_f32),
            ValueKind::Secondary => Value::without_hash(2.0_f32),
            ValueKind::Random => Value::without_hash(thread_rng().gen::<f32>()),
        })
    }));

    repository.register::<f64>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::without_hash(1.0_f64),
            ValueKind::Secondary => Value::without_hash(2.0_f64),
            ValueKind::Random => Value::without_hash(thread_rng().gen::<f64>()),
        })
    }));

    repository.register::<String>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new("alpha".to_string()),
            ValueKind::Secondary => Value::new("bravo".to_string()),
            ValueKind::Random => Value::new(format!("text-{:016x}", thread_rng().gen::<u64>())),
        })
    }));

    repository.register::<Uuid>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new(Uuid::from_u128(1)),
            ValueKind::Secondary => Value::new(Uuid::from_u128(2)),
            ValueKind::Random => Value::new(Uuid::new_v4()),
        })
    }));

    repository.register::<DateTime<Utc>>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new(epoch_plus_seconds(1_000_000_000)),
            ValueKind::Secondary => Value::new(epoch_plus_seconds(1_100_000_000)),
            ValueKind::Random => {
                Value::new(epoch_plus_seconds(thread_rng().gen_range(0..4_000_000_000_i64)))
            }
        })
    }));

    repository.register::<NaiveDate>(ValueFactory::new(|kind| {
        let days = match kind {
            ValueKind::Primary => 11_000,
            ValueKind::Secondary => 12_000,
            ValueKind::Random => thread_rng().gen_range(0..40_000_i64),
        };
        Ok(Value::new(
            (DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(days)).date_naive(),
        ))
    }));

    repository.register::<Duration>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new(Duration::from_secs(1)),
            ValueKind::Secondary => Value::new(Duration::from_secs(2)),
            ValueKind::Random => {
                Value::new(Duration::from_millis(thread_rng().gen_range(0..(1_u64 << 40))))
            }
        })
    }));

    repository.register::<PathBuf>(ValueFactory::new(|kind| {
        Ok(match kind {
            ValueKind::Primary => Value::new(PRIMARY_PATH.clone()),
            ValueKind::Secondary => Value::new(SECONDARY_PATH.clone()),
            ValueKind::Random => Value::new(ephemeral_path()),
        })
    }));
}
