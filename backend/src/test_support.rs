//! Test utilities for the crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use serde_json::{Value, json};

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Type-tagged samples with ids `{prefix}-{n}`, numbered from `first`.
///
/// # Examples
/// ```
/// use equipment_movements::test_support::tagged_samples;
///
/// let samples = tagged_samples("s", 1, &[0, 1, 2]);
/// assert_eq!(samples[2]["sample_id"], "s-3");
/// assert_eq!(samples[2]["type"], 2);
/// ```
pub fn tagged_samples(prefix: &str, first: usize, types: &[u8]) -> Vec<Value> {
    types
        .iter()
        .enumerate()
        .map(|(offset, kind)| {
            json!({
                "sample_id": format!("{prefix}-{}", first + offset),
                "type": kind,
                "lat": 28.7041,
                "lng": 77.1025,
                "speed": 11.0,
            })
        })
        .collect()
}

/// `count` untagged samples without ids.
pub fn bulk_samples(count: usize) -> Vec<Value> {
    (0..count).map(|seq| json!({ "seq": seq })).collect()
}
