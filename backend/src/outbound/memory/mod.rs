//! In-process store implementing every persistence port.
//!
//! Used when the server runs without a database and by behaviour tests. It
//! honours the same contracts as the Diesel adapters: duplicate keys and
//! broken references are reported, updates compare revisions and group
//! labels are unique in both directions per route/equipment pair.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::movement::{CycleKey, GroupLabel, MovementCycle};
use crate::domain::{Equipment, EquipmentId, Route, RouteId};

mod movements;
mod registries;

type CycleId = (RouteId, EquipmentId, CycleKey);
type PairId = (RouteId, EquipmentId);

#[derive(Debug, Default)]
struct State {
    equipment: BTreeMap<EquipmentId, Equipment>,
    routes: BTreeMap<RouteId, Route>,
    cycles: BTreeMap<CycleId, MovementCycle>,
    labels: HashMap<PairId, HashMap<GroupLabel, u32>>,
    sequences: HashMap<&'static str, u64>,
}

/// Shared in-memory backing store.
///
/// Wrap it in an `Arc` and hand the same instance to every service so
/// registries and movements see one another's rows.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

/// The store mutex was poisoned by a panicking writer.
#[derive(Debug, Clone, Copy)]
struct Poisoned;

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, Poisoned> {
        self.state.lock().map_err(|_| Poisoned)
    }
}

/// Newest first, ties broken by descending key so output is stable.
fn newest_first<K: Ord, T>(rows: &mut [(K, T)], inserted_on: impl Fn(&T) -> DateTime<Utc>) {
    rows.sort_by(|(left_key, left), (right_key, right)| {
        inserted_on(right)
            .cmp(&inserted_on(left))
            .then_with(|| right_key.cmp(left_key))
    });
}
