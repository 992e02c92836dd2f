//! In-process serialisation of writes per route/equipment pair.
//!
//! Every submission for the same `(route_id, eqp_id)` runs its
//! read-modify-write inside one async mutex. Entries are dropped again once
//! no writer holds or awaits them, so the map only grows with live pairs.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{EquipmentId, RouteId};

type PairKey = (RouteId, EquipmentId);

/// Keyed async locks for movement writes.
#[derive(Debug, Default)]
pub struct MovementLocks {
    locks: DashMap<PairKey, Arc<Mutex<()>>>,
}

/// Held while a submission owns its pair.
///
/// Dropping the guard releases the mutex and prunes the map entry when no
/// other writer is waiting on it.
#[derive(Debug)]
pub struct PairGuard<'a> {
    owner: &'a MovementLocks,
    key: PairKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl MovementLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the pair.
    pub async fn acquire(&self, route_id: &RouteId, eqp_id: &EquipmentId) -> PairGuard<'_> {
        let key = (route_id.clone(), eqp_id.clone());
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        PairGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of pairs currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map holds one reference; anything above that is a waiter.
        self.owner
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
