//! Movement cycle and group label ports over [`InMemoryStore`].

use async_trait::async_trait;

use super::{CycleId, InMemoryStore, Poisoned, State, newest_first};
use crate::domain::movement::{CycleKey, CycleSummary, GroupLabel, MovementCycle};
use crate::domain::ports::{
    GroupLabelRepository, GroupLabelRepositoryError, MovementRepository, MovementRepositoryError,
};
use crate::domain::{EquipmentId, RouteId};

impl From<Poisoned> for MovementRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store poisoned")
    }
}

impl From<Poisoned> for GroupLabelRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store poisoned")
    }
}

fn cycle_id(route_id: &RouteId, eqp_id: &EquipmentId, key: CycleKey) -> CycleId {
    (route_id.clone(), eqp_id.clone(), key)
}

/// Cycles of one pair in ascending key order.
fn pair_cycles<'a>(
    state: &'a State,
    route_id: &'a RouteId,
    eqp_id: &'a EquipmentId,
) -> impl DoubleEndedIterator<Item = &'a MovementCycle> + 'a {
    let from = cycle_id(route_id, eqp_id, CycleKey::new(0, 0));
    let to = cycle_id(route_id, eqp_id, CycleKey::new(u32::MAX, u32::MAX));
    state.cycles.range(from..=to).map(|(_, cycle)| cycle)
}

fn summaries<'a>(cycles: impl Iterator<Item = (&'a CycleId, &'a MovementCycle)>) -> Vec<CycleSummary> {
    let mut rows: Vec<_> = cycles
        .map(|(id, cycle)| (id.clone(), cycle.summary()))
        .collect();
    newest_first(&mut rows, |summary| summary.inserted_on);
    rows.into_iter().map(|(_, summary)| summary).collect()
}

#[async_trait]
impl MovementRepository for InMemoryStore {
    async fn find_cycle(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        key: CycleKey,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        Ok(self
            .lock()?
            .cycles
            .get(&cycle_id(route_id, eqp_id, key))
            .cloned())
    }

    async fn find_latest(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        let state = self.lock()?;
        Ok(pair_cycles(&state, route_id, eqp_id).next_back().cloned())
    }

    async fn find_latest_in_group(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        group_no: u32,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        let state = self.lock()?;
        Ok(pair_cycles(&state, route_id, eqp_id)
            .filter(|cycle| cycle.group_no() == group_no)
            .next_back()
            .cloned())
    }

    async fn max_group_no(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, MovementRepositoryError> {
        let state = self.lock()?;
        Ok(pair_cycles(&state, route_id, eqp_id)
            .next_back()
            .map(MovementCycle::group_no))
    }

    async fn insert(&self, cycle: &MovementCycle) -> Result<(), MovementRepositoryError> {
        let mut state = self.lock()?;
        if !state.routes.contains_key(cycle.route_id()) {
            return Err(MovementRepositoryError::missing_reference(format!(
                "route {}",
                cycle.route_id()
            )));
        }
        if !state.equipment.contains_key(cycle.eqp_id()) {
            return Err(MovementRepositoryError::missing_reference(format!(
                "equipment {}",
                cycle.eqp_id()
            )));
        }
        let id = cycle_id(cycle.route_id(), cycle.eqp_id(), cycle.key());
        if state.cycles.contains_key(&id) {
            return Err(MovementRepositoryError::duplicate_key(cycle.key().to_string()));
        }
        state.cycles.insert(id, cycle.clone());
        Ok(())
    }

    async fn update(
        &self,
        cycle: &MovementCycle,
        expected_revision: u32,
    ) -> Result<(), MovementRepositoryError> {
        let mut state = self.lock()?;
        let id = cycle_id(cycle.route_id(), cycle.eqp_id(), cycle.key());
        let Some(stored) = state.cycles.get_mut(&id) else {
            return Err(MovementRepositoryError::query(format!(
                "cycle {} no longer exists",
                cycle.key()
            )));
        };
        if stored.revision() != expected_revision {
            return Err(MovementRepositoryError::RevisionMismatch {
                expected: expected_revision,
                actual: stored.revision(),
            });
        }
        *stored = cycle.clone();
        Ok(())
    }

    async fn list_summaries(&self) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        Ok(summaries(self.lock()?.cycles.iter()))
    }

    async fn latest_summary_for_route(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<CycleSummary>, MovementRepositoryError> {
        let state = self.lock()?;
        Ok(summaries(state.cycles.iter().filter(|((route, _, _), _)| route == route_id))
            .into_iter()
            .next())
    }

    async fn list_summaries_for_equipment(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        let state = self.lock()?;
        Ok(summaries(
            state.cycles.iter().filter(|((_, eqp, _), _)| eqp == eqp_id),
        ))
    }

    async fn list_summaries_for_group(
        &self,
        group_no: u32,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        let state = self.lock()?;
        Ok(summaries(
            state
                .cycles
                .iter()
                .filter(|((_, _, key), _)| key.group_no == group_no),
        ))
    }
}

#[async_trait]
impl GroupLabelRepository for InMemoryStore {
    async fn find_group(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
    ) -> Result<Option<u32>, GroupLabelRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .labels
            .get(&(route_id.clone(), eqp_id.clone()))
            .and_then(|labels| labels.get(label))
            .copied())
    }

    async fn max_group_no(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, GroupLabelRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .labels
            .get(&(route_id.clone(), eqp_id.clone()))
            .and_then(|labels| labels.values().copied().max()))
    }

    async fn try_bind(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
        group_no: u32,
    ) -> Result<bool, GroupLabelRepositoryError> {
        let mut state = self.lock()?;
        let labels = state
            .labels
            .entry((route_id.clone(), eqp_id.clone()))
            .or_default();
        if labels.contains_key(label) || labels.values().any(|bound| *bound == group_no) {
            return Ok(false);
        }
        labels.insert(label.clone(), group_no);
        Ok(true)
    }

    async fn rebind(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
        from_group: u32,
        to_group: u32,
    ) -> Result<bool, GroupLabelRepositoryError> {
        let mut state = self.lock()?;
        let Some(labels) = state.labels.get_mut(&(route_id.clone(), eqp_id.clone())) else {
            return Ok(false);
        };
        if labels.get(label) != Some(&from_group)
            || labels.values().any(|bound| *bound == to_group)
        {
            return Ok(false);
        }
        labels.insert(label.clone(), to_group);
        Ok(true)
    }
}
