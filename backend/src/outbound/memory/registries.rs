//! Registry and id sequence ports over [`InMemoryStore`].

use async_trait::async_trait;

use super::{InMemoryStore, Poisoned, newest_first};
use crate::domain::ports::{
    EquipmentRepository, EquipmentRepositoryError, IdSequenceRepository,
    IdSequenceRepositoryError, RouteRepository, RouteRepositoryError,
};
use crate::domain::{Equipment, EquipmentId, IdScope, Route, RouteId};

impl From<Poisoned> for EquipmentRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store poisoned")
    }
}

impl From<Poisoned> for RouteRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store poisoned")
    }
}

impl From<Poisoned> for IdSequenceRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store poisoned")
    }
}

#[async_trait]
impl EquipmentRepository for InMemoryStore {
    async fn insert(&self, equipment: &Equipment) -> Result<(), EquipmentRepositoryError> {
        let mut state = self.lock()?;
        if state.equipment.contains_key(equipment.eqp_id()) {
            return Err(EquipmentRepositoryError::duplicate_key(
                equipment.eqp_id().as_str(),
            ));
        }
        state
            .equipment
            .insert(equipment.eqp_id().clone(), equipment.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Option<Equipment>, EquipmentRepositoryError> {
        Ok(self.lock()?.equipment.get(eqp_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Equipment>, EquipmentRepositoryError> {
        let state = self.lock()?;
        let mut rows: Vec<_> = state
            .equipment
            .iter()
            .map(|(id, equipment)| (id.clone(), equipment.clone()))
            .collect();
        newest_first(&mut rows, Equipment::inserted_on);
        Ok(rows.into_iter().map(|(_, equipment)| equipment).collect())
    }
}

fn sorted_routes<'a>(routes: impl Iterator<Item = &'a Route>) -> Vec<Route> {
    let mut rows: Vec<_> = routes
        .map(|route| (route.route_id().clone(), route.clone()))
        .collect();
    newest_first(&mut rows, Route::inserted_on);
    rows.into_iter().map(|(_, route)| route).collect()
}

#[async_trait]
impl RouteRepository for InMemoryStore {
    async fn insert(&self, route: &Route) -> Result<(), RouteRepositoryError> {
        let mut state = self.lock()?;
        if !state.equipment.contains_key(route.eqp_id()) {
            return Err(RouteRepositoryError::missing_equipment(
                route.eqp_id().as_str(),
            ));
        }
        if state.routes.contains_key(route.route_id()) {
            return Err(RouteRepositoryError::duplicate_key(route.route_id().as_str()));
        }
        state.routes.insert(route.route_id().clone(), route.clone());
        Ok(())
    }

    async fn find_by_id(&self, route_id: &RouteId) -> Result<Option<Route>, RouteRepositoryError> {
        Ok(self.lock()?.routes.get(route_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Route>, RouteRepositoryError> {
        Ok(sorted_routes(self.lock()?.routes.values()))
    }

    async fn list_for_equipment(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Vec<Route>, RouteRepositoryError> {
        let state = self.lock()?;
        Ok(sorted_routes(
            state.routes.values().filter(|route| route.eqp_id() == eqp_id),
        ))
    }
}

#[async_trait]
impl IdSequenceRepository for InMemoryStore {
    async fn next_value(&self, scope: IdScope) -> Result<u64, IdSequenceRepositoryError> {
        let mut state = self.lock()?;
        let counter = state.sequences.entry(scope.scope()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
