//! Equipment and route registry services.
//!
//! Both registries are flat create/read stores. Creation draws the next
//! value from the scope's id sequence and renders it as `EQP-NNNNN` or
//! `ROT-NNNNN`.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    EquipmentRegistry, EquipmentRepository, EquipmentRepositoryError, IdSequenceRepository,
    IdSequenceRepositoryError, RouteRegistry, RouteRepository, RouteRepositoryError,
};
use crate::domain::{
    Equipment, EquipmentId, Error, IdScope, NewEquipment, NewRoute, Route, RouteId,
};

pub(crate) fn map_equipment_repository_error(error: EquipmentRepositoryError) -> Error {
    match error {
        EquipmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("equipment repository unavailable: {message}"))
        }
        EquipmentRepositoryError::Query { message } => {
            Error::internal(format!("equipment repository error: {message}"))
        }
        EquipmentRepositoryError::DuplicateKey { message } => {
            Error::conflict(format!("equipment already exists: {message}"))
        }
    }
}

pub(crate) fn map_route_repository_error(error: RouteRepositoryError) -> Error {
    match error {
        RouteRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("route repository unavailable: {message}"))
        }
        RouteRepositoryError::Query { message } => {
            Error::internal(format!("route repository error: {message}"))
        }
        RouteRepositoryError::DuplicateKey { message } => {
            Error::conflict(format!("route already exists: {message}"))
        }
        RouteRepositoryError::MissingEquipment { eqp_id } => equipment_not_found(&eqp_id),
    }
}

fn map_sequence_error(error: IdSequenceRepositoryError) -> Error {
    match error {
        IdSequenceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("id sequence unavailable: {message}"))
        }
        IdSequenceRepositoryError::Query { message } => {
            Error::internal(format!("id sequence error: {message}"))
        }
    }
}

pub(crate) fn equipment_not_found(eqp_id: &str) -> Error {
    Error::not_found(format!("equipment {eqp_id} not found")).with_details(json!({
        "code": "equipment_not_found",
        "eqpId": eqp_id,
    }))
}

pub(crate) fn route_not_found(route_id: &str) -> Error {
    Error::not_found(format!("route {route_id} not found")).with_details(json!({
        "code": "route_not_found",
        "routeId": route_id,
    }))
}

/// Draw the next identifier for `scope`.
async fn next_identifier<S>(sequence: &S, scope: IdScope) -> Result<String, Error>
where
    S: IdSequenceRepository + ?Sized,
{
    let value = sequence
        .next_value(scope)
        .await
        .map_err(map_sequence_error)?;
    scope.format(value).map_err(|err| {
        Error::conflict(err.to_string()).with_details(json!({
            "code": "id_sequence_exhausted",
            "scope": err.scope,
        }))
    })
}

/// Equipment registry backed by an equipment repository and id sequence.
#[derive(Clone)]
pub struct EquipmentRegistryService<E, S> {
    equipment_repo: Arc<E>,
    sequence: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<E, S> EquipmentRegistryService<E, S> {
    pub fn new(equipment_repo: Arc<E>, sequence: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            equipment_repo,
            sequence,
            clock,
        }
    }
}

#[async_trait]
impl<E, S> EquipmentRegistry for EquipmentRegistryService<E, S>
where
    E: EquipmentRepository,
    S: IdSequenceRepository,
{
    async fn create_equipment(&self, equipment: NewEquipment) -> Result<Equipment, Error> {
        let raw_id = next_identifier(self.sequence.as_ref(), IdScope::EQUIPMENT).await?;
        let eqp_id = EquipmentId::new(&raw_id)
            .map_err(|err| Error::internal(format!("generated invalid equipment id: {err}")))?;
        let equipment = equipment.into_equipment(eqp_id, self.clock.utc());

        self.equipment_repo
            .insert(&equipment)
            .await
            .map_err(map_equipment_repository_error)?;

        info!(eqp_id = %equipment.eqp_id(), "equipment registered");
        Ok(equipment)
    }

    async fn get_equipment(&self, eqp_id: EquipmentId) -> Result<Equipment, Error> {
        self.equipment_repo
            .find_by_id(&eqp_id)
            .await
            .map_err(map_equipment_repository_error)?
            .ok_or_else(|| equipment_not_found(eqp_id.as_str()))
    }

    async fn list_equipment(&self) -> Result<Vec<Equipment>, Error> {
        self.equipment_repo
            .list()
            .await
            .map_err(map_equipment_repository_error)
    }
}

/// Route registry backed by route and equipment repositories.
#[derive(Clone)]
pub struct RouteRegistryService<R, E, S> {
    route_repo: Arc<R>,
    equipment_repo: Arc<E>,
    sequence: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<R, E, S> RouteRegistryService<R, E, S> {
    pub fn new(
        route_repo: Arc<R>,
        equipment_repo: Arc<E>,
        sequence: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            route_repo,
            equipment_repo,
            sequence,
            clock,
        }
    }
}

#[async_trait]
impl<R, E, S> RouteRegistry for RouteRegistryService<R, E, S>
where
    R: RouteRepository,
    E: EquipmentRepository,
    S: IdSequenceRepository,
{
    async fn create_route(&self, route: NewRoute) -> Result<Route, Error> {
        let owner = self
            .equipment_repo
            .find_by_id(route.eqp_id())
            .await
            .map_err(map_equipment_repository_error)?;
        if owner.is_none() {
            return Err(equipment_not_found(route.eqp_id().as_str()));
        }

        let raw_id = next_identifier(self.sequence.as_ref(), IdScope::ROUTE).await?;
        let route_id = RouteId::new(&raw_id)
            .map_err(|err| Error::internal(format!("generated invalid route id: {err}")))?;
        let route = route.into_route(route_id, self.clock.utc());

        self.route_repo
            .insert(&route)
            .await
            .map_err(map_route_repository_error)?;

        info!(route_id = %route.route_id(), eqp_id = %route.eqp_id(), "route registered");
        Ok(route)
    }

    async fn get_route(&self, route_id: RouteId) -> Result<Route, Error> {
        self.route_repo
            .find_by_id(&route_id)
            .await
            .map_err(map_route_repository_error)?
            .ok_or_else(|| route_not_found(route_id.as_str()))
    }

    async fn list_routes(&self) -> Result<Vec<Route>, Error> {
        self.route_repo
            .list()
            .await
            .map_err(map_route_repository_error)
    }

    async fn list_routes_for_equipment(&self, eqp_id: EquipmentId) -> Result<Vec<Route>, Error> {
        self.route_repo
            .list_for_equipment(&eqp_id)
            .await
            .map_err(map_route_repository_error)
    }
}

#[cfg(test)]
#[path = "registry_service_tests.rs"]
mod tests;
