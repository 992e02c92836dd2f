//! Port for route registry persistence.

use async_trait::async_trait;

use crate::domain::{EquipmentId, Route, RouteId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by route repository adapters.
    pub enum RouteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "route repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "route repository query failed: {message}",
        /// A route with the same identifier already exists.
        DuplicateKey { message: String } =>
            "route already exists: {message}",
        /// The owning equipment row does not exist.
        MissingEquipment { eqp_id: String } =>
            "route references unknown equipment {eqp_id}",
    }
}

/// Port for storing and reading locked routes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Insert a new route row.
    async fn insert(&self, route: &Route) -> Result<(), RouteRepositoryError>;

    /// Find a route by identifier.
    async fn find_by_id(&self, route_id: &RouteId) -> Result<Option<Route>, RouteRepositoryError>;

    /// List all routes, newest first.
    async fn list(&self) -> Result<Vec<Route>, RouteRepositoryError>;

    /// List routes locked by one piece of equipment, newest first.
    async fn list_for_equipment(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Vec<Route>, RouteRepositoryError>;
}

/// Fixture implementation for tests that do not exercise routes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRouteRepository;

#[async_trait]
impl RouteRepository for FixtureRouteRepository {
    async fn insert(&self, _route: &Route) -> Result<(), RouteRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _route_id: &RouteId) -> Result<Option<Route>, RouteRepositoryError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Route>, RouteRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_equipment(
        &self,
        _eqp_id: &EquipmentId,
    ) -> Result<Vec<Route>, RouteRepositoryError> {
        Ok(Vec::new())
    }
}
