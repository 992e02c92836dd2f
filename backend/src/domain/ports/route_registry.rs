//! Driving port for the route registry.

use async_trait::async_trait;

use crate::domain::{EquipmentId, Error, NewRoute, Route, RouteId};

/// Create and read locked routes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteRegistry: Send + Sync {
    /// Register a route under a freshly generated `ROT-NNNNN` identifier.
    ///
    /// Fails with `not_found` (`equipment_not_found`) when the owning
    /// equipment is unknown.
    async fn create_route(&self, route: NewRoute) -> Result<Route, Error>;

    /// Fetch one route; `not_found` when absent.
    async fn get_route(&self, route_id: RouteId) -> Result<Route, Error>;

    /// All routes, newest first.
    async fn list_routes(&self) -> Result<Vec<Route>, Error>;

    /// Routes locked by one piece of equipment, newest first.
    async fn list_routes_for_equipment(&self, eqp_id: EquipmentId) -> Result<Vec<Route>, Error>;
}
