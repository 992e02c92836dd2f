//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EquipmentRegistry, MovementCommand, MovementQuery, RouteRegistry};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub equipment: Arc<dyn EquipmentRegistry>,
    pub routes: Arc<dyn RouteRegistry>,
    pub movements: Arc<dyn MovementCommand>,
    pub movements_query: Arc<dyn MovementQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        equipment: Arc<dyn EquipmentRegistry>,
        routes: Arc<dyn RouteRegistry>,
        movements: Arc<dyn MovementCommand>,
        movements_query: Arc<dyn MovementQuery>,
    ) -> Self {
        Self {
            equipment,
            routes,
            movements,
            movements_query,
        }
    }
}
