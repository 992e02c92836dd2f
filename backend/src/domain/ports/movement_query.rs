//! Driving port for movement reads.

use async_trait::async_trait;

use crate::domain::movement::{CycleKey, CycleSummary, MovementCycle};
use crate::domain::{EquipmentId, Error, RouteId};

/// Driving port for listing and fetching movement cycles.
///
/// Summaries leave the sample payload out; [`MovementQuery::get_cycle`]
/// returns the full cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementQuery: Send + Sync {
    /// Every cycle, newest write first.
    async fn list_movements(&self) -> Result<Vec<CycleSummary>, Error>;

    /// The most recently written cycle of a route.
    async fn movement_for_route(&self, route_id: RouteId) -> Result<CycleSummary, Error>;

    /// Cycles recorded by one piece of equipment, newest write first.
    async fn movements_for_equipment(
        &self,
        eqp_id: EquipmentId,
    ) -> Result<Vec<CycleSummary>, Error>;

    /// Cycles sharing a group number across all pairs, newest write first.
    async fn movements_for_group(&self, group_no: u32) -> Result<Vec<CycleSummary>, Error>;

    /// One cycle with its samples.
    async fn get_cycle(
        &self,
        route_id: RouteId,
        eqp_id: EquipmentId,
        key: CycleKey,
    ) -> Result<MovementCycle, Error>;
}
