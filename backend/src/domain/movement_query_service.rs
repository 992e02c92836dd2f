//! Movement read service implementing [`MovementQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::movement::{CycleKey, CycleSummary, MovementCycle};
use crate::domain::movement_service::map_movement_repository_error;
use crate::domain::ports::{MovementQuery, MovementRepository};
use crate::domain::{EquipmentId, Error, RouteId};

/// Read-side movement service.
#[derive(Clone)]
pub struct MovementQueryService<M> {
    movements: Arc<M>,
}

impl<M> MovementQueryService<M> {
    pub fn new(movements: Arc<M>) -> Self {
        Self { movements }
    }
}

#[async_trait]
impl<M> MovementQuery for MovementQueryService<M>
where
    M: MovementRepository,
{
    async fn list_movements(&self) -> Result<Vec<CycleSummary>, Error> {
        self.movements
            .list_summaries()
            .await
            .map_err(map_movement_repository_error)
    }

    async fn movement_for_route(&self, route_id: RouteId) -> Result<CycleSummary, Error> {
        self.movements
            .latest_summary_for_route(&route_id)
            .await
            .map_err(map_movement_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no movements recorded for route {route_id}"))
                    .with_details(json!({
                        "code": "movement_not_found",
                        "routeId": route_id.as_str(),
                    }))
            })
    }

    async fn movements_for_equipment(
        &self,
        eqp_id: EquipmentId,
    ) -> Result<Vec<CycleSummary>, Error> {
        self.movements
            .list_summaries_for_equipment(&eqp_id)
            .await
            .map_err(map_movement_repository_error)
    }

    async fn movements_for_group(&self, group_no: u32) -> Result<Vec<CycleSummary>, Error> {
        if group_no == 0 {
            return Err(Error::invalid_request("group_no must be at least 1")
                .with_details(json!({ "code": "invalid_group_no" })));
        }
        self.movements
            .list_summaries_for_group(group_no)
            .await
            .map_err(map_movement_repository_error)
    }

    async fn get_cycle(
        &self,
        route_id: RouteId,
        eqp_id: EquipmentId,
        key: CycleKey,
    ) -> Result<MovementCycle, Error> {
        self.movements
            .find_cycle(&route_id, &eqp_id, key)
            .await
            .map_err(map_movement_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no cycle {key} for route {route_id} and equipment {eqp_id}"
                ))
                .with_details(json!({ "code": "movement_not_found" }))
            })
    }
}
