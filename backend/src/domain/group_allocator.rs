//! Label-based group allocation.
//!
//! A caller-supplied label is bound to a group number the first time it is
//! seen for a route/equipment pair and resolves to the same number forever
//! after. New labels take the next group above everything the pair already
//! uses, whether that number came from a cycle row or an earlier label.
//!
//! When a group fills up the writer asks for a fresh one. A labelled group
//! takes its label along, so the label keeps resolving to the group where
//! its newest cycles live.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::movement::GroupLabel;
use crate::domain::movement_service::map_movement_repository_error;
use crate::domain::ports::{GroupLabelRepository, GroupLabelRepositoryError, MovementRepository};
use crate::domain::{EquipmentId, Error, RouteId};

/// Attempts made before a contended label binding gives up.
pub const LABEL_BIND_ATTEMPTS: usize = 3;

fn map_label_error(error: GroupLabelRepositoryError) -> Error {
    match error {
        GroupLabelRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group label repository unavailable: {message}"))
        }
        GroupLabelRepositoryError::Query { message } => {
            Error::internal(format!("group label repository error: {message}"))
        }
    }
}

/// Resolves group labels to stable group numbers.
pub struct GroupAllocator<M, L> {
    movement_repo: Arc<M>,
    label_repo: Arc<L>,
}

impl<M, L> Clone for GroupAllocator<M, L> {
    fn clone(&self) -> Self {
        Self {
            movement_repo: Arc::clone(&self.movement_repo),
            label_repo: Arc::clone(&self.label_repo),
        }
    }
}

impl<M, L> GroupAllocator<M, L>
where
    M: MovementRepository,
    L: GroupLabelRepository,
{
    pub fn new(movement_repo: Arc<M>, label_repo: Arc<L>) -> Self {
        Self {
            movement_repo,
            label_repo,
        }
    }

    /// Look up the group bound to `label`, binding the next free group when
    /// the label is new.
    ///
    /// Losing a binding race re-reads the label so the winner's number is
    /// returned. Fails with `conflict` after [`LABEL_BIND_ATTEMPTS`] lost
    /// races.
    pub async fn resolve_label(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
    ) -> Result<u32, Error> {
        for attempt in 1..=LABEL_BIND_ATTEMPTS {
            if let Some(group_no) = self
                .label_repo
                .find_group(route_id, eqp_id, label)
                .await
                .map_err(map_label_error)?
            {
                return Ok(group_no);
            }

            let next = self.next_free_group(route_id, eqp_id).await?;
            let bound = self
                .label_repo
                .try_bind(route_id, eqp_id, label, next)
                .await
                .map_err(map_label_error)?;
            if bound {
                info!(%route_id, %eqp_id, %label, group_no = next, "group label bound");
                return Ok(next);
            }
            debug!(%route_id, %eqp_id, %label, attempt, "group label binding lost a race");
        }

        Err(Error::conflict(format!(
            "could not bind group label {label} after {LABEL_BIND_ATTEMPTS} attempts"
        )))
    }

    /// Pick the group that takes over once `full_group` has no room left.
    ///
    /// Without a label this is the next free group. With one, the label is
    /// moved to a free group; if another writer already moved it, the group it
    /// points at now is returned instead.
    pub async fn roll_over(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: Option<&GroupLabel>,
        full_group: u32,
    ) -> Result<u32, Error> {
        let Some(label) = label else {
            return self.next_free_group(route_id, eqp_id).await;
        };

        for attempt in 1..=LABEL_BIND_ATTEMPTS {
            let next = self.next_free_group(route_id, eqp_id).await?;
            let moved = self
                .label_repo
                .rebind(route_id, eqp_id, label, full_group, next)
                .await
                .map_err(map_label_error)?;
            if moved {
                info!(
                    %route_id,
                    %eqp_id,
                    %label,
                    from = full_group,
                    group_no = next,
                    "group label moved"
                );
                return Ok(next);
            }
            match self
                .label_repo
                .find_group(route_id, eqp_id, label)
                .await
                .map_err(map_label_error)?
            {
                Some(current) if current != full_group => return Ok(current),
                _ => debug!(%route_id, %eqp_id, %label, attempt, "group label move lost a race"),
            }
        }

        Err(Error::conflict(format!(
            "could not move group label {label} after {LABEL_BIND_ATTEMPTS} attempts"
        )))
    }

    async fn next_free_group(&self, route_id: &RouteId, eqp_id: &EquipmentId) -> Result<u32, Error> {
        let from_cycles = self
            .movement_repo
            .max_group_no(route_id, eqp_id)
            .await
            .map_err(map_movement_repository_error)?;
        let from_labels = self
            .label_repo
            .max_group_no(route_id, eqp_id)
            .await
            .map_err(map_label_error)?;
        let highest = from_cycles.max(from_labels).unwrap_or(0);
        highest
            .checked_add(1)
            .ok_or_else(|| Error::internal("group number space exhausted"))
    }
}
