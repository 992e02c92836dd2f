//! Port for durable group label bindings.
//!
//! A label maps to exactly one group number per `(route_id, eqp_id)` pair and
//! a group number carries at most one label. Binding is first writer wins:
//! adapters must enforce both uniqueness rules atomically and report a lost
//! race by returning `false` from [`GroupLabelRepository::try_bind`].
//!
//! A label follows its cycles: once its group is full the binding moves to a
//! fresh group through [`GroupLabelRepository::rebind`], which only succeeds
//! while the label still points at the group the caller saw.

use async_trait::async_trait;

use crate::domain::movement::GroupLabel;
use crate::domain::{EquipmentId, RouteId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by group label adapters.
    pub enum GroupLabelRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "group label repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "group label repository query failed: {message}",
    }
}

/// Port for resolving and binding group labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupLabelRepository: Send + Sync {
    /// Group number already bound to `label`, if any.
    async fn find_group(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
    ) -> Result<Option<u32>, GroupLabelRepositoryError>;

    /// Highest group number carrying a label for the pair.
    async fn max_group_no(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, GroupLabelRepositoryError>;

    /// Bind `label` to `group_no`; `false` when either side is already taken.
    async fn try_bind(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
        group_no: u32,
    ) -> Result<bool, GroupLabelRepositoryError>;

    /// Move `label` from `from_group` to `to_group`; `false` when the label no
    /// longer points at `from_group` or `to_group` carries another label.
    async fn rebind(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
        from_group: u32,
        to_group: u32,
    ) -> Result<bool, GroupLabelRepositoryError>;
}

/// Fixture implementation that accepts every binding and remembers none.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGroupLabelRepository;

#[async_trait]
impl GroupLabelRepository for FixtureGroupLabelRepository {
    async fn find_group(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
        _label: &GroupLabel,
    ) -> Result<Option<u32>, GroupLabelRepositoryError> {
        Ok(None)
    }

    async fn max_group_no(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, GroupLabelRepositoryError> {
        Ok(None)
    }

    async fn try_bind(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
        _label: &GroupLabel,
        _group_no: u32,
    ) -> Result<bool, GroupLabelRepositoryError> {
        Ok(true)
    }

    async fn rebind(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
        _label: &GroupLabel,
        _from_group: u32,
        _to_group: u32,
    ) -> Result<bool, GroupLabelRepositoryError> {
        Ok(true)
    }
}
