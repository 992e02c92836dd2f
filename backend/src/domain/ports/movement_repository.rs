//! Port abstraction for movement cycle persistence.
//!
//! Adapters store one row per `(route_id, eqp_id, group_no, cycle_number)`.
//! Inserts must surface a duplicate composite key as
//! [`MovementRepositoryError::DuplicateKey`] and updates must compare the
//! stored revision, reporting [`MovementRepositoryError::RevisionMismatch`]
//! when another writer got there first.

use async_trait::async_trait;

use crate::domain::movement::{CycleKey, CycleSummary, MovementCycle};
use crate::domain::{EquipmentId, RouteId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by movement repository adapters.
    pub enum MovementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "movement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "movement repository query failed: {message}",
        /// A cycle with the same composite key already exists.
        DuplicateKey { message: String } =>
            "movement cycle already exists: {message}",
        /// The stored revision differs from the caller's expectation.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "movement cycle revision mismatch: expected {expected}, found {actual}",
        /// A referenced route or equipment row does not exist.
        MissingReference { message: String } =>
            "movement cycle references a missing row: {message}",
    }
}

/// Port for reading and writing movement cycles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// Point lookup by composite key.
    async fn find_cycle(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        key: CycleKey,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError>;

    /// Latest cycle for the pair, ordered by group then cycle descending.
    async fn find_latest(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError>;

    /// Latest cycle within one group of the pair.
    async fn find_latest_in_group(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        group_no: u32,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError>;

    /// Highest group number recorded for the pair, if any.
    async fn max_group_no(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, MovementRepositoryError>;

    /// Insert a freshly created cycle.
    async fn insert(&self, cycle: &MovementCycle) -> Result<(), MovementRepositoryError>;

    /// Replace a cycle whose stored revision equals `expected_revision`.
    async fn update(
        &self,
        cycle: &MovementCycle,
        expected_revision: u32,
    ) -> Result<(), MovementRepositoryError>;

    /// All cycle summaries, newest write first.
    async fn list_summaries(&self) -> Result<Vec<CycleSummary>, MovementRepositoryError>;

    /// Most recently written cycle of a route.
    async fn latest_summary_for_route(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<CycleSummary>, MovementRepositoryError>;

    /// Cycle summaries of one piece of equipment, newest write first.
    async fn list_summaries_for_equipment(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError>;

    /// Cycle summaries sharing a group number, newest write first.
    async fn list_summaries_for_group(
        &self,
        group_no: u32,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMovementRepository;

#[async_trait]
impl MovementRepository for FixtureMovementRepository {
    async fn find_cycle(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
        _key: CycleKey,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        Ok(None)
    }

    async fn find_latest(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        Ok(None)
    }

    async fn find_latest_in_group(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
        _group_no: u32,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        Ok(None)
    }

    async fn max_group_no(
        &self,
        _route_id: &RouteId,
        _eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, MovementRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _cycle: &MovementCycle) -> Result<(), MovementRepositoryError> {
        Ok(())
    }

    async fn update(
        &self,
        _cycle: &MovementCycle,
        _expected_revision: u32,
    ) -> Result<(), MovementRepositoryError> {
        Ok(())
    }

    async fn list_summaries(&self) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        Ok(Vec::new())
    }

    async fn latest_summary_for_route(
        &self,
        _route_id: &RouteId,
    ) -> Result<Option<CycleSummary>, MovementRepositoryError> {
        Ok(None)
    }

    async fn list_summaries_for_equipment(
        &self,
        _eqp_id: &EquipmentId,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_summaries_for_group(
        &self,
        _group_no: u32,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        Ok(Vec::new())
    }
}
