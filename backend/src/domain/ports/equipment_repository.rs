//! Port for equipment registry persistence.

use async_trait::async_trait;

use crate::domain::{Equipment, EquipmentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by equipment repository adapters.
    pub enum EquipmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "equipment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "equipment repository query failed: {message}",
        /// An equipment row with the same identifier already exists.
        DuplicateKey { message: String } =>
            "equipment already exists: {message}",
    }
}

/// Port for storing and reading registered equipment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    /// Insert a new equipment row.
    async fn insert(&self, equipment: &Equipment) -> Result<(), EquipmentRepositoryError>;

    /// Find equipment by identifier.
    async fn find_by_id(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Option<Equipment>, EquipmentRepositoryError>;

    /// List all equipment, newest first.
    async fn list(&self) -> Result<Vec<Equipment>, EquipmentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEquipmentRepository;

#[async_trait]
impl EquipmentRepository for FixtureEquipmentRepository {
    async fn insert(&self, _equipment: &Equipment) -> Result<(), EquipmentRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _eqp_id: &EquipmentId,
    ) -> Result<Option<Equipment>, EquipmentRepositoryError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Equipment>, EquipmentRepositoryError> {
        Ok(Vec::new())
    }
}
