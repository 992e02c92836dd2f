//! Driving port for the equipment registry.

use async_trait::async_trait;

use crate::domain::{Equipment, EquipmentId, Error, NewEquipment};

/// Create and read registered equipment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentRegistry: Send + Sync {
    /// Register equipment under a freshly generated `EQP-NNNNN` identifier.
    async fn create_equipment(&self, equipment: NewEquipment) -> Result<Equipment, Error>;

    /// Fetch one piece of equipment; `not_found` when absent.
    async fn get_equipment(&self, eqp_id: EquipmentId) -> Result<Equipment, Error>;

    /// All equipment, newest first.
    async fn list_equipment(&self) -> Result<Vec<Equipment>, Error>;
}
