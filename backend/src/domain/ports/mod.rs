//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod equipment_registry;
mod equipment_repository;
mod group_label_repository;
mod id_sequence_repository;
mod movement_command;
mod movement_metrics;
mod movement_query;
mod movement_repository;
mod route_registry;
mod route_repository;

#[cfg(test)]
pub use equipment_registry::MockEquipmentRegistry;
pub use equipment_registry::EquipmentRegistry;
#[cfg(test)]
pub use equipment_repository::MockEquipmentRepository;
pub use equipment_repository::{
    EquipmentRepository, EquipmentRepositoryError, FixtureEquipmentRepository,
};
#[cfg(test)]
pub use group_label_repository::MockGroupLabelRepository;
pub use group_label_repository::{
    FixtureGroupLabelRepository, GroupLabelRepository, GroupLabelRepositoryError,
};
#[cfg(test)]
pub use id_sequence_repository::MockIdSequenceRepository;
pub use id_sequence_repository::{
    FixtureIdSequenceRepository, IdSequenceRepository, IdSequenceRepositoryError,
};
#[cfg(test)]
pub use movement_command::MockMovementCommand;
pub use movement_command::{
    CycleWriteResult, GroupSelector, MovementCommand, SubmitMovementRequest,
};
#[cfg(test)]
pub use movement_metrics::MockMovementMetrics;
pub use movement_metrics::{
    MovementMetrics, MovementMetricsError, MovementWriteOutcome, NoOpMovementMetrics,
};
#[cfg(test)]
pub use movement_query::MockMovementQuery;
pub use movement_query::MovementQuery;
#[cfg(test)]
pub use movement_repository::MockMovementRepository;
pub use movement_repository::{
    FixtureMovementRepository, MovementRepository, MovementRepositoryError,
};
#[cfg(test)]
pub use route_registry::MockRouteRegistry;
pub use route_registry::RouteRegistry;
#[cfg(test)]
pub use route_repository::MockRouteRepository;
pub use route_repository::{FixtureRouteRepository, RouteRepository, RouteRepositoryError};
