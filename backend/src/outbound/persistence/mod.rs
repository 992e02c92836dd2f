//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are classified once and
//!   mapped to the port's own error type.
//!
//! # Example
//!
//! ```ignore
//! use equipment_movements::outbound::persistence::{DbPool, PoolConfig, DieselMovementRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/movements")).await?;
//! let movements = DieselMovementRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
pub(crate) mod diesel_helpers;
mod diesel_equipment_repository;
mod diesel_group_label_repository;
mod diesel_id_sequence_repository;
mod diesel_movement_repository;
mod diesel_route_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_equipment_repository::DieselEquipmentRepository;
pub use diesel_group_label_repository::DieselGroupLabelRepository;
pub use diesel_id_sequence_repository::DieselIdSequenceRepository;
pub use diesel_movement_repository::DieselMovementRepository;
pub use diesel_route_repository::DieselRouteRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
