//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the equipment movement model and the workflows that act on
//! it, free of transport and storage concerns. Adapters reach the domain
//! through the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Equipment, Route: registry entities.
//! - [`movement`]: samples, slots, statuses, groups and cycles.
//! - MovementService: the cycle writer behind `MovementCommand`.
//! - MovementQueryService, EquipmentRegistryService, RouteRegistryService.

pub mod equipment;
pub mod error;
pub mod group_allocator;
pub mod movement;
pub mod movement_locks;
pub mod movement_query_service;
pub mod movement_service;
pub mod ports;
pub mod registry_service;
pub mod route;
pub mod sequential_id;
pub mod trace_id;

pub use self::equipment::{
    Equipment, EquipmentId, EquipmentValidationError, MOBILE_MAX, NewEquipment, TEXT_COLUMN_MAX,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::group_allocator::{GroupAllocator, LABEL_BIND_ATTEMPTS};
pub use self::movement_locks::MovementLocks;
pub use self::movement_query_service::MovementQueryService;
pub use self::movement_service::{MovementService, MovementStores, WRITE_ATTEMPTS};
pub use self::registry_service::{EquipmentRegistryService, RouteRegistryService};
pub use self::route::{NewRoute, Route, RouteDraft, RouteId, RouteMarkers, RouteValidationError};
pub use self::sequential_id::{IdScope, SEQUENCE_MAX, SequenceExhausted};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use equipment_movements::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such cycle"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
