//! Movement cycle model and the pure algorithms behind the write path.
//!
//! - [`pack`] spreads samples over bounded slots.
//! - [`StatusStrategy`] derives a cycle's lifecycle status.
//! - [`CycleKey`] and the group helpers place cycles into capped groups.
//! - [`MovementCycle`] is the persisted aggregate.
//!
//! Nothing here performs I/O; the orchestration lives in
//! [`crate::domain::MovementService`].

mod cycle;
mod gps;
mod group;
mod packing;
mod sample;
mod settings;
mod status;

pub use cycle::{CycleSummary, MovementCycle, MovementCycleDraft, MovementCycleValidationError};
pub use gps::{DEFAULT_GPS_TOLERANCE, GpsPoint, GpsPointError};
pub use group::{
    CycleKey, CycleOutOfBounds, DEFAULT_MAX_CYCLES_PER_GROUP, GROUP_LABEL_MAX, GroupLabel,
    GroupLabelError, check_cycle_bounds, group_for_ordinal, partition_ordinal,
};
pub use packing::{
    DEFAULT_SLOT_CAPACITY, DEFAULT_SLOT_COUNT, PackOutcome, SampleSlots, SlotLayout,
    SlotLayoutError, pack,
};
pub use sample::{
    END_GPS_KEY, SAMPLE_ID_KEY, SAMPLE_TYPE_KEY, START_GPS_KEY, Sample, SampleBatchError,
    SampleType, SampleValidationError, validate_samples,
};
pub use settings::{MovementSettings, MovementSettingsError, default_gps_strategy};
pub use status::{CycleStatus, RouteEndpoints, StatusStrategy, UnknownCycleStatus};
