//! Movement cycle aggregate.
//!
//! A cycle is one traversal attempt of one piece of equipment along one
//! route. It accumulates packed samples, a lifecycle status and the time span
//! between its first write and its completion.

use chrono::{DateTime, Utc};

use crate::domain::{EquipmentId, RouteId};

use super::{CycleKey, CycleStatus, GroupLabel, RouteEndpoints, Sample, SampleSlots};

/// Invariant violations detected when assembling a cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MovementCycleValidationError {
    #[error("group_no must be at least 1")]
    ZeroGroup,
    #[error("cycle_number must be at least 1")]
    ZeroCycle,
    #[error("total_sample_count {recorded} disagrees with {stored} stored samples")]
    SampleCountMismatch { recorded: usize, stored: usize },
    #[error("active_slot_index {index} is outside 1..={slot_count}")]
    ActiveSlotOutOfRange { index: usize, slot_count: usize },
    #[error("end_time must be set exactly when the cycle is completed")]
    EndTimeMismatch,
    #[error("end_time precedes start_time")]
    EndBeforeStart,
}

/// Field bundle used to build a [`MovementCycle`].
#[derive(Debug, Clone)]
pub struct MovementCycleDraft {
    pub route_id: RouteId,
    pub eqp_id: EquipmentId,
    pub key: CycleKey,
    pub group_label: Option<GroupLabel>,
    pub slots: SampleSlots,
    pub active_slot_index: usize,
    pub total_sample_count: usize,
    pub status: CycleStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Route reference points copied when the cycle was opened.
    pub endpoints: RouteEndpoints,
    /// Optimistic concurrency counter, bumped on every stored update.
    pub revision: u32,
    pub inserted_on: DateTime<Utc>,
}

/// One traversal attempt, with its packed samples.
///
/// ## Invariants
/// - `group_no` and `cycle_number` are at least 1.
/// - `total_sample_count` equals the number of stored samples.
/// - `active_slot_index` lies within the slot array (1 when empty).
/// - `end_time` is set exactly when `status` is completed, and never
///   precedes `start_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementCycle {
    route_id: RouteId,
    eqp_id: EquipmentId,
    key: CycleKey,
    group_label: Option<GroupLabel>,
    slots: SampleSlots,
    active_slot_index: usize,
    total_sample_count: usize,
    status: CycleStatus,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    endpoints: RouteEndpoints,
    revision: u32,
    inserted_on: DateTime<Utc>,
}

impl MovementCycle {
    /// Assemble a cycle, enforcing its invariants.
    pub fn new(draft: MovementCycleDraft) -> Result<Self, MovementCycleValidationError> {
        let MovementCycleDraft {
            route_id,
            eqp_id,
            key,
            group_label,
            slots,
            active_slot_index,
            total_sample_count,
            status,
            start_time,
            end_time,
            endpoints,
            revision,
            inserted_on,
        } = draft;

        if key.group_no == 0 {
            return Err(MovementCycleValidationError::ZeroGroup);
        }
        if key.cycle_number == 0 {
            return Err(MovementCycleValidationError::ZeroCycle);
        }
        let stored = slots.sample_count();
        if stored != total_sample_count {
            return Err(MovementCycleValidationError::SampleCountMismatch {
                recorded: total_sample_count,
                stored,
            });
        }
        if active_slot_index == 0 || active_slot_index > slots.len().max(1) {
            return Err(MovementCycleValidationError::ActiveSlotOutOfRange {
                index: active_slot_index,
                slot_count: slots.len(),
            });
        }
        if end_time.is_some() != status.is_completed() {
            return Err(MovementCycleValidationError::EndTimeMismatch);
        }
        if end_time.is_some_and(|end| end < start_time) {
            return Err(MovementCycleValidationError::EndBeforeStart);
        }

        Ok(Self {
            route_id,
            eqp_id,
            key,
            group_label,
            slots,
            active_slot_index,
            total_sample_count,
            status,
            start_time,
            end_time,
            endpoints,
            revision,
            inserted_on,
        })
    }

    pub fn route_id(&self) -> &RouteId {
        &self.route_id
    }

    pub fn eqp_id(&self) -> &EquipmentId {
        &self.eqp_id
    }

    pub fn key(&self) -> CycleKey {
        self.key
    }

    pub fn group_no(&self) -> u32 {
        self.key.group_no
    }

    pub fn cycle_number(&self) -> u32 {
        self.key.cycle_number
    }

    pub fn group_label(&self) -> Option<&GroupLabel> {
        self.group_label.as_ref()
    }

    pub fn slots(&self) -> &SampleSlots {
        &self.slots
    }

    /// Stored samples in arrival order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.slots.samples()
    }

    pub fn active_slot_index(&self) -> usize {
        self.active_slot_index
    }

    pub fn total_sample_count(&self) -> usize {
        self.total_sample_count
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn endpoints(&self) -> &RouteEndpoints {
        &self.endpoints
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn inserted_on(&self) -> DateTime<Utc> {
        self.inserted_on
    }

    /// True when further samples for this key must open a new cycle.
    pub fn is_closed(&self) -> bool {
        self.status.is_completed()
    }

    /// Projection without the sample payload.
    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            route_id: self.route_id.clone(),
            eqp_id: self.eqp_id.clone(),
            key: self.key,
            group_label: self.group_label.clone(),
            active_slot_index: self.active_slot_index,
            total_sample_count: self.total_sample_count,
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            endpoints: self.endpoints,
            inserted_on: self.inserted_on,
        }
    }

    /// Take the stored samples, consuming the cycle.
    pub fn into_samples(self) -> Vec<Sample> {
        self.slots.into_samples()
    }
}

/// Read projection of a cycle used by list queries.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub route_id: RouteId,
    pub eqp_id: EquipmentId,
    pub key: CycleKey,
    pub group_label: Option<GroupLabel>,
    pub active_slot_index: usize,
    pub total_sample_count: usize,
    pub status: CycleStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub endpoints: RouteEndpoints,
    pub inserted_on: DateTime<Utc>,
}
