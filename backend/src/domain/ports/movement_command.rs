//! Driving port for movement submissions.
//!
//! Inbound adapters hand a batch of raw samples to the cycle writer and get
//! back a description of the cycle that absorbed them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::movement::{CycleStatus, GroupLabel};
use crate::domain::{EquipmentId, Error, RouteId};

/// How the caller picks the group a submission lands in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupSelector {
    /// Derive the group from the latest cycle or the cycle ordinal.
    #[default]
    Auto,
    /// Use an explicit group number.
    Number(u32),
    /// Resolve or bind a durable label.
    Label(GroupLabel),
}

/// One movement submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitMovementRequest {
    pub route_id: RouteId,
    pub eqp_id: EquipmentId,
    pub group: GroupSelector,
    /// Explicit cycle number. Without a group it is treated as a running
    /// ordinal and partitioned into groups.
    pub cycle_number: Option<u32>,
    /// Per-request override of the configured cycles-per-group cap.
    pub max_cycles_per_group: Option<u32>,
    /// Raw sample objects, validated by the writer.
    pub samples: Vec<Value>,
    /// Caller-asserted status; only honoured by the type-tag strategy.
    pub status: Option<CycleStatus>,
}

impl SubmitMovementRequest {
    /// Request with automatic group and cycle selection.
    pub fn new(route_id: RouteId, eqp_id: EquipmentId, samples: Vec<Value>) -> Self {
        Self {
            route_id,
            eqp_id,
            group: GroupSelector::Auto,
            cycle_number: None,
            max_cycles_per_group: None,
            samples,
            status: None,
        }
    }
}

/// Outcome of a movement submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleWriteResult {
    pub route_id: RouteId,
    pub eqp_id: EquipmentId,
    pub group_no: u32,
    pub cycle_number: u32,
    pub group_label: Option<GroupLabel>,
    pub status: CycleStatus,
    /// `true` when a new cycle row was inserted.
    pub created: bool,
    /// Samples stored before this submission.
    pub existing_samples: usize,
    /// Incoming samples stored after de-duplication and the capacity cut.
    pub new_samples: usize,
    /// Incoming samples skipped because their `sample_id` was already seen.
    pub duplicate_samples: usize,
    /// Samples stored after this submission.
    pub total_samples: usize,
    /// Samples discarded because every slot was full.
    pub dropped_samples: usize,
    pub active_slot_index: usize,
    pub capacity_exceeded: bool,
    /// The cycle is completed and its group still has room for another.
    pub can_create_next_cycle: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Driving port for movement writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementCommand: Send + Sync {
    /// Merge `request.samples` into the targeted cycle, creating it when
    /// needed.
    ///
    /// Fails with `invalid_request` for malformed samples or cycle numbers
    /// outside the group cap, `not_found` for unknown routes or equipment and
    /// `conflict` when concurrent writers keep winning.
    async fn submit(&self, request: SubmitMovementRequest) -> Result<CycleWriteResult, Error>;
}
