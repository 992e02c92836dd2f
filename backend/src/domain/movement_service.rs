//! Cycle writer: the movement submission workflow.
//!
//! A submission is validated, its target cycle located, the stored and
//! incoming samples packed together, the status re-resolved and the result
//! persisted. Writes for one route/equipment pair are serialised in-process
//! by [`MovementLocks`]; across processes the composite key and the
//! optimistic `revision` detect collisions, which are retried from a fresh
//! read up to [`WRITE_ATTEMPTS`] times.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::group_allocator::{GroupAllocator, LABEL_BIND_ATTEMPTS};
use crate::domain::movement::{
    CycleKey, CycleStatus, GroupLabel, MovementCycle, MovementCycleDraft, MovementSettings,
    RouteEndpoints, Sample, check_cycle_bounds, pack, partition_ordinal, validate_samples,
};
use crate::domain::movement_locks::MovementLocks;
use crate::domain::ports::{
    CycleWriteResult, EquipmentRepository, GroupLabelRepository, GroupSelector, MovementCommand,
    MovementMetrics, MovementRepository, MovementRepositoryError, MovementWriteOutcome,
    RouteRepository, SubmitMovementRequest,
};
use crate::domain::registry_service::{
    equipment_not_found, map_equipment_repository_error, map_route_repository_error,
    route_not_found,
};
use crate::domain::{EquipmentId, Error, ErrorCode, Route, RouteId};

/// Attempts made before a contended write is reported as a conflict.
pub const WRITE_ATTEMPTS: usize = 3;

pub(crate) fn map_movement_repository_error(error: MovementRepositoryError) -> Error {
    match error {
        MovementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("movement repository unavailable: {message}"))
        }
        MovementRepositoryError::Query { message } => {
            Error::internal(format!("movement repository error: {message}"))
        }
        MovementRepositoryError::DuplicateKey { message } => {
            Error::conflict(format!("movement cycle already exists: {message}"))
        }
        MovementRepositoryError::RevisionMismatch { expected, actual } => Error::conflict(format!(
            "movement cycle changed concurrently (expected revision {expected}, found {actual})"
        )),
        MovementRepositoryError::MissingReference { message } => {
            Error::not_found(format!("movement references a missing row: {message}"))
                .with_details(json!({ "code": "missing_reference" }))
        }
    }
}

fn invalid(message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": code }))
}

/// Repositories the cycle writer reads and writes.
pub struct MovementStores<M, R, E, L> {
    pub movements: Arc<M>,
    pub routes: Arc<R>,
    pub equipment: Arc<E>,
    pub labels: Arc<L>,
}

/// Where a submission lands and what is stored there already.
struct Target {
    key: CycleKey,
    existing: Option<MovementCycle>,
}

/// Samples left after dropping ids the cycle has already seen.
struct Deduplicated {
    accepted: Vec<Sample>,
    duplicates: usize,
}

fn deduplicate(stored: &[Sample], incoming: Vec<Sample>) -> Deduplicated {
    let mut seen: HashSet<String> = stored
        .iter()
        .filter_map(Sample::sample_id)
        .map(str::to_owned)
        .collect();
    let mut duplicates = 0;
    let accepted = incoming
        .into_iter()
        .filter(|sample| match sample.sample_id() {
            Some(id) if !seen.insert(id.to_owned()) => {
                duplicates += 1;
                false
            }
            _ => true,
        })
        .collect();
    Deduplicated {
        accepted,
        duplicates,
    }
}

/// Validated, selector-resolved view of a submission.
struct Submission {
    route: Route,
    eqp_id: EquipmentId,
    group_no: Option<u32>,
    group_label: Option<GroupLabel>,
    cycle_number: Option<u32>,
    max_cycles_per_group: u32,
    samples: Vec<Sample>,
    status: Option<CycleStatus>,
}

/// Movement service implementing [`MovementCommand`].
pub struct MovementService<M, R, E, L> {
    movements: Arc<M>,
    routes: Arc<R>,
    equipment: Arc<E>,
    allocator: GroupAllocator<M, L>,
    locks: Arc<MovementLocks>,
    metrics: Arc<dyn MovementMetrics>,
    clock: Arc<dyn Clock>,
    settings: MovementSettings,
}

impl<M, R, E, L> MovementService<M, R, E, L>
where
    M: MovementRepository,
    R: RouteRepository,
    E: EquipmentRepository,
    L: GroupLabelRepository,
{
    /// Build the writer over its stores.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use equipment_movements::domain::{MovementService, MovementStores};
    /// # use equipment_movements::domain::movement::MovementSettings;
    /// # use equipment_movements::domain::ports::{
    /// #     FixtureEquipmentRepository, FixtureGroupLabelRepository, FixtureMovementRepository,
    /// #     FixtureRouteRepository, NoOpMovementMetrics,
    /// # };
    /// let service = MovementService::new(
    ///     MovementStores {
    ///         movements: Arc::new(FixtureMovementRepository),
    ///         routes: Arc::new(FixtureRouteRepository),
    ///         equipment: Arc::new(FixtureEquipmentRepository),
    ///         labels: Arc::new(FixtureGroupLabelRepository),
    ///     },
    ///     MovementSettings::default(),
    ///     Arc::new(NoOpMovementMetrics),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        stores: MovementStores<M, R, E, L>,
        settings: MovementSettings,
        metrics: Arc<dyn MovementMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let MovementStores {
            movements,
            routes,
            equipment,
            labels,
        } = stores;
        Self {
            allocator: GroupAllocator::new(Arc::clone(&movements), labels),
            movements,
            routes,
            equipment,
            locks: Arc::new(MovementLocks::new()),
            metrics,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> MovementSettings {
        self.settings
    }

    async fn prepare(&self, request: SubmitMovementRequest) -> Result<Submission, Error> {
        let SubmitMovementRequest {
            route_id,
            eqp_id,
            group,
            cycle_number,
            max_cycles_per_group,
            samples,
            status,
        } = request;

        let max_cycles_per_group =
            max_cycles_per_group.unwrap_or(self.settings.max_cycles_per_group());
        if max_cycles_per_group == 0 {
            return Err(invalid(
                "max_cycles_per_group must be at least 1",
                "invalid_max_cycles_per_group",
            ));
        }
        if status.is_some() && !self.settings.status_strategy().accepts_explicit_status() {
            return Err(invalid(
                "an explicit status is not accepted while statuses are derived from GPS",
                "explicit_status_rejected",
            ));
        }
        if samples.is_empty() {
            return Err(invalid("at least one sample is required", "empty_samples"));
        }
        let samples = validate_samples(samples).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "code": err.source.code(),
                "index": err.index,
            }))
        })?;
        if cycle_number == Some(0) {
            return Err(invalid("cycle_number must be at least 1", "invalid_cycle_number"));
        }
        if group == GroupSelector::Number(0) {
            return Err(invalid("group_no must be at least 1", "invalid_group_no"));
        }

        let route = self
            .routes
            .find_by_id(&route_id)
            .await
            .map_err(map_route_repository_error)?
            .ok_or_else(|| route_not_found(route_id.as_str()))?;
        self.equipment
            .find_by_id(&eqp_id)
            .await
            .map_err(map_equipment_repository_error)?
            .ok_or_else(|| equipment_not_found(eqp_id.as_str()))?;

        let (group_no, group_label) = match group {
            GroupSelector::Auto => (None, None),
            GroupSelector::Number(group_no) => (Some(group_no), None),
            GroupSelector::Label(label) => (None, Some(label)),
        };

        Ok(Submission {
            route,
            eqp_id,
            group_no,
            group_label,
            cycle_number,
            max_cycles_per_group,
            samples,
            status,
        })
    }

    async fn write(&self, request: SubmitMovementRequest) -> Result<CycleWriteResult, Error> {
        let mut submission = self.prepare(request).await?;
        let route_id = submission.route.route_id().clone();
        let _pair = self.locks.acquire(&route_id, &submission.eqp_id).await;

        if let Some(label) = &submission.group_label {
            let group_no = self
                .allocator
                .resolve_label(&route_id, &submission.eqp_id, label)
                .await?;
            submission.group_no = Some(group_no);
        }

        for attempt in 1..=WRITE_ATTEMPTS {
            let target = self.locate(&route_id, &submission).await?;
            match self.apply(&submission, target).await {
                Ok(result) => return Ok(result),
                Err(
                    err @ (MovementRepositoryError::DuplicateKey { .. }
                    | MovementRepositoryError::RevisionMismatch { .. }),
                ) => {
                    debug!(
                        %route_id,
                        eqp_id = %submission.eqp_id,
                        attempt,
                        error = %err,
                        "movement write collided; retrying from a fresh read"
                    );
                }
                Err(err) => return Err(map_movement_repository_error(err)),
            }
        }

        Err(Error::conflict(format!(
            "movement write for route {route_id} and equipment {} kept colliding",
            submission.eqp_id
        ))
        .with_details(json!({ "code": "write_conflict" })))
    }

    /// Pick the cycle a submission targets.
    ///
    /// Without an explicit cycle number the newest cycle of the selected
    /// group (or of the pair) is reused while it is open. A closed cycle below
    /// the cap is followed by the next number in its group; a closed cycle at
    /// the cap moves the submission to a group with no cycles, taking the
    /// label along when there is one.
    async fn locate(&self, route_id: &RouteId, submission: &Submission) -> Result<Target, Error> {
        let max = submission.max_cycles_per_group;
        let eqp_id = &submission.eqp_id;

        let mut group_no = match (submission.group_no, submission.cycle_number) {
            (None, Some(ordinal)) => {
                let key = partition_ordinal(ordinal, max).ok_or_else(|| {
                    invalid("cycle_number must be at least 1", "invalid_cycle_number")
                })?;
                return self.target_at(route_id, eqp_id, key, max).await;
            }
            (Some(group_no), Some(cycle_number)) => {
                let key = CycleKey::new(group_no, cycle_number);
                return self.target_at(route_id, eqp_id, key, max).await;
            }
            (group_no, None) => group_no,
        };

        for _ in 0..=LABEL_BIND_ATTEMPTS {
            let latest = match group_no {
                Some(group_no) => self
                    .movements
                    .find_latest_in_group(route_id, eqp_id, group_no)
                    .await
                    .map_err(map_movement_repository_error)?,
                None => self
                    .movements
                    .find_latest(route_id, eqp_id)
                    .await
                    .map_err(map_movement_repository_error)?,
            };
            let key = match latest {
                None => CycleKey::new(group_no.unwrap_or(1), 1),
                Some(cycle) if !cycle.is_closed() => {
                    check_bounds(cycle.key(), max)?;
                    return Ok(Target {
                        key: cycle.key(),
                        existing: Some(cycle),
                    });
                }
                Some(cycle) if cycle.key().cycle_number < max => cycle.key().successor(max),
                Some(cycle) => {
                    let fresh = self
                        .allocator
                        .roll_over(
                            route_id,
                            eqp_id,
                            submission.group_label.as_ref(),
                            cycle.key().group_no,
                        )
                        .await?;
                    debug!(
                        %route_id,
                        %eqp_id,
                        full_group = cycle.key().group_no,
                        group_no = fresh,
                        "group is full; moving to a fresh group"
                    );
                    if submission.group_label.is_some() {
                        // The label may have been moved to a group that already has cycles.
                        group_no = Some(fresh);
                        continue;
                    }
                    CycleKey::new(fresh, 1)
                }
            };
            return self.target_at(route_id, eqp_id, key, max).await;
        }

        Err(Error::conflict(format!(
            "group for route {route_id} and equipment {eqp_id} kept moving"
        ))
        .with_details(json!({ "code": "write_conflict" })))
    }

    async fn target_at(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        key: CycleKey,
        max: u32,
    ) -> Result<Target, Error> {
        check_bounds(key, max)?;
        let existing = self
            .movements
            .find_cycle(route_id, eqp_id, key)
            .await
            .map_err(map_movement_repository_error)?;
        Ok(Target { key, existing })
    }

    /// Merge the submission into `target` and persist it.
    async fn apply(
        &self,
        submission: &Submission,
        target: Target,
    ) -> Result<CycleWriteResult, MovementRepositoryError> {
        let now = self.clock.utc();
        let layout = self.settings.layout();
        let strategy = self.settings.status_strategy();
        let Target { key, existing } = target;

        let (stored, previous) = match existing {
            Some(cycle) => {
                let previous = PreviousState {
                    status: cycle.status(),
                    start_time: cycle.start_time(),
                    end_time: cycle.end_time(),
                    revision: cycle.revision(),
                    group_label: cycle.group_label().cloned(),
                    endpoints: *cycle.endpoints(),
                };
                (cycle.into_samples(), Some(previous))
            }
            None => (Vec::new(), None),
        };
        let existing_samples = stored.len();
        let Deduplicated {
            accepted,
            duplicates,
        } = deduplicate(&stored, submission.samples.clone());

        // Resolved before packing so markers in dropped samples still count.
        let endpoints = previous
            .as_ref()
            .map_or(*submission.route.endpoints(), |prev| prev.endpoints);
        let derived = submission
            .status
            .unwrap_or_else(|| strategy.resolve(stored.iter().chain(&accepted), &endpoints));
        let status = previous
            .as_ref()
            .map_or(derived, |prev| prev.status.advance(derived));

        let outcome = pack(stored, accepted, layout);
        let new_samples = outcome.total_stored.saturating_sub(existing_samples);

        let (start_time, end_time, revision, group_label) = match &previous {
            Some(prev) => (
                prev.start_time,
                match prev.end_time {
                    Some(end) => Some(end),
                    None => status.is_completed().then_some(now),
                },
                prev.revision.wrapping_add(1),
                prev.group_label
                    .clone()
                    .or_else(|| submission.group_label.clone()),
            ),
            None => (
                now,
                status.is_completed().then_some(now),
                0,
                submission.group_label.clone(),
            ),
        };

        let cycle = MovementCycle::new(MovementCycleDraft {
            route_id: submission.route.route_id().clone(),
            eqp_id: submission.eqp_id.clone(),
            key,
            group_label,
            slots: outcome.slots,
            active_slot_index: outcome.active_slot_index,
            total_sample_count: outcome.total_stored,
            status,
            start_time,
            end_time,
            endpoints,
            revision,
            inserted_on: now,
        })
        .map_err(|err| MovementRepositoryError::query(format!("assembled invalid cycle: {err}")))?;

        match &previous {
            Some(prev) => self.movements.update(&cycle, prev.revision).await?,
            None => self.movements.insert(&cycle).await?,
        }

        let created = previous.is_none();
        if outcome.capacity_exceeded {
            warn!(
                route_id = %cycle.route_id(),
                eqp_id = %cycle.eqp_id(),
                group_no = key.group_no,
                cycle_number = key.cycle_number,
                dropped = outcome.dropped,
                "cycle slots are full; samples dropped"
            );
        }
        info!(
            route_id = %cycle.route_id(),
            eqp_id = %cycle.eqp_id(),
            group_no = key.group_no,
            cycle_number = key.cycle_number,
            status = %status,
            created,
            total = outcome.total_stored,
            "movement cycle written"
        );

        Ok(CycleWriteResult {
            route_id: cycle.route_id().clone(),
            eqp_id: cycle.eqp_id().clone(),
            group_no: key.group_no,
            cycle_number: key.cycle_number,
            group_label: cycle.group_label().cloned(),
            status,
            created,
            existing_samples,
            new_samples,
            duplicate_samples: duplicates,
            total_samples: outcome.total_stored,
            dropped_samples: outcome.dropped,
            active_slot_index: outcome.active_slot_index,
            capacity_exceeded: outcome.capacity_exceeded,
            can_create_next_cycle: status.is_completed()
                && key.cycle_number < submission.max_cycles_per_group,
            start_time,
            end_time,
        })
    }

    async fn record(&self, result: &Result<CycleWriteResult, Error>) {
        let outcome = match result {
            Ok(written) if written.created => MovementWriteOutcome::Created,
            Ok(_) => MovementWriteOutcome::Appended,
            Err(err) => match err.code() {
                ErrorCode::InvalidRequest | ErrorCode::NotFound => MovementWriteOutcome::Rejected,
                ErrorCode::Conflict => MovementWriteOutcome::Conflict,
                _ => return,
            },
        };
        if let Err(err) = self.metrics.record_write(outcome).await {
            debug!(error = %err, "failed to record movement write metric");
        }
        if let Ok(written) = result {
            if written.dropped_samples > 0 {
                let dropped = u64::try_from(written.dropped_samples).unwrap_or(u64::MAX);
                if let Err(err) = self.metrics.record_dropped_samples(dropped).await {
                    debug!(error = %err, "failed to record dropped sample metric");
                }
            }
        }
    }
}

/// Fields carried over from the stored cycle on append.
struct PreviousState {
    status: CycleStatus,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    revision: u32,
    group_label: Option<GroupLabel>,
    endpoints: RouteEndpoints,
}

fn check_bounds(key: CycleKey, max_cycles_per_group: u32) -> Result<(), Error> {
    check_cycle_bounds(key.cycle_number, max_cycles_per_group).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "code": "cycle_out_of_bounds",
            "cycleNumber": err.cycle_number,
            "maxCyclesPerGroup": err.max_cycles_per_group,
        }))
    })
}

#[async_trait]
impl<M, R, E, L> MovementCommand for MovementService<M, R, E, L>
where
    M: MovementRepository,
    R: RouteRepository,
    E: EquipmentRepository,
    L: GroupLabelRepository,
{
    async fn submit(&self, request: SubmitMovementRequest) -> Result<CycleWriteResult, Error> {
        let result = self.write(request).await;
        self.record(&result).await;
        result
    }
}

#[cfg(test)]
#[path = "movement_service_tests.rs"]
mod tests;
