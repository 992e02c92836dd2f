//! Behaviour tests for movement cycle capture.
//!
//! Scenarios run the registry and cycle writer services over the in-memory
//! store, exercising grouping, deduplication, slot capacity and status
//! resolution end to end.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

use equipment_movements::domain::movement::{
    CycleKey, CycleStatus, GroupLabel, MovementSettings, SlotLayout, StatusStrategy,
    DEFAULT_GPS_TOLERANCE, DEFAULT_MAX_CYCLES_PER_GROUP,
};
use equipment_movements::domain::ports::{
    CycleWriteResult, EquipmentRegistry, GroupSelector, MovementCommand, MovementQuery,
    NoOpMovementMetrics, RouteRegistry, SubmitMovementRequest,
};
use equipment_movements::domain::{
    EquipmentId, EquipmentRegistryService, Error, ErrorCode, MovementQueryService,
    MovementService, MovementStores, NewEquipment, NewRoute, RouteDraft, RouteId,
    RouteRegistryService,
};
use equipment_movements::outbound::memory::InMemoryStore;
use equipment_movements::test_support::{bulk_samples, tagged_samples};

const ROUTE_START: &str = "28.7041,77.1025";
const ROUTE_END: &str = "28.5355,77.3910";

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

/// Wrapper for the non-Clone runtime to enable storage in `Slot`.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

/// Services wired over one shared store.
#[derive(Clone)]
struct Services {
    movements: Arc<dyn MovementCommand>,
    query: Arc<dyn MovementQuery>,
    route_id: RouteId,
    eqp_id: EquipmentId,
}

#[derive(Default, ScenarioState)]
struct MovementWorld {
    runtime: Slot<RuntimeHandle>,
    services: Slot<Services>,
    next_sample: Slot<usize>,
    last_batch: Slot<Vec<Value>>,
    last_result: Slot<Result<CycleWriteResult, Error>>,
    labelled: Slot<Vec<CycleWriteResult>>,
}

impl MovementWorld {
    fn start(&self, settings: MovementSettings) {
        let runtime = Runtime::new().expect("create runtime");
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(DefaultClock);

        let equipment_registry = EquipmentRegistryService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            clock.clone(),
        );
        let route_registry = RouteRegistryService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            clock.clone(),
        );
        let (route_id, eqp_id) = runtime.block_on(async {
            let equipment = equipment_registry
                .create_equipment(NewEquipment::new("9800000000", "paver").expect("equipment"))
                .await
                .expect("register equipment");
            let route = route_registry
                .create_route(
                    NewRoute::try_from(RouteDraft {
                        eqp_id: equipment.eqp_id().to_string(),
                        route_name: Some("ring road".to_owned()),
                        start_gps: Some(ROUTE_START.to_owned()),
                        end_gps: Some(ROUTE_END.to_owned()),
                        ..RouteDraft::default()
                    })
                    .expect("route draft"),
                )
                .await
                .expect("register route");
            (route.route_id().clone(), equipment.eqp_id().clone())
        });

        let movements = MovementService::new(
            MovementStores {
                movements: Arc::clone(&store),
                routes: Arc::clone(&store),
                equipment: Arc::clone(&store),
                labels: Arc::clone(&store),
            },
            settings,
            Arc::new(NoOpMovementMetrics),
            clock,
        );

        self.services.set(Services {
            movements: Arc::new(movements),
            query: Arc::new(MovementQueryService::new(store)),
            route_id,
            eqp_id,
        });
        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.next_sample.set(1);
    }

    fn services(&self) -> Services {
        self.services.get().expect("services should be started")
    }

    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.get().expect("runtime").0.block_on(future)
    }

    fn tagged_batch(&self, count: usize, tag: u8) -> Vec<Value> {
        let first = self.next_sample.get().unwrap_or(1);
        self.next_sample.set(first + count);
        tagged_samples("bdd", first, &vec![tag; count])
    }

    fn submit_with(&self, samples: Vec<Value>, group: GroupSelector, route_id: Option<RouteId>) {
        let services = self.services();
        let mut request = SubmitMovementRequest::new(
            route_id.unwrap_or_else(|| services.route_id.clone()),
            services.eqp_id.clone(),
            samples.clone(),
        );
        request.group = group;
        let result = self.block_on(services.movements.submit(request));
        self.last_batch.set(samples);
        self.last_result.set(result);
    }

    fn submit(&self, samples: Vec<Value>) {
        self.submit_with(samples, GroupSelector::Auto, None);
    }

    fn complete_cycles(&self, cycles: u32, group: &GroupSelector) {
        for _ in 0..cycles {
            let batch = self.tagged_batch(2, 2);
            self.submit_with(batch, group.clone(), None);
            let written = self.written();
            assert!(written.created, "each completed batch should open a cycle");
            assert_eq!(written.status, CycleStatus::Completed);
        }
    }

    fn written(&self) -> CycleWriteResult {
        match self.last_result.get().expect("a submission should have run") {
            Ok(result) => result,
            Err(err) => panic!("expected a successful write, got {err:?}"),
        }
    }

    fn stored_cycle(&self, group_no: u32, cycle_number: u32) -> Vec<Value> {
        let services = self.services();
        let cycle = self
            .block_on(services.query.get_cycle(
                services.route_id.clone(),
                services.eqp_id.clone(),
                CycleKey::new(group_no, cycle_number),
            ))
            .expect("stored cycle");
        assert_eq!(cycle.key(), CycleKey::new(group_no, cycle_number));
        cycle
            .samples()
            .map(|sample| Value::Object(sample.as_object().clone()))
            .collect()
    }
}

#[fixture]
fn world() -> MovementWorld {
    MovementWorld::default()
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("registered equipment on a route")]
fn registered_equipment(world: &MovementWorld) {
    world.start(MovementSettings::default());
}

#[given("registered equipment on a route with {slots} slots of {capacity} samples")]
fn registered_equipment_with_layout(world: &MovementWorld, slots: usize, capacity: usize) {
    let layout = SlotLayout::new(slots, capacity).expect("slot layout");
    let settings =
        MovementSettings::new(layout, DEFAULT_MAX_CYCLES_PER_GROUP, StatusStrategy::TypeTag)
            .expect("settings");
    world.start(settings);
}

#[given("registered equipment on a route with {max} cycles per group")]
fn registered_equipment_with_cap(world: &MovementWorld, max: u32) {
    let settings = MovementSettings::new(SlotLayout::default(), max, StatusStrategy::TypeTag)
        .expect("settings");
    world.start(settings);
}

#[given("registered equipment on a route checked by GPS markers")]
fn registered_equipment_gps(world: &MovementWorld) {
    let settings = MovementSettings::default().with_status_strategy(StatusStrategy::GpsMatching {
        tolerance: DEFAULT_GPS_TOLERANCE,
    });
    world.start(settings);
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("{count} samples tagged {tag} are submitted")]
fn tagged_samples_are_submitted(world: &MovementWorld, count: usize, tag: u8) {
    let batch = world.tagged_batch(count, tag);
    world.submit(batch);
}

#[when("{count} untagged samples are submitted")]
fn untagged_samples_are_submitted(world: &MovementWorld, count: usize) {
    world.submit(bulk_samples(count));
}

#[when("{count} samples tagged {tag} are submitted to group {group_no}")]
fn tagged_samples_are_submitted_to_group(
    world: &MovementWorld,
    count: usize,
    tag: u8,
    group_no: u32,
) {
    let batch = world.tagged_batch(count, tag);
    world.submit_with(batch, GroupSelector::Number(group_no), None);
}

#[when("{count} samples tagged {tag} are submitted under label {label}")]
fn tagged_samples_are_submitted_under_label(
    world: &MovementWorld,
    count: usize,
    tag: u8,
    label: String,
) {
    let label = GroupLabel::new(label).expect("group label");
    let batch = world.tagged_batch(count, tag);
    world.submit_with(batch, GroupSelector::Label(label), None);
}

#[when("{cycles} cycles are completed")]
fn cycles_are_completed(world: &MovementWorld, cycles: u32) {
    world.complete_cycles(cycles, &GroupSelector::Auto);
}

#[when("{cycles} cycles are completed in group {group_no}")]
fn cycles_are_completed_in_group(world: &MovementWorld, cycles: u32, group_no: u32) {
    world.complete_cycles(cycles, &GroupSelector::Number(group_no));
}

#[when("{cycles} cycles are completed under label {label}")]
fn cycles_are_completed_under_label(world: &MovementWorld, cycles: u32, label: String) {
    let label = GroupLabel::new(label).expect("group label");
    world.complete_cycles(cycles, &GroupSelector::Label(label));
}

#[when("the same samples are submitted again")]
fn the_same_samples_are_submitted_again(world: &MovementWorld) {
    let batch = world.last_batch.get().expect("an earlier batch");
    world.submit(batch);
}

#[when("samples are submitted under group label {label}")]
fn samples_are_submitted_under_label(world: &MovementWorld, label: String) {
    let label = GroupLabel::new(label).expect("group label");
    let batch = world.tagged_batch(2, 1);
    world.submit_with(batch, GroupSelector::Label(label), None);
    let written = world.written();
    let mut labelled = world.labelled.get().unwrap_or_default();
    labelled.push(written);
    world.labelled.set(labelled);
}

#[when("a sample marking the route end is submitted")]
fn a_sample_marking_the_route_end_is_submitted(world: &MovementWorld) {
    world.submit(vec![json!({
        "sample_id": "end-1",
        "start_gps": ROUTE_START,
        "end_gps": ROUTE_END,
    })]);
}

#[when("samples are submitted for route {route_id}")]
fn samples_are_submitted_for_route(world: &MovementWorld, route_id: String) {
    let route_id = RouteId::new(route_id).expect("route id");
    let batch = world.tagged_batch(1, 1);
    world.submit_with(batch, GroupSelector::Auto, Some(route_id));
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the write created cycle {cycle_number} of group {group_no}")]
fn the_write_created_cycle(world: &MovementWorld, cycle_number: u32, group_no: u32) {
    let written = world.written();
    assert!(written.created, "expected a new cycle, got an append");
    assert_eq!(
        (written.group_no, written.cycle_number),
        (group_no, cycle_number)
    );
}

#[then("the write appended to cycle {cycle_number} of group {group_no}")]
fn the_write_appended_to_cycle(world: &MovementWorld, cycle_number: u32, group_no: u32) {
    let written = world.written();
    assert!(!written.created, "expected an append, got a new cycle");
    assert_eq!(
        (written.group_no, written.cycle_number),
        (group_no, cycle_number)
    );
}

#[then("the write carries label {label}")]
fn the_write_carries_label(world: &MovementWorld, label: String) {
    let written = world.written();
    assert_eq!(
        written.group_label.as_ref().map(GroupLabel::as_str),
        Some(label.as_str())
    );
}

#[then("the cycle status is {status}")]
fn the_cycle_status_is(world: &MovementWorld, status: String) {
    let expected: CycleStatus = status.parse().expect("known status");
    assert_eq!(world.written().status, expected);
}

#[then("the stored cycle {cycle_number} of group {group_no} is completed")]
fn the_stored_cycle_is_completed(world: &MovementWorld, cycle_number: u32, group_no: u32) {
    let services = world.services();
    let cycle = world
        .block_on(services.query.get_cycle(
            services.route_id.clone(),
            services.eqp_id.clone(),
            CycleKey::new(group_no, cycle_number),
        ))
        .expect("stored cycle");
    assert_eq!(cycle.status(), CycleStatus::Completed);
    assert!(cycle.end_time().is_some());
}

#[then("the write reported {count} duplicate samples")]
fn the_write_reported_duplicates(world: &MovementWorld, count: usize) {
    let written = world.written();
    assert!(!written.created);
    assert_eq!(written.duplicate_samples, count);
    assert_eq!(written.new_samples, 0);
}

#[then("the stored cycle {cycle_number} of group {group_no} holds {count} samples")]
fn the_stored_cycle_holds(world: &MovementWorld, cycle_number: u32, group_no: u32, count: usize) {
    assert_eq!(world.stored_cycle(group_no, cycle_number).len(), count);
}

#[then("the write dropped {count} samples")]
fn the_write_dropped(world: &MovementWorld, count: usize) {
    let written = world.written();
    assert!(written.capacity_exceeded);
    assert_eq!(written.dropped_samples, count);
}

#[then("both labelled writes share one group")]
fn both_labelled_writes_share_one_group(world: &MovementWorld) {
    let labelled = world.labelled.get().expect("labelled writes");
    let [first, second] = labelled.as_slice() else {
        panic!("expected two labelled writes, got {}", labelled.len());
    };
    assert_eq!(first.group_no, second.group_no);
    assert!(first.created);
    assert!(!second.created);
    assert_eq!(
        second.group_label.as_ref().map(GroupLabel::as_str),
        Some("night-shift")
    );
}

#[then("the submission fails as not found")]
fn the_submission_fails_as_not_found(world: &MovementWorld) {
    match world.last_result.get().expect("a submission should have run") {
        Ok(result) => panic!("expected rejection, got {result:?}"),
        Err(err) => assert_eq!(err.code(), ErrorCode::NotFound),
    }
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "First submission opens the first cycle"
)]
fn first_submission_opens_the_first_cycle(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "A completed cycle hands over to the next cycle"
)]
fn a_completed_cycle_hands_over(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "Resubmitted samples are stored once"
)]
fn resubmitted_samples_are_stored_once(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "Samples beyond slot capacity are dropped"
)]
fn samples_beyond_capacity_are_dropped(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "A group label keeps pointing at its group"
)]
fn a_group_label_keeps_its_group(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "GPS markers complete a cycle"
)]
fn gps_markers_complete_a_cycle(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "Submissions for an unknown route are rejected"
)]
fn submissions_for_unknown_route_are_rejected(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "A full group hands over to a new group"
)]
fn a_full_group_hands_over(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "A full numbered group moves past groups already in use"
)]
fn a_full_numbered_group_moves_on(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "A full labelled group takes its label to a new group"
)]
fn a_full_labelled_group_moves_its_label(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "Two labels never share a group"
)]
fn two_labels_never_share_a_group(world: MovementWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/movement_cycles.feature",
    name = "A completion marker beyond capacity still completes the cycle"
)]
fn a_completion_marker_beyond_capacity(world: MovementWorld) {
    let _ = world;
}
