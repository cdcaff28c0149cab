use std::{
    cell::Cell as Counter,
    collections::VecDeque,
    rc::Rc,
    thread,
    time::Duration,
};

use button_maze_core::{Cell, Delta, DnfReason, RunStatus, Step, WallColor};
use button_maze_engine::{Engine, EngineConfig, PolicyFault};
use button_maze_world::{GridWorld, Traversable};

const BLACK: WallColor = WallColor::new(1);
const RED: WallColor = WallColor::new(2);

fn corridor(columns: u32) -> GridWorld {
    GridWorld::blank(1, columns).expect("blank world")
}

fn scripted(steps: Vec<Step>) -> impl FnMut(Cell, &GridWorld) -> Result<Delta, PolicyFault> {
    let mut queue: VecDeque<Step> = steps.into();
    move |_position: Cell, _world: &GridWorld| Ok(queue.pop_front().unwrap_or(Step::Stay).delta())
}

fn config_with_stall_limit(stall_limit: u32) -> EngineConfig {
    EngineConfig {
        stall_limit,
        ..EngineConfig::default()
    }
}

#[test]
fn reaching_target_finishes_with_matching_history() {
    let track = corridor(3);
    let mut engine = Engine::new(
        scripted(vec![Step::East, Step::East]),
        &track,
        EngineConfig::default(),
    );

    let first = engine.tick();
    assert_eq!(first.status, RunStatus::Ongoing);
    assert_eq!(first.message, "Still racing.");

    let second = engine.tick();
    assert_eq!(second.status, RunStatus::Finished);
    assert_eq!(second.message, "Racer made it to the finish line in 2 steps!");
    assert_eq!(engine.history(), &[Step::East, Step::East]);
    assert_eq!(engine.position(), track.target());
}

#[test]
fn run_to_completion_reports_history() {
    let track = GridWorld::blank(2, 2).expect("blank world");
    let mut engine = Engine::new(
        scripted(vec![Step::South, Step::East]),
        &track,
        EngineConfig::default(),
    );

    let report = engine.run_to_completion();

    assert_eq!(report.status, RunStatus::Finished);
    assert_eq!(report.history, vec![Step::South, Step::East]);
    assert_eq!(report.history.len(), 2);
}

#[test]
fn non_unit_delta_is_illegal() {
    let track = corridor(3);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| Ok(Delta::new(1, 1)),
        &track,
        EngineConfig::default(),
    );

    let outcome = engine.tick();

    assert_eq!(outcome.status, RunStatus::DidNotFinish(DnfReason::IllegalMove));
    assert_eq!(outcome.message, "Racer made illegal move (1, 1)!");
    assert!(engine.history().is_empty());
}

#[test]
fn leaving_the_grid_is_out_of_bounds() {
    let track = corridor(3);
    let mut engine = Engine::new(scripted(vec![Step::North]), &track, EngineConfig::default());

    let outcome = engine.tick();

    assert_eq!(outcome.status, RunStatus::DidNotFinish(DnfReason::OutOfBounds));
    assert_eq!(outcome.message, "Racer went out of bounds!");
}

#[test]
fn entering_active_wall_is_a_collision() {
    let mut track = corridor(3);
    track.set_wall(Cell::new(0, 1), BLACK, true).expect("wall");
    let mut engine = Engine::new(scripted(vec![Step::East]), &track, EngineConfig::default());

    let outcome = engine.tick();

    assert_eq!(outcome.status, RunStatus::DidNotFinish(DnfReason::Collision));
    assert_eq!(outcome.message, "Racer crashed into a wall!");
}

#[test]
fn policy_fault_crashes_the_run() {
    let track = corridor(3);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| Err(PolicyFault::new("lost the map")),
        &track,
        EngineConfig::default(),
    );

    let outcome = engine.tick();

    assert_eq!(
        outcome.status,
        RunStatus::DidNotFinish(DnfReason::PolicyCrashed)
    );
    assert!(
        outcome.message.ends_with("lost the map"),
        "diagnostic missing from {:?}",
        outcome.message
    );
}

#[test]
fn policy_panic_crashes_the_run() {
    let track = corridor(3);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| -> Result<Delta, PolicyFault> {
            panic!("steering column snapped")
        },
        &track,
        EngineConfig::default(),
    );

    let outcome = engine.tick();

    assert_eq!(
        outcome.status,
        RunStatus::DidNotFinish(DnfReason::PolicyCrashed)
    );
    assert!(outcome.message.contains("steering column snapped"));
}

#[test]
fn slow_decision_exhausts_budget() {
    let track = corridor(3);
    let config = EngineConfig::new(Duration::from_millis(5), Duration::from_millis(5), 100);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| {
            thread::sleep(Duration::from_millis(30));
            Ok(Step::East.delta())
        },
        &track,
        config,
    );

    let outcome = engine.tick();

    assert_eq!(outcome.status, RunStatus::DidNotFinish(DnfReason::Timeout));
    assert_eq!(outcome.message, "Timed Out");
    assert_eq!(engine.position(), track.spawn(), "timed-out move must not apply");
}

#[test]
fn per_tick_allowance_is_credited_back() {
    let track = corridor(10);
    let config = EngineConfig::new(Duration::from_millis(200), Duration::from_millis(200), 100);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| {
            thread::sleep(Duration::from_millis(60));
            Ok(Step::Stay.delta())
        },
        &track,
        config,
    );

    for tick in 0..5 {
        let outcome = engine.tick();
        assert_eq!(
            outcome.status,
            RunStatus::Ongoing,
            "tick {tick} should be covered by the allowance"
        );
    }
    assert!(engine.remaining_budget() <= Duration::from_millis(200));
    assert_eq!(engine.config(), &config);
}

#[test]
fn untimed_run_never_runs_out_of_budget() {
    let track = corridor(3);
    let mut engine = Engine::new(
        scripted(vec![Step::East, Step::East]),
        &track,
        EngineConfig::untimed(10),
    );

    let report = engine.run_to_completion();

    assert_eq!(report.status, RunStatus::Finished, "{}", report.message);
    assert!(engine.remaining_budget() > Duration::from_secs(u64::MAX / 2));
}

#[test]
fn without_allowance_budget_drains() {
    let track = corridor(10);
    let config = EngineConfig::new(Duration::from_millis(200), Duration::ZERO, 100);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| {
            thread::sleep(Duration::from_millis(60));
            Ok(Step::Stay.delta())
        },
        &track,
        config,
    );

    let mut status = RunStatus::Ongoing;
    for _ in 0..4 {
        status = engine.tick().status;
        if status.is_terminal() {
            break;
        }
    }

    assert_eq!(status, RunStatus::DidNotFinish(DnfReason::Timeout));
}

#[test]
fn stall_limit_counts_consecutive_non_improving_ticks() {
    let limit = 3;
    let track = corridor(5);
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| Ok(Step::Stay.delta()),
        &track,
        config_with_stall_limit(limit),
    );

    // The first tick always improves on the initial unbounded best distance.
    assert_eq!(engine.tick().status, RunStatus::Ongoing);
    for expected in 1..limit {
        assert_eq!(engine.tick().status, RunStatus::Ongoing);
        assert_eq!(engine.stall_counter(), expected);
    }

    let outcome = engine.tick();
    assert_eq!(outcome.status, RunStatus::DidNotFinish(DnfReason::Stalled));
    assert_eq!(outcome.message, "Racer spent 3 ticks dawdling!");
}

#[test]
fn strict_improvement_resets_stall_counter() {
    let track = corridor(6);
    let mut engine = Engine::new(
        scripted(vec![
            Step::East,
            Step::West,
            Step::East,
            Step::East,
            Step::West,
            Step::East,
            Step::West,
        ]),
        &track,
        config_with_stall_limit(3),
    );

    let statuses: Vec<(RunStatus, u32)> = (0..6)
        .map(|_| {
            let status = engine.tick().status;
            (status, engine.stall_counter())
        })
        .collect();

    assert_eq!(
        statuses,
        vec![
            (RunStatus::Ongoing, 0),
            (RunStatus::Ongoing, 1),
            (RunStatus::Ongoing, 2),
            (RunStatus::Ongoing, 0),
            (RunStatus::Ongoing, 1),
            (RunStatus::Ongoing, 2),
        ]
    );
    assert_eq!(
        engine.tick().status,
        RunStatus::DidNotFinish(DnfReason::Stalled)
    );
}

#[test]
fn button_is_pressed_when_leaving_its_cell() {
    let mut track = corridor(4);
    track.set_button(Cell::new(0, 1), RED).expect("button");
    track.set_wall(Cell::new(0, 2), RED, true).expect("wall");
    let mut engine = Engine::new(
        scripted(vec![Step::East, Step::East, Step::East]),
        &track,
        EngineConfig::default(),
    );

    assert_eq!(engine.tick().status, RunStatus::Ongoing);
    assert!(
        !engine.world().is_traversable(Cell::new(0, 2)),
        "arriving on a button must not press it"
    );

    assert_eq!(engine.tick().status, RunStatus::Ongoing);
    assert!(engine.world().is_traversable(Cell::new(0, 2)));

    assert_eq!(engine.tick().status, RunStatus::Finished);
}

#[test]
fn staying_on_a_button_presses_it_every_tick() {
    let mut track = corridor(4);
    track.set_button(Cell::new(0, 0), RED).expect("button");
    track.set_wall(Cell::new(0, 2), RED, true).expect("wall");
    let mut engine = Engine::new(
        |_position: Cell, _world: &GridWorld| Ok(Step::Stay.delta()),
        &track,
        EngineConfig::default(),
    );

    let _ = engine.tick();
    assert!(engine.world().is_traversable(Cell::new(0, 2)));
    let _ = engine.tick();
    assert!(!engine.world().is_traversable(Cell::new(0, 2)));
}

#[test]
fn policy_sees_toggles_from_previous_ticks() {
    let mut track = corridor(4);
    track.set_button(Cell::new(0, 0), RED).expect("button");
    track.set_wall(Cell::new(0, 2), RED, true).expect("wall");
    let observed = Rc::new(Counter::new(0_u32));
    let seen = Rc::clone(&observed);
    let mut engine = Engine::new(
        move |_position: Cell, world: &GridWorld| {
            if world.is_traversable(Cell::new(0, 2)) {
                seen.set(seen.get() + 1);
            }
            Ok(Step::East.delta())
        },
        &track,
        EngineConfig::default(),
    );

    let report = engine.run_to_completion();

    assert_eq!(report.status, RunStatus::Finished);
    assert_eq!(report.history, vec![Step::East, Step::East, Step::East]);
    assert_eq!(observed.get(), 2, "the gate opens only after the first tick");
}

#[test]
fn terminal_outcome_is_frozen() {
    let track = corridor(2);
    let calls = Rc::new(Counter::new(0_u32));
    let counted = Rc::clone(&calls);
    let mut engine = Engine::new(
        move |_position: Cell, _world: &GridWorld| {
            counted.set(counted.get() + 1);
            Ok(Step::East.delta())
        },
        &track,
        EngineConfig::default(),
    );

    let finished = engine.tick();
    let repeated = engine.tick();

    assert_eq!(finished.status, RunStatus::Finished);
    assert_eq!(repeated, finished);
    assert_eq!(calls.get(), 1, "policy must not be consulted after the finish");
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.status(), RunStatus::Finished);
}

#[test]
fn runs_on_a_shared_template_do_not_interfere() {
    let mut track = corridor(4);
    track.set_button(Cell::new(0, 0), RED).expect("button");
    track.set_wall(Cell::new(0, 2), RED, true).expect("wall");
    let pristine = track.clone();

    let mut first = Engine::new(scripted(vec![Step::East]), &track, EngineConfig::default());
    let second = Engine::new(scripted(vec![Step::East]), &track, EngineConfig::default());
    let _ = first.tick();

    assert!(first.world().is_traversable(Cell::new(0, 2)));
    assert!(!second.world().is_traversable(Cell::new(0, 2)));
    assert_eq!(track, pristine);
}
