#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based race engine for the button maze.
//!
//! The [`Engine`] owns a private copy of the track, hands the policy a
//! read-only view of it every tick, validates and applies the returned move,
//! presses the button the agent is leaving, and tracks time, progress and
//! termination. Every terminal status is final: once reached, the history is
//! frozen and further ticks report the same outcome.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

use button_maze_core::{Cell, DnfReason, RunStatus, Step};
use button_maze_world::{GridWorld, Traversable};
use tracing::{debug, info};

mod config;
mod policy;

pub use config::EngineConfig;
pub use policy::{Policy, PolicyFault};

const ONGOING_MESSAGE: &str = "Still racing.";

/// Status and human-readable explanation produced by a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Status of the run after the tick.
    pub status: RunStatus,
    /// Explanation of the status.
    pub message: String,
}

impl TickOutcome {
    fn new(status: RunStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Final result of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Terminal status.
    pub status: RunStatus,
    /// Explanation of the terminal status.
    pub message: String,
    /// Every applied move in order.
    pub history: Vec<Step>,
}

/// Turn-based state machine driving a single policy through a track.
#[derive(Debug)]
pub struct Engine<P> {
    policy: P,
    world: GridWorld,
    config: EngineConfig,
    position: Cell,
    remaining: Duration,
    best_distance: Option<u32>,
    stall_counter: u32,
    history: Vec<Step>,
    terminal: Option<TickOutcome>,
}

impl<P: Policy> Engine<P> {
    /// Prepares a run on a private copy of `template`, starting at its spawn.
    #[must_use]
    pub fn new(policy: P, template: &GridWorld, config: EngineConfig) -> Self {
        Self {
            policy,
            world: template.clone(),
            config,
            position: template.spawn(),
            remaining: config.time_budget,
            best_distance: None,
            stall_counter: 0,
            history: Vec::new(),
            terminal: None,
        }
    }

    /// Advances the run by one decision.
    ///
    /// After a terminal status the policy is no longer consulted and the
    /// frozen outcome is returned again.
    pub fn tick(&mut self) -> TickOutcome {
        if let Some(outcome) = &self.terminal {
            return outcome.clone();
        }

        let outcome = self.resolve_tick();
        debug!(
            tick = self.history.len(),
            row = self.position.row(),
            column = self.position.column(),
            remaining_ms = u64::try_from(self.remaining.as_millis()).unwrap_or(u64::MAX),
            stall = self.stall_counter,
            "tick resolved"
        );
        if outcome.status.is_terminal() {
            info!(status = ?outcome.status, steps = self.history.len(), "{}", outcome.message);
            self.terminal = Some(outcome.clone());
        }
        outcome
    }

    /// Ticks until the run ends.
    pub fn run_to_completion(&mut self) -> RunReport {
        let mut outcome = TickOutcome::new(RunStatus::Ongoing, "Just started.");
        while !outcome.status.is_terminal() {
            outcome = self.tick();
        }
        RunReport {
            status: outcome.status,
            message: outcome.message,
            history: self.history.clone(),
        }
    }

    fn resolve_tick(&mut self) -> TickOutcome {
        let started = Instant::now();
        let policy = &mut self.policy;
        let world = &self.world;
        let position = self.position;
        let decision = panic::catch_unwind(AssertUnwindSafe(|| policy.decide(position, world)));
        let elapsed = started.elapsed();

        let delta = match decision {
            Ok(Ok(delta)) => delta,
            Ok(Err(fault)) => return crashed(fault.message()),
            Err(payload) => return crashed(&panic_message(payload.as_ref())),
        };

        let Some(remaining) = self.remaining.checked_sub(elapsed) else {
            self.remaining = Duration::ZERO;
            return dnf(DnfReason::Timeout, "Timed Out");
        };
        self.remaining =
            remaining.saturating_add(elapsed.min(self.config.per_tick_allowance));

        let Some(step) = Step::from_delta(delta) else {
            return dnf(
                DnfReason::IllegalMove,
                format!("Racer made illegal move {delta}!"),
            );
        };

        if let Some(color) = self.world.button_color_at(self.position) {
            debug!(color = color.get(), "button pressed");
            self.world.toggle(color);
        }

        self.position = self.position.offset(step.delta());

        if !self.world.contains(self.position) {
            return dnf(DnfReason::OutOfBounds, "Racer went out of bounds!");
        }
        if !self.world.is_traversable(self.position) {
            return dnf(DnfReason::Collision, "Racer crashed into a wall!");
        }

        let distance = self.position.manhattan_distance(self.world.target());
        if self.best_distance.map_or(true, |best| distance < best) {
            self.best_distance = Some(distance);
            self.stall_counter = 0;
        } else {
            self.stall_counter = self.stall_counter.saturating_add(1);
            if self.stall_counter >= self.config.stall_limit {
                return dnf(
                    DnfReason::Stalled,
                    format!("Racer spent {} ticks dawdling!", self.stall_counter),
                );
            }
        }

        self.history.push(step);
        if self.position == self.world.target() {
            return TickOutcome::new(
                RunStatus::Finished,
                format!(
                    "Racer made it to the finish line in {} steps!",
                    self.history.len()
                ),
            );
        }

        TickOutcome::new(RunStatus::Ongoing, ONGOING_MESSAGE)
    }

    /// Agent's current cell.
    #[must_use]
    pub const fn position(&self) -> Cell {
        self.position
    }

    /// The engine's private world, including every toggle applied so far.
    #[must_use]
    pub const fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Decision time left in the budget.
    #[must_use]
    pub const fn remaining_budget(&self) -> Duration {
        self.remaining
    }

    /// Smallest distance to the target observed so far, if any tick moved.
    #[must_use]
    pub const fn best_distance(&self) -> Option<u32> {
        self.best_distance
    }

    /// Consecutive ticks without strict progress toward the target.
    #[must_use]
    pub const fn stall_counter(&self) -> u32 {
        self.stall_counter
    }

    /// Applied moves in order.
    #[must_use]
    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// Current status of the run.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.terminal
            .as_ref()
            .map_or(RunStatus::Ongoing, |outcome| outcome.status)
    }

    /// Configuration the run was started with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn dnf(reason: DnfReason, message: impl Into<String>) -> TickOutcome {
    TickOutcome::new(RunStatus::DidNotFinish(reason), message)
}

fn crashed(diagnostic: &str) -> TickOutcome {
    dnf(
        DnfReason::PolicyCrashed,
        format!("Racer crashed with the following error message:\n{diagnostic}"),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "policy panicked".to_owned()
    }
}
