#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Racers that can be plugged into the engine.
//!
//! Every racer sees the world as it stands at the start of the tick. The
//! engine presses the button under the agent before applying any move, so
//! racers that reason about the next cell first derive the configuration the
//! move will actually be checked against.

mod planner;
mod random;
mod replay;

use button_maze_core::{Cell, Delta, Step};
use button_maze_engine::{Policy, PolicyFault};
use button_maze_world::GridWorld;

pub use planner::PlannerPolicy;
pub use random::RandomPolicy;
pub use replay::ReplayPolicy;

/// Racer that never moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StayPolicy;

impl Policy for StayPolicy {
    fn decide(&mut self, _position: Cell, _world: &GridWorld) -> Result<Delta, PolicyFault> {
        Ok(Step::Stay.delta())
    }
}

/// World the engine validates this tick's move against: the snapshot with
/// the button under `position`, if any, already pressed.
pub(crate) fn after_press(world: &GridWorld, position: Cell) -> GridWorld {
    let mut effective = world.clone();
    if let Some(color) = world.button_color_at(position) {
        effective.toggle(color);
    }
    effective
}
