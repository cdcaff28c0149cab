use std::collections::VecDeque;

use button_maze_core::{Cell, Delta, Step};
use button_maze_engine::{Policy, PolicyFault};
use button_maze_world::GridWorld;

/// Racer that replays a recorded move history, then stays put.
#[derive(Clone, Debug, Default)]
pub struct ReplayPolicy {
    remaining: VecDeque<Step>,
}

impl ReplayPolicy {
    /// Creates a racer that will issue `history` in order.
    #[must_use]
    pub fn new(history: impl IntoIterator<Item = Step>) -> Self {
        Self {
            remaining: history.into_iter().collect(),
        }
    }

    /// Number of recorded moves not yet issued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Policy for ReplayPolicy {
    fn decide(&mut self, _position: Cell, _world: &GridWorld) -> Result<Delta, PolicyFault> {
        Ok(self.remaining.pop_front().unwrap_or(Step::Stay).delta())
    }
}
