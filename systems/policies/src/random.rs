use button_maze_core::{Cell, Delta, Step};
use button_maze_engine::{Policy, PolicyFault};
use button_maze_world::{GridWorld, Traversable};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::after_press;

const MOVES: [Step; 4] = [Step::North, Step::South, Step::East, Step::West];

/// Racer that wanders by picking a uniformly random safe step.
///
/// A step is safe when the cell it enters is on the grid and traversable
/// once the button under the agent has been pressed. The racer stays put
/// when no step is safe. Runs are reproducible for a given seed.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    /// Creates a racer whose choices are driven by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn decide(&mut self, position: Cell, world: &GridWorld) -> Result<Delta, PolicyFault> {
        let effective = after_press(world, position);
        let safe: Vec<Step> = MOVES
            .into_iter()
            .filter(|step| effective.is_traversable(position.offset(step.delta())))
            .collect();
        let step = safe.choose(&mut self.rng).copied().unwrap_or(Step::Stay);
        Ok(step.delta())
    }
}
