//! Decision capability implemented by racers.

use button_maze_core::{Cell, Delta};
use button_maze_world::GridWorld;
use thiserror::Error;

/// Failure reported by a policy while deciding.
///
/// The engine turns it into a crashed run, carrying the message as the
/// diagnostic text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PolicyFault {
    message: String,
}

impl PolicyFault {
    /// Creates a fault with the provided diagnostic.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Diagnostic text describing the fault.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Chooses one move per tick.
///
/// The world is a read-only snapshot of the engine's state at the start of
/// the tick. The returned delta is validated by the engine; anything other
/// than a unit step or staying put ends the run.
pub trait Policy {
    /// Decides the move for the agent standing on `position`.
    fn decide(&mut self, position: Cell, world: &GridWorld) -> Result<Delta, PolicyFault>;
}

impl<F> Policy for F
where
    F: FnMut(Cell, &GridWorld) -> Result<Delta, PolicyFault>,
{
    fn decide(&mut self, position: Cell, world: &GridWorld) -> Result<Delta, PolicyFault> {
        self(position, world)
    }
}
