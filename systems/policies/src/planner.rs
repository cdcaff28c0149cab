use button_maze_core::{Cell, Delta, Step};
use button_maze_engine::{Policy, PolicyFault};
use button_maze_system_movement::{next_step, shortest_path};
use button_maze_system_toggle_planner::plan;
use button_maze_world::{query, GridWorld, Traversable};
use tracing::{debug, warn};

use crate::after_press;

/// Racer that replans its button presses every tick.
///
/// The toggle plan is recomputed from the current position on the world the
/// move will be validated against. While colours remain to be pressed the
/// racer walks to the nearest button of the next colour, preferring routes
/// that do not cross other buttons, since leaving a button cell presses it.
/// With an empty plan it walks straight to the target.
///
/// When the next colour is the button underfoot the racer stays put, pressing
/// it a second time, but only if the unpressed world has a plan of its own.
/// Otherwise it walks on toward another button of that colour.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlannerPolicy;

impl PlannerPolicy {
    /// Creates the planner racer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn choose(position: Cell, world: &GridWorld) -> Step {
        let effective = after_press(world, position);
        let colors = match plan(&effective, position) {
            Ok(colors) => colors,
            Err(error) => {
                warn!(%position, %error, "no plan reaches the target, holding position");
                return Step::Stay;
            }
        };
        debug!(%position, presses = colors.len(), "replanned");

        let Some(&next_color) = colors.first() else {
            return step_toward(&effective, position, effective.target()).unwrap_or(Step::Stay);
        };

        if world.button_color_at(position) == Some(next_color) {
            match plan(world, position) {
                Ok(unpressed) if unpressed.first() != Some(&next_color) => return Step::Stay,
                _ => debug!(
                    %position,
                    color = next_color.get(),
                    "pressing again does not help, walking on"
                ),
            }
        }

        let route = query::button_cells(&effective, Some(next_color))
            .into_iter()
            .filter(|cell| *cell != position)
            .filter_map(|button| route_avoiding_buttons(&effective, position, button))
            .min_by_key(Vec::len);
        match route.as_deref() {
            Some([_, next, ..]) => Step::between(position, *next).unwrap_or(Step::Stay),
            _ => {
                warn!(%position, color = next_color.get(), "planned button is out of reach");
                Step::Stay
            }
        }
    }
}

impl Policy for PlannerPolicy {
    fn decide(&mut self, position: Cell, world: &GridWorld) -> Result<Delta, PolicyFault> {
        Ok(Self::choose(position, world).delta())
    }
}

fn step_toward(world: &GridWorld, position: Cell, goal: Cell) -> Option<Step> {
    next_step(&AvoidingButtons { world, goal }, position, goal)
        .or_else(|| next_step(world, position, goal))
}

/// Shortest route that only steps on a button when it is the goal, falling
/// back to any shortest route.
fn route_avoiding_buttons(world: &GridWorld, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    let avoiding = AvoidingButtons { world, goal };
    shortest_path(&avoiding, start, goal).or_else(|| shortest_path(world, start, goal))
}

struct AvoidingButtons<'a> {
    world: &'a GridWorld,
    goal: Cell,
}

impl Traversable for AvoidingButtons<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.world.dimensions()
    }

    fn is_traversable(&self, cell: Cell) -> bool {
        self.world.is_traversable(cell)
            && (cell == self.goal || self.world.button_color_at(cell).is_none())
    }
}
