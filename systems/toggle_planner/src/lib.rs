#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Search over toggle-configurations that makes the target reachable.
//!
//! A planning state is the set of wall colours flipped relative to the
//! snapshot being planned on. The agent's position is deliberately not part
//! of the state: reachability is always recomputed from the agent's current
//! cell, which bounds the state space by `2^colours`. States are explored
//! depth-first from a stack and deduplicated by configuration, so every
//! configuration is expanded at most once and the search always terminates.
//!
//! The plan is feasible, not necessarily the shortest button sequence.

use std::collections::{BTreeSet, HashSet};

use button_maze_core::{Cell, WallColor};
use button_maze_system_movement::shortest_path;
use button_maze_world::{query, reachable_from, GridWorld, ToggleSet, ToggledView};
use thiserror::Error;
use tracing::{debug, trace};

/// Reasons planning fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlanError {
    /// No reachable sequence of button presses opens a route to the target.
    #[error("target is unreachable after exploring {explored} toggle-configurations")]
    Unreachable {
        /// Number of configurations whose reachability was evaluated.
        explored: usize,
    },
}

/// Finds colours to press, in order, so that the target becomes reachable
/// from `position`.
///
/// An empty plan means the target is already reachable. The snapshot is
/// never mutated, so the function may be called every tick.
///
/// Colours without walls are never pressed. The button under `position` is
/// tried after every other reachable colour.
pub fn plan(world: &GridWorld, position: Cell) -> Result<Vec<WallColor>, PlanError> {
    let target = world.target();
    let productive = query::wall_colors(world);
    let underfoot = world.button_color_at(position);
    let mut arena = vec![Node {
        toggles: ToggleSet::new(),
        parent: None,
        pressed: None,
    }];
    let mut visited: HashSet<ToggleSet> = HashSet::new();
    let _ = visited.insert(ToggleSet::new());
    let mut frontier = vec![0_usize];
    let mut explored = 0_usize;

    while let Some(node_id) = frontier.pop() {
        explored += 1;
        let toggles = arena[node_id].toggles.clone();
        let view = ToggledView::new(world, &toggles);

        if shortest_path(&view, position, target).is_some() {
            let colors = reconstruct(&arena, node_id);
            debug!(
                explored,
                presses = colors.len(),
                "toggle plan found"
            );
            return Ok(colors);
        }

        let reachability = reachable_from(&view, position);
        assert!(
            !reachability.contains(target),
            "flood fill reached the target although no path was found"
        );

        let mut colors = reachable_button_colors(world, reachability.cells(), &productive);
        if let Some(index) = underfoot.and_then(|held| colors.iter().position(|&c| c == held)) {
            colors[index..].rotate_left(1);
        }
        for color in colors.into_iter().rev() {
            let child = toggles.flipped(color);
            if !visited.insert(child.clone()) {
                continue;
            }
            trace!(
                parent = node_id,
                color = color.get(),
                flipped = child.len(),
                "queue configuration"
            );
            arena.push(Node {
                toggles: child,
                parent: Some(node_id),
                pressed: Some(color),
            });
            frontier.push(arena.len() - 1);
        }
    }

    debug!(explored, "toggle planning exhausted");
    Err(PlanError::Unreachable { explored })
}

#[derive(Clone, Debug)]
struct Node {
    toggles: ToggleSet,
    parent: Option<usize>,
    pressed: Option<WallColor>,
}

/// Distinct button colours among the reached cells that also colour some
/// wall, nearest first.
fn reachable_button_colors(
    world: &GridWorld,
    reached: &[Cell],
    productive: &BTreeSet<WallColor>,
) -> Vec<WallColor> {
    let mut colors = Vec::new();
    for cell in reached {
        if let Some(color) = world.button_color_at(*cell) {
            if productive.contains(&color) && !colors.contains(&color) {
                colors.push(color);
            }
        }
    }
    colors
}

fn reconstruct(arena: &[Node], goal: usize) -> Vec<WallColor> {
    let mut colors = Vec::new();
    let mut cursor = Some(goal);
    while let Some(node_id) = cursor {
        let node = &arena[node_id];
        colors.extend(node.pressed);
        cursor = node.parent;
    }
    colors.reverse();
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reachable_colors_are_deduplicated_in_discovery_order() {
        let mut world = GridWorld::blank(1, 4).expect("blank world");
        world
            .set_button(Cell::new(0, 1), WallColor::new(3))
            .expect("button");
        world
            .set_button(Cell::new(0, 2), WallColor::new(2))
            .expect("button");
        world
            .set_button(Cell::new(0, 3), WallColor::new(3))
            .expect("button");
        let reached = [
            Cell::new(0, 0),
            Cell::new(0, 1),
            Cell::new(0, 2),
            Cell::new(0, 3),
        ];
        let productive: BTreeSet<WallColor> =
            [WallColor::new(2), WallColor::new(3)].into_iter().collect();

        assert_eq!(
            reachable_button_colors(&world, &reached, &productive),
            vec![WallColor::new(3), WallColor::new(2)]
        );
    }

    #[test]
    fn colors_without_walls_are_not_candidates() {
        let mut world = GridWorld::blank(1, 3).expect("blank world");
        world
            .set_button(Cell::new(0, 1), WallColor::new(6))
            .expect("button");
        world
            .set_button(Cell::new(0, 2), WallColor::new(2))
            .expect("button");
        let reached = [Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)];
        let productive: BTreeSet<WallColor> = [WallColor::new(2)].into_iter().collect();

        assert_eq!(
            reachable_button_colors(&world, &reached, &productive),
            vec![WallColor::new(2)]
        );
    }

    #[test]
    fn reconstruct_walks_parent_links() {
        let arena = vec![
            Node {
                toggles: ToggleSet::new(),
                parent: None,
                pressed: None,
            },
            Node {
                toggles: [WallColor::new(4)].into_iter().collect(),
                parent: Some(0),
                pressed: Some(WallColor::new(4)),
            },
            Node {
                toggles: [WallColor::new(4), WallColor::new(2)].into_iter().collect(),
                parent: Some(1),
                pressed: Some(WallColor::new(2)),
            },
        ];

        assert_eq!(
            reconstruct(&arena, 2),
            vec![WallColor::new(4), WallColor::new(2)]
        );
        assert!(reconstruct(&arena, 0).is_empty());
    }
}
