#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Point-to-point path planning over a fixed toggle-configuration.
//!
//! The planner runs a best-first search guided by the Manhattan distance,
//! which is admissible and consistent on a four-connected unit-cost grid, so
//! the first time the goal is popped its path is a shortest one. Queue ties
//! are broken by discovery order, making results reproducible.

use std::{cmp::Reverse, collections::BinaryHeap};

use button_maze_core::{Cell, Step};
use button_maze_world::Traversable;
use tracing::trace;

/// Finds a shortest path from `start` to `goal` through traversable cells.
///
/// The returned sequence begins with `start` and ends with `goal`. The start
/// cell itself is not required to be traversable, the agent already stands
/// there. Returns `None` when either endpoint lies off the grid or no path
/// exists.
#[must_use]
pub fn shortest_path<T>(grid: &T, start: Cell, goal: Cell) -> Option<Vec<Cell>>
where
    T: Traversable + ?Sized,
{
    let (rows, columns) = grid.dimensions();
    let workspace = Workspace::new(rows, columns)?;
    workspace.search(grid, start, goal)
}

/// First step along a shortest path toward `goal`.
///
/// Yields [`Step::Stay`] when the agent already stands on the goal and
/// `None` when the goal cannot be reached.
#[must_use]
pub fn next_step<T>(grid: &T, start: Cell, goal: Cell) -> Option<Step>
where
    T: Traversable + ?Sized,
{
    let path = shortest_path(grid, start, goal)?;
    match path.get(1) {
        Some(next) => Step::between(start, *next),
        None => Some(Step::Stay),
    }
}

#[derive(Debug)]
struct Workspace {
    rows: u32,
    columns: u32,
    costs: Vec<u32>,
    came_from: Vec<Option<Cell>>,
    closed: Vec<bool>,
}

impl Workspace {
    fn new(rows: u32, columns: u32) -> Option<Self> {
        let cell_count_u64 = u64::from(rows) * u64::from(columns);
        let cell_count = usize::try_from(cell_count_u64).ok()?;
        Some(Self {
            rows,
            columns,
            costs: vec![u32::MAX; cell_count],
            came_from: vec![None; cell_count],
            closed: vec![false; cell_count],
        })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let row = u32::try_from(cell.row()).ok()?;
        let column = u32::try_from(cell.column()).ok()?;
        if row >= self.rows || column >= self.columns {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        usize::try_from(row)
            .ok()?
            .checked_mul(width)?
            .checked_add(usize::try_from(column).ok()?)
    }

    fn search<T>(mut self, grid: &T, start: Cell, goal: Cell) -> Option<Vec<Cell>>
    where
        T: Traversable + ?Sized,
    {
        let start_index = self.index(start)?;
        let _ = self.index(goal)?;
        if start == goal {
            return Some(vec![start]);
        }

        let mut frontier = BinaryHeap::new();
        let mut sequence: u64 = 0;
        self.costs[start_index] = 0;
        frontier.push(Reverse(Entry {
            priority: start.manhattan_distance(goal),
            sequence,
            cell: start,
        }));

        let mut expanded = 0_usize;
        while let Some(Reverse(entry)) = frontier.pop() {
            let Some(current_index) = self.index(entry.cell) else {
                continue;
            };
            if self.closed[current_index] {
                continue;
            }
            self.closed[current_index] = true;
            expanded += 1;

            if entry.cell == goal {
                trace!(expanded, "path found");
                return Some(self.reconstruct(goal));
            }

            let next_cost = self.costs[current_index].saturating_add(1);
            for neighbor in entry.cell.cardinal_neighbors() {
                if !grid.is_traversable(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] || next_cost >= self.costs[neighbor_index] {
                    continue;
                }

                self.costs[neighbor_index] = next_cost;
                self.came_from[neighbor_index] = Some(entry.cell);
                sequence += 1;
                frontier.push(Reverse(Entry {
                    priority: next_cost.saturating_add(neighbor.manhattan_distance(goal)),
                    sequence,
                    cell: neighbor,
                }));
            }
        }

        trace!(expanded, "no path");
        None
    }

    fn reconstruct(&self, goal: Cell) -> Vec<Cell> {
        let mut path = vec![goal];
        let mut cursor = goal;
        while let Some(previous) = self.index(cursor).and_then(|index| self.came_from[index]) {
            path.push(previous);
            cursor = previous;
        }
        path.reverse();
        path
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    priority: u32,
    sequence: u64,
    cell: Cell,
}
