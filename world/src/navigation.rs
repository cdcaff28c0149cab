//! Flood-fill reachability used by planners and policies.

use std::collections::VecDeque;

use button_maze_core::Cell;

use crate::{cell_index, Traversable};

/// Cells reachable from a start cell through traversable neighbours.
///
/// The dense mask mirrors the grid dimensions; `order` lists reached cells in
/// breadth-first discovery order starting with the seed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reachability {
    rows: u32,
    columns: u32,
    reached: Vec<bool>,
    order: Vec<Cell>,
}

impl Reachability {
    /// Reports whether the cell was reached.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell_index(self.rows, self.columns, cell)
            .and_then(|index| self.reached.get(index).copied())
            .unwrap_or(false)
    }

    /// Reached cells in discovery order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.order
    }

    /// Number of reached cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether nothing was reached, which only happens for seeds
    /// outside the grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Breadth-first flood fill over traversable cells.
///
/// The seed is always included when it lies on the grid, even if it is not
/// traversable itself: the agent may be standing on a wall that was just
/// re-activated, and the fill then reports only the seed.
#[must_use]
pub fn reachable_from<T>(grid: &T, start: Cell) -> Reachability
where
    T: Traversable + ?Sized,
{
    let (rows, columns) = grid.dimensions();
    let cell_count_u64 = u64::from(rows) * u64::from(columns);
    let cell_count = usize::try_from(cell_count_u64).unwrap_or(0);
    let mut reachability = Reachability {
        rows,
        columns,
        reached: vec![false; cell_count],
        order: Vec::new(),
    };

    let Some(start_index) = cell_index(rows, columns, start) else {
        return reachability;
    };
    reachability.reached[start_index] = true;
    reachability.order.push(start);

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.cardinal_neighbors() {
            if !grid.is_traversable(neighbor) {
                continue;
            }

            let Some(neighbor_index) = cell_index(rows, columns, neighbor) else {
                continue;
            };

            if reachability.reached[neighbor_index] {
                continue;
            }

            reachability.reached[neighbor_index] = true;
            reachability.order.push(neighbor);
            queue.push_back(neighbor);
        }
    }

    reachability
}
