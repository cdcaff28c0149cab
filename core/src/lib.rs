#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the button maze racer.
//!
//! This crate defines the value types that connect the authoritative world,
//! the turn engine, the planners and the pluggable policies. A policy inspects
//! a read-only world and answers with a [`Delta`]; the engine validates that
//! delta into a [`Step`], applies it and reports a [`RunStatus`]. Terminal
//! failures carry a [`DnfReason`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as row and column indices.
///
/// Coordinates are signed so that a move off the grid edge is still
/// representable; a cell is only valid when the world reports it in bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    row: i32,
    column: i32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Cell reached by applying the provided offset.
    #[must_use]
    pub fn offset(self, delta: Delta) -> Cell {
        Cell::new(
            self.row.saturating_add(delta.row()),
            self.column.saturating_add(delta.column()),
        )
    }

    /// The four axis-adjacent cells in North, South, East, West order.
    ///
    /// Neighbours are not bounds-checked.
    #[must_use]
    pub fn cardinal_neighbors(self) -> [Cell; 4] {
        [
            self.offset(Step::North.delta()),
            self.offset(Step::South.delta()),
            self.offset(Step::East.delta()),
            self.offset(Step::West.delta()),
        ]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Raw positional change proposed by a policy.
///
/// Any pair of integers is expressible; only the five unit deltas described
/// by [`Step`] are legal moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    row: i32,
    column: i32,
}

impl Delta {
    /// Creates a delta from row and column offsets.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Row offset.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column offset.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Legal unit moves available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
    /// Remain in place for the tick.
    Stay,
}

impl Step {
    /// Every legal step, in a fixed order.
    pub const ALL: [Step; 5] = [
        Step::North,
        Step::South,
        Step::East,
        Step::West,
        Step::Stay,
    ];

    /// Positional change applied by the step.
    #[must_use]
    pub const fn delta(self) -> Delta {
        match self {
            Self::North => Delta::new(-1, 0),
            Self::South => Delta::new(1, 0),
            Self::East => Delta::new(0, 1),
            Self::West => Delta::new(0, -1),
            Self::Stay => Delta::new(0, 0),
        }
    }

    /// Validates a raw delta, returning the matching step when it is legal.
    #[must_use]
    pub fn from_delta(delta: Delta) -> Option<Step> {
        Self::ALL.into_iter().find(|step| step.delta() == delta)
    }

    /// Step that moves from `from` into the adjacent cell `to`.
    ///
    /// Returns `None` unless the cells are identical or axis-adjacent.
    #[must_use]
    pub fn between(from: Cell, to: Cell) -> Option<Step> {
        Self::from_delta(Delta::new(
            to.row().wrapping_sub(from.row()),
            to.column().wrapping_sub(from.column()),
        ))
    }
}

impl From<Step> for Delta {
    fn from(step: Step) -> Self {
        step.delta()
    }
}

/// Colour shared by a group of walls and the buttons that toggle them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WallColor(u8);

impl WallColor {
    /// Creates a colour from its numeric palette index.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric palette index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for WallColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color {}", self.0)
    }
}

/// Reasons a run terminates without reaching the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DnfReason {
    /// The policy returned a fault or panicked while deciding.
    PolicyCrashed,
    /// The decision time budget was exhausted.
    Timeout,
    /// The policy proposed something other than a unit step.
    IllegalMove,
    /// The move left the grid.
    OutOfBounds,
    /// The move entered a cell that is not traversable.
    Collision,
    /// Too many consecutive ticks without getting closer to the target.
    Stalled,
}

/// Lifecycle of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// The run accepts further ticks.
    Ongoing,
    /// The agent reached the target.
    Finished,
    /// The run ended early for the provided reason.
    DidNotFinish(DnfReason),
}

impl RunStatus {
    /// Reports whether the run has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Delta, DnfReason, RunStatus, Step};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Cell::new(1, 1);
        let destination = Cell::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert_eq!(Cell::new(-1, 0).manhattan_distance(Cell::new(0, 0)), 1);
    }

    #[test]
    fn only_unit_deltas_are_legal_steps() {
        assert_eq!(Step::from_delta(Delta::new(-1, 0)), Some(Step::North));
        assert_eq!(Step::from_delta(Delta::new(0, 0)), Some(Step::Stay));
        assert_eq!(Step::from_delta(Delta::new(1, 1)), None);
        assert_eq!(Step::from_delta(Delta::new(0, 2)), None);
        assert_eq!(Step::from_delta(Delta::new(-2, 0)), None);
    }

    #[test]
    fn step_between_neighbors() {
        let origin = Cell::new(3, 3);
        assert_eq!(Step::between(origin, Cell::new(2, 3)), Some(Step::North));
        assert_eq!(Step::between(origin, Cell::new(3, 4)), Some(Step::East));
        assert_eq!(Step::between(origin, Cell::new(4, 3)), Some(Step::South));
        assert_eq!(Step::between(origin, Cell::new(3, 2)), Some(Step::West));
        assert_eq!(Step::between(origin, origin), Some(Step::Stay));
        assert_eq!(Step::between(origin, Cell::new(5, 5)), None);
    }

    #[test]
    fn offset_follows_step_delta() {
        let origin = Cell::new(0, 0);
        assert_eq!(origin.offset(Step::North.delta()), Cell::new(-1, 0));
        assert_eq!(origin.offset(Step::East.delta()), Cell::new(0, 1));
    }

    #[test]
    fn only_ongoing_is_non_terminal() {
        assert!(!RunStatus::Ongoing.is_terminal());
        assert!(RunStatus::Finished.is_terminal());
        assert!(RunStatus::DidNotFinish(DnfReason::Stalled).is_terminal());
    }

    #[test]
    fn move_history_round_trips_through_bincode() {
        let history = vec![Step::East, Step::South, Step::Stay, Step::West];
        let bytes = bincode::serialize(&history).expect("serialize");
        let restored: Vec<Step> = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, history);
    }
}
