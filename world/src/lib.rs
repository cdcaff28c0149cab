#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid world for the button maze racer.
//!
//! A [`GridWorld`] stores five parallel per-cell layers (wall presence, wall
//! colour, wall active flag, button presence and button colour) together with
//! the spawn and target cells. Pressing a button toggles every wall of the
//! button's colour across the whole grid. Planners evaluate hypothetical
//! toggle-configurations through [`ToggledView`] without mutating the world.

use std::fmt;

use button_maze_core::{Cell, WallColor};
use thiserror::Error;
use tracing::trace;

mod layout;
mod navigation;
mod toggles;

pub use layout::{DisplaySize, TrackLayout};
pub use navigation::{reachable_from, Reachability};
pub use toggles::{ToggleSet, ToggledView};

/// Anything that can answer traversability questions over a bounded grid.
///
/// Implemented by [`GridWorld`] for its current configuration and by
/// [`ToggledView`] for hypothetical ones.
pub trait Traversable {
    /// Number of rows and columns of the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Reports whether the agent may occupy the cell.
    ///
    /// Cells outside the grid are never traversable.
    fn is_traversable(&self, cell: Cell) -> bool;

    /// Reports whether the cell lies within the grid bounds.
    fn contains(&self, cell: Cell) -> bool {
        let (rows, columns) = self.dimensions();
        cell_index(rows, columns, cell).is_some()
    }
}

impl<T: Traversable + ?Sized> Traversable for &T {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn is_traversable(&self, cell: Cell) -> bool {
        (**self).is_traversable(cell)
    }
}

/// Identifies one of the five per-cell layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Whether a wall occupies the cell.
    WallPresent,
    /// Colour of the wall occupying the cell.
    WallColor,
    /// Whether the wall occupying the cell currently blocks movement.
    WallActive,
    /// Whether a button sits on the cell.
    ButtonPresent,
    /// Colour of the button on the cell.
    ButtonColor,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WallPresent => "wall-present",
            Self::WallColor => "wall-color",
            Self::WallActive => "wall-active",
            Self::ButtonPresent => "button-present",
            Self::ButtonColor => "button-color",
        };
        f.write_str(name)
    }
}

/// Reasons a world definition is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The grid has no rows or no columns.
    #[error("grid must have at least one row and one column")]
    EmptyGrid,
    /// A layer does not match the shape of the wall-present layer.
    #[error("{layer} layer is {found_rows}x{found_columns}, expected {rows}x{columns}")]
    ShapeMismatch {
        /// Layer whose shape disagrees.
        layer: LayerKind,
        /// Expected number of rows.
        rows: u32,
        /// Expected number of columns.
        columns: u32,
        /// Rows found in the offending layer.
        found_rows: u32,
        /// Columns found in the offending layer.
        found_columns: u32,
    },
    /// A row of a layer has a different width than the first row.
    #[error("row {row} of the {layer} layer has {found} cells, expected {expected}")]
    RaggedLayer {
        /// Layer containing the ragged row.
        layer: LayerKind,
        /// Index of the ragged row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the ragged row.
        found: usize,
    },
    /// A grid dimension does not fit signed cell coordinates.
    #[error("grid dimension {value} exceeds the supported maximum")]
    DimensionTooLarge {
        /// Offending dimension.
        value: usize,
    },
    /// A referenced cell lies outside the grid.
    #[error("{role} cell {cell} lies outside the grid")]
    CellOutOfBounds {
        /// What the cell was used for, such as `spawn` or `target`.
        role: &'static str,
        /// Offending cell.
        cell: Cell,
    },
}

/// Dense row-major storage for one per-cell layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer<T> {
    rows: u32,
    columns: u32,
    cells: Vec<T>,
}

impl<T: Clone> Layer<T> {
    /// Creates a layer with every cell set to `value`.
    #[must_use]
    pub fn filled(rows: u32, columns: u32, value: T) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![value; capacity],
        }
    }

    /// Builds a layer from nested rows, rejecting ragged input.
    pub fn from_rows(kind: LayerKind, rows: Vec<Vec<T>>) -> Result<Self, WorldError> {
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * rows.len());
        let row_count = dimension(rows.len())?;
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(WorldError::RaggedLayer {
                    layer: kind,
                    row: index,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }

        Ok(Self {
            rows: row_count,
            columns: dimension(width)?,
            cells,
        })
    }

    /// Copies the layer back into nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        let width = usize::try_from(self.columns).unwrap_or(0);
        if width == 0 {
            return Vec::new();
        }
        self.cells.chunks(width).map(<[T]>::to_vec).collect()
    }
}

impl<T> Layer<T> {
    /// Number of rows and columns in the layer.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    /// Value stored for the cell, if it lies within the layer.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<&T> {
        cell_index(self.rows, self.columns, cell).and_then(|index| self.cells.get(index))
    }

    fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        cell_index(self.rows, self.columns, cell).and_then(|index| self.cells.get_mut(index))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }
}

/// The five per-cell layers that make up a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldLayers {
    /// Whether a wall occupies each cell.
    pub wall_present: Layer<bool>,
    /// Colour of each wall.
    pub wall_color: Layer<WallColor>,
    /// Whether each wall currently blocks movement.
    pub wall_active: Layer<bool>,
    /// Whether a button sits on each cell.
    pub button_present: Layer<bool>,
    /// Colour of each button.
    pub button_color: Layer<WallColor>,
}

/// Represents the authoritative grid world state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    layers: WorldLayers,
    spawn: Cell,
    target: Cell,
    display_size: Option<DisplaySize>,
}

impl GridWorld {
    /// Assembles a world from its layers, validating that every layer shares
    /// the same shape and that spawn and target lie on the grid.
    pub fn new(layers: WorldLayers, spawn: Cell, target: Cell) -> Result<Self, WorldError> {
        let (rows, columns) = layers.wall_present.dimensions();
        if rows == 0 || columns == 0 {
            return Err(WorldError::EmptyGrid);
        }

        let shapes = [
            (LayerKind::WallColor, layers.wall_color.dimensions()),
            (LayerKind::WallActive, layers.wall_active.dimensions()),
            (LayerKind::ButtonPresent, layers.button_present.dimensions()),
            (LayerKind::ButtonColor, layers.button_color.dimensions()),
        ];
        for (layer, (found_rows, found_columns)) in shapes {
            if (found_rows, found_columns) != (rows, columns) {
                return Err(WorldError::ShapeMismatch {
                    layer,
                    rows,
                    columns,
                    found_rows,
                    found_columns,
                });
            }
        }

        let world = Self {
            layers,
            spawn,
            target,
            display_size: None,
        };
        world.ensure_on_grid("spawn", spawn)?;
        world.ensure_on_grid("target", target)?;
        Ok(world)
    }

    /// Creates an empty track: no walls, no buttons, every active flag set,
    /// spawn in the upper-left corner and target in the lower-right corner.
    pub fn blank(rows: u32, columns: u32) -> Result<Self, WorldError> {
        let _ = dimension(usize::try_from(rows).unwrap_or(usize::MAX))?;
        let _ = dimension(usize::try_from(columns).unwrap_or(usize::MAX))?;
        let layers = WorldLayers {
            wall_present: Layer::filled(rows, columns, false),
            wall_color: Layer::filled(rows, columns, WallColor::new(0)),
            wall_active: Layer::filled(rows, columns, true),
            button_present: Layer::filled(rows, columns, false),
            button_color: Layer::filled(rows, columns, WallColor::new(0)),
        };
        let far_corner = Cell::new(
            i32::try_from(rows).unwrap_or(i32::MAX).saturating_sub(1),
            i32::try_from(columns).unwrap_or(i32::MAX).saturating_sub(1),
        );
        Self::new(layers, Cell::new(0, 0), far_corner)
    }

    /// Attaches display-size metadata for rendering adapters.
    #[must_use]
    pub fn with_display_size(mut self, display_size: Option<DisplaySize>) -> Self {
        self.display_size = display_size;
        self
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.layers.wall_present.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.layers.wall_present.columns
    }

    /// Cell where the agent starts.
    #[must_use]
    pub const fn spawn(&self) -> Cell {
        self.spawn
    }

    /// Cell the agent must reach.
    #[must_use]
    pub const fn target(&self) -> Cell {
        self.target
    }

    /// Display-size metadata carried by the track, if any.
    #[must_use]
    pub const fn display_size(&self) -> Option<DisplaySize> {
        self.display_size
    }

    /// Read-only access to the underlying layers.
    #[must_use]
    pub const fn layers(&self) -> &WorldLayers {
        &self.layers
    }

    /// Reports whether a wall occupies the cell, active or not.
    #[must_use]
    pub fn has_wall(&self, cell: Cell) -> bool {
        self.layers.wall_present.get(cell).copied().unwrap_or(false)
    }

    /// Colour of the wall occupying the cell, if there is one.
    #[must_use]
    pub fn wall_color_at(&self, cell: Cell) -> Option<WallColor> {
        if self.has_wall(cell) {
            self.layers.wall_color.get(cell).copied()
        } else {
            None
        }
    }

    /// Reports whether the cell's active flag is set.
    #[must_use]
    pub fn is_wall_active(&self, cell: Cell) -> bool {
        self.layers.wall_active.get(cell).copied().unwrap_or(false)
    }

    /// Colour of the button on the cell, if there is one.
    #[must_use]
    pub fn button_color_at(&self, cell: Cell) -> Option<WallColor> {
        let present = self.layers.button_present.get(cell).copied().unwrap_or(false);
        if present {
            self.layers.button_color.get(cell).copied()
        } else {
            None
        }
    }

    /// Flips the active flag of every wall of the provided colour.
    ///
    /// Toggling the same colour twice restores the original flags.
    pub fn toggle(&mut self, color: WallColor) {
        let mut flipped = 0_usize;
        let walls = self.layers.wall_present.cells.iter();
        let colors = self.layers.wall_color.cells.iter();
        let flags = self.layers.wall_active.iter_mut();
        for ((present, wall_color), active) in walls.zip(colors).zip(flags) {
            if *present && *wall_color == color {
                *active = !*active;
                flipped += 1;
            }
        }
        trace!(color = color.get(), flipped, "toggled walls");
    }

    /// Places a wall of the given colour and active state on the cell.
    pub fn set_wall(
        &mut self,
        cell: Cell,
        color: WallColor,
        active: bool,
    ) -> Result<(), WorldError> {
        self.ensure_on_grid("wall", cell)?;
        set(&mut self.layers.wall_present, cell, true);
        set(&mut self.layers.wall_color, cell, color);
        set(&mut self.layers.wall_active, cell, active);
        Ok(())
    }

    /// Removes any wall from the cell.
    pub fn clear_wall(&mut self, cell: Cell) -> Result<(), WorldError> {
        self.ensure_on_grid("wall", cell)?;
        set(&mut self.layers.wall_present, cell, false);
        set(&mut self.layers.wall_color, cell, WallColor::new(0));
        set(&mut self.layers.wall_active, cell, true);
        Ok(())
    }

    /// Places a button of the given colour on the cell.
    pub fn set_button(&mut self, cell: Cell, color: WallColor) -> Result<(), WorldError> {
        self.ensure_on_grid("button", cell)?;
        set(&mut self.layers.button_present, cell, true);
        set(&mut self.layers.button_color, cell, color);
        Ok(())
    }

    /// Removes any button from the cell.
    pub fn clear_button(&mut self, cell: Cell) -> Result<(), WorldError> {
        self.ensure_on_grid("button", cell)?;
        set(&mut self.layers.button_present, cell, false);
        set(&mut self.layers.button_color, cell, WallColor::new(0));
        Ok(())
    }

    /// Moves the spawn cell.
    pub fn set_spawn(&mut self, cell: Cell) -> Result<(), WorldError> {
        self.ensure_on_grid("spawn", cell)?;
        self.spawn = cell;
        Ok(())
    }

    /// Moves the target cell.
    pub fn set_target(&mut self, cell: Cell) -> Result<(), WorldError> {
        self.ensure_on_grid("target", cell)?;
        self.target = cell;
        Ok(())
    }

    /// Iterator over every in-bounds cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let rows = i32::try_from(self.rows()).unwrap_or(0);
        let columns = i32::try_from(self.columns()).unwrap_or(0);
        (0..rows).flat_map(move |row| (0..columns).map(move |column| Cell::new(row, column)))
    }

    fn ensure_on_grid(&self, role: &'static str, cell: Cell) -> Result<(), WorldError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(WorldError::CellOutOfBounds { role, cell })
        }
    }
}

impl Traversable for GridWorld {
    fn dimensions(&self) -> (u32, u32) {
        (self.rows(), self.columns())
    }

    fn is_traversable(&self, cell: Cell) -> bool {
        self.contains(cell) && (!self.has_wall(cell) || !self.is_wall_active(cell))
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use button_maze_core::{Cell, WallColor};

    use super::{GridWorld, Traversable};

    /// Locations of walls, optionally filtered by colour and active state,
    /// in row-major order.
    #[must_use]
    pub fn wall_cells(
        world: &GridWorld,
        color: Option<WallColor>,
        active: Option<bool>,
    ) -> Vec<Cell> {
        world
            .cells()
            .filter(|cell| match world.wall_color_at(*cell) {
                None => false,
                Some(wall_color) => {
                    color.map_or(true, |wanted| wanted == wall_color)
                        && active.map_or(true, |wanted| wanted == world.is_wall_active(*cell))
                }
            })
            .collect()
    }

    /// Locations of buttons, optionally filtered by colour, in row-major order.
    #[must_use]
    pub fn button_cells(world: &GridWorld, color: Option<WallColor>) -> Vec<Cell> {
        world
            .cells()
            .filter(|cell| match world.button_color_at(*cell) {
                None => false,
                Some(button_color) => color.map_or(true, |wanted| wanted == button_color),
            })
            .collect()
    }

    /// Every cell the agent may currently occupy, in row-major order.
    ///
    /// Buttons and deactivated walls are included.
    #[must_use]
    pub fn traversable_cells(world: &GridWorld) -> Vec<Cell> {
        world.cells().filter(|cell| world.is_traversable(*cell)).collect()
    }

    /// Distinct colours carried by walls on the grid.
    #[must_use]
    pub fn wall_colors(world: &GridWorld) -> BTreeSet<WallColor> {
        world.cells().filter_map(|cell| world.wall_color_at(cell)).collect()
    }
}

fn set<T>(layer: &mut Layer<T>, cell: Cell, value: T) {
    if let Some(slot) = layer.get_mut(cell) {
        *slot = value;
    }
}

fn dimension(value: usize) -> Result<u32, WorldError> {
    u32::try_from(value)
        .ok()
        .filter(|converted| i32::try_from(*converted).is_ok())
        .ok_or(WorldError::DimensionTooLarge { value })
}

pub(crate) fn cell_index(rows: u32, columns: u32, cell: Cell) -> Option<usize> {
    let row = u32::try_from(cell.row()).ok()?;
    let column = u32::try_from(cell.column()).ok()?;
    if row >= rows || column >= columns {
        return None;
    }
    let row = usize::try_from(row).ok()?;
    let column = usize::try_from(column).ok()?;
    let width = usize::try_from(columns).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
