//! Hypothetical toggle-configurations evaluated without touching the world.

use std::collections::BTreeSet;

use button_maze_core::{Cell, WallColor};

use crate::{GridWorld, Traversable};

/// Set of wall colours flipped relative to a reference world.
///
/// Ordered so that equal configurations hash and compare identically no
/// matter which order the colours were flipped in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToggleSet {
    colors: BTreeSet<WallColor>,
}

impl ToggleSet {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the colour: adds it when absent, removes it when present.
    pub fn flip(&mut self, color: WallColor) {
        if !self.colors.remove(&color) {
            let _ = self.colors.insert(color);
        }
    }

    /// Copy of the configuration with the colour flipped.
    #[must_use]
    pub fn flipped(&self, color: WallColor) -> Self {
        let mut next = self.clone();
        next.flip(color);
        next
    }

    /// Reports whether the colour is flipped.
    #[must_use]
    pub fn contains(&self, color: WallColor) -> bool {
        self.colors.contains(&color)
    }

    /// Flipped colours in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = WallColor> + '_ {
        self.colors.iter().copied()
    }

    /// Number of flipped colours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Reports whether nothing is flipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromIterator<WallColor> for ToggleSet {
    fn from_iter<I: IntoIterator<Item = WallColor>>(iter: I) -> Self {
        let mut set = Self::new();
        for color in iter {
            set.flip(color);
        }
        set
    }
}

/// Read-only view of a world as if the colours in a [`ToggleSet`] had been
/// toggled.
#[derive(Clone, Copy, Debug)]
pub struct ToggledView<'a> {
    world: &'a GridWorld,
    toggles: &'a ToggleSet,
}

impl<'a> ToggledView<'a> {
    /// Captures a view over the world under the provided configuration.
    #[must_use]
    pub const fn new(world: &'a GridWorld, toggles: &'a ToggleSet) -> Self {
        Self { world, toggles }
    }

    /// Produces an owned world with the configuration applied.
    #[must_use]
    pub fn materialize(&self) -> GridWorld {
        let mut world = self.world.clone();
        for color in self.toggles.iter() {
            world.toggle(color);
        }
        world
    }
}

impl Traversable for ToggledView<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.world.dimensions()
    }

    fn is_traversable(&self, cell: Cell) -> bool {
        if !self.world.contains(cell) {
            return false;
        }
        match self.world.wall_color_at(cell) {
            None => true,
            Some(color) => self.world.is_wall_active(cell) == self.toggles.contains(color),
        }
    }
}
