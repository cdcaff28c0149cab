//! Serializable track definition consumed by loaders and editors.

use button_maze_core::{Cell, WallColor};
use serde::{Deserialize, Serialize};

use crate::{GridWorld, Layer, LayerKind, WorldError, WorldLayers};

/// Pixel size adapters use when drawing the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplaySize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Layered track description with one nested row vector per layer.
///
/// Every layer is row-major: `walls[row][column]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Whether a wall occupies each cell.
    pub walls: Vec<Vec<bool>>,
    /// Whether each wall currently blocks movement.
    pub active: Vec<Vec<bool>>,
    /// Whether a button sits on each cell.
    pub buttons: Vec<Vec<bool>>,
    /// Colour of each wall.
    pub wall_colors: Vec<Vec<WallColor>>,
    /// Colour of each button.
    pub button_colors: Vec<Vec<WallColor>>,
    /// Cell where the agent starts.
    pub spawn: Cell,
    /// Cell the agent must reach.
    pub target: Cell,
    /// Optional rendering metadata.
    #[serde(default)]
    pub display_size: Option<DisplaySize>,
}

impl GridWorld {
    /// Builds a world from a track layout, validating its shape.
    pub fn from_layout(layout: TrackLayout) -> Result<Self, WorldError> {
        let layers = WorldLayers {
            wall_present: Layer::from_rows(LayerKind::WallPresent, layout.walls)?,
            wall_color: Layer::from_rows(LayerKind::WallColor, layout.wall_colors)?,
            wall_active: Layer::from_rows(LayerKind::WallActive, layout.active)?,
            button_present: Layer::from_rows(LayerKind::ButtonPresent, layout.buttons)?,
            button_color: Layer::from_rows(LayerKind::ButtonColor, layout.button_colors)?,
        };
        Ok(Self::new(layers, layout.spawn, layout.target)?.with_display_size(layout.display_size))
    }

    /// Captures the world's current state as a track layout.
    #[must_use]
    pub fn to_layout(&self) -> TrackLayout {
        let layers = self.layers();
        TrackLayout {
            walls: layers.wall_present.to_rows(),
            active: layers.wall_active.to_rows(),
            buttons: layers.button_present.to_rows(),
            wall_colors: layers.wall_color.to_rows(),
            button_colors: layers.button_color.to_rows(),
            spawn: self.spawn(),
            target: self.target(),
            display_size: self.display_size(),
        }
    }
}
