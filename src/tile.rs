// src/tile.rs

//! A tile: an independently managed rectangle of the matrix with its own
//! pixel buffer, data slot and drawing behavior.
//!
//! All mutable tile state sits behind one mutex, taken once per public
//! operation. `draw` may run on the scheduler thread while the caller's
//! thread pushes data or resizes the tile.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::{Result, TilesError};
use crate::geometry::{Position, Size};
use log::{debug, trace};
use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

mod painter;
#[cfg(test)]
mod tests;

pub use painter::{BlockPainter, Canvas, Painter};

const DEFAULT_TILE_NAME: &str = "tile";

/// How a tile picks its default color when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Uses the stock block painter. Gets a random default color so an
    /// unconfigured tile is still visible.
    Generic,
    /// Draws itself. Defaults to off so no placeholder color flashes up
    /// before the first real draw.
    Custom,
}

impl TileKind {
    fn default_color(self) -> Color {
        match self {
            TileKind::Generic => Color::random(),
            TileKind::Custom => Color::OFF,
        }
    }
}

/// Boolean tile properties that can be assigned from untyped values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFlag {
    Animate,
    Visible,
    AcceptingData,
}

impl TileFlag {
    fn name(self) -> &'static str {
        match self {
            TileFlag::Animate => "animate",
            TileFlag::Visible => "visible",
            TileFlag::AcceptingData => "is_accepting_data",
        }
    }
}

struct TileState<D> {
    size: Size,
    pixels: PixelBuffer,
    default_color: Color,
    data: Option<D>,
    animate: bool,
    visible: bool,
    accepting_data: bool,
    painter: Box<dyn Painter<D>>,
}

impl<D> TileState<D> {
    fn flag_mut(&mut self, flag: TileFlag) -> &mut bool {
        match flag {
            TileFlag::Animate => &mut self.animate,
            TileFlag::Visible => &mut self.visible,
            TileFlag::AcceptingData => &mut self.accepting_data,
        }
    }
}

/// One independently managed region of the display.
///
/// `D` is the payload type the tile's painter interprets. Tiles registered
/// with the same manager share it, since the manager fans one payload out
/// to every tile.
pub struct Tile<D = Value> {
    name: String,
    state: Mutex<TileState<D>>,
}

impl<D: Send + 'static> Tile<D> {
    /// A generic tile with a random default color.
    pub fn new() -> Self {
        Self::generic().build()
    }

    /// Starts a generic tile drawn by [`BlockPainter`].
    pub fn generic() -> TileBuilder<D> {
        TileBuilder::new(TileKind::Generic, Box::new(BlockPainter))
    }

    /// Starts a custom tile drawn by `painter`.
    pub fn custom(painter: impl Painter<D> + 'static) -> TileBuilder<D> {
        TileBuilder::new(TileKind::Custom, Box::new(painter))
    }
}

impl<D: Send + 'static> Default for Tile<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Tile<D> {
    fn state(&self) -> MutexGuard<'_, TileState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Size {
        self.state().size
    }

    /// Resizes the tile. The pixel buffer is reallocated and filled with
    /// the default color, then the painter's `on_size_set` hook runs. A
    /// zero dimension yields an empty buffer.
    pub fn set_size(&self, size: Size) {
        let mut state = self.state();
        let state = &mut *state;
        state.size = size;
        state.pixels = PixelBuffer::new(size, state.default_color);
        state.painter.on_size_set(size);
        debug!("Tile '{}': resized to {}", self.name, size);
    }

    pub fn default_color(&self) -> Color {
        self.state().default_color
    }

    /// Takes effect on the next resize or default draw.
    pub fn set_default_color(&self, color: Color) {
        self.state().default_color = color;
    }

    /// Sets every pixel to off, regardless of the default color.
    pub fn clear(&self) {
        self.state().pixels.fill(Color::OFF);
    }

    /// Writes one pixel. Positions outside the tile are ignored.
    pub fn set_pixel(&self, pos: impl Into<Position>, color: Color) {
        let pos = pos.into();
        if !self.state().pixels.set(pos, color) {
            trace!("Tile '{}': dropped pixel write at {}", self.name, pos);
        }
    }

    /// Snapshot of the pixel buffer, indexed `[row][col]`.
    pub fn pixels(&self) -> Vec<Vec<Color>> {
        self.state().pixels.to_rows()
    }

    /// Recomputes the pixel buffer from the current data.
    pub fn draw(&self) {
        let mut state = self.state();
        Self::draw_locked(&mut state);
    }

    fn draw_locked(state: &mut TileState<D>) {
        let TileState {
            pixels,
            default_color,
            data,
            accepting_data,
            painter,
            ..
        } = state;
        let mut canvas = Canvas::new(pixels, *default_color, accepting_data);
        painter.draw(&mut canvas, data.as_ref());
    }

    /// Hands the tile's current pixels to `f` as one atomic step: skipped
    /// entirely (returns `None`) when the tile is hidden, redrawn first
    /// when the tile animates.
    pub(crate) fn with_frame<R>(&self, f: impl FnOnce(&PixelBuffer) -> R) -> Option<R> {
        let mut state = self.state();
        if !state.visible {
            return None;
        }
        if state.animate {
            Self::draw_locked(&mut state);
        }
        Some(f(&state.pixels))
    }

    /// Offers new data. Ignored, returning false, while the tile is not
    /// accepting data.
    pub fn set_data(&self, data: D) -> bool {
        let mut state = self.state();
        if !state.accepting_data {
            trace!("Tile '{}': busy, declined data", self.name);
            return false;
        }
        state.data = Some(data);
        true
    }

    /// Drops the current data, returning the tile to its "no data yet" state.
    pub fn take_data(&self) -> Option<D> {
        self.state().data.take()
    }

    pub fn is_accepting_data(&self) -> bool {
        self.state().accepting_data
    }

    pub fn set_accepting_data(&self, accepting: bool) {
        self.state().accepting_data = accepting;
    }

    pub fn animate(&self) -> bool {
        self.state().animate
    }

    pub fn set_animate(&self, animate: bool) {
        self.state().animate = animate;
    }

    pub fn visible(&self) -> bool {
        self.state().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.state().visible = visible;
    }

    pub fn flag(&self, flag: TileFlag) -> bool {
        *self.state().flag_mut(flag)
    }

    /// Assigns a boolean property from an untyped value, e.g. one read from
    /// a config file or a control message. Anything but a JSON boolean is
    /// rejected and the property keeps its value.
    pub fn set_flag_value(&self, flag: TileFlag, value: &Value) -> Result<()> {
        let value = value.as_bool().ok_or_else(|| {
            TilesError::invalid_argument(flag.name(), format!("expected a boolean, got {}", value))
        })?;
        *self.state().flag_mut(flag) = value;
        Ok(())
    }
}

impl<D: Clone> Tile<D> {
    /// The last accepted payload, whether or not the tile currently
    /// accepts new data.
    pub fn data(&self) -> Option<D> {
        self.state().data.clone()
    }
}

impl<D> fmt::Debug for Tile<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Tile")
            .field("name", &self.name)
            .field("size", &state.size)
            .field("default_color", &state.default_color)
            .field("animate", &state.animate)
            .field("visible", &state.visible)
            .finish()
    }
}

/// Configures a [`Tile`] before construction.
pub struct TileBuilder<D> {
    kind: TileKind,
    name: String,
    default_color: Option<Color>,
    animate: bool,
    visible: bool,
    painter: Box<dyn Painter<D>>,
}

impl<D: Send + 'static> TileBuilder<D> {
    fn new(kind: TileKind, painter: Box<dyn Painter<D>>) -> Self {
        TileBuilder {
            kind,
            name: DEFAULT_TILE_NAME.to_string(),
            default_color: None,
            animate: false,
            visible: true,
            painter,
        }
    }

    /// Name used in logs and placement errors.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn default_color(mut self, color: Color) -> Self {
        self.default_color = Some(color);
        self
    }

    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builds a 1x1 tile. The manager assigns the real size on registration.
    pub fn build(self) -> Tile<D> {
        let default_color = self
            .default_color
            .unwrap_or_else(|| self.kind.default_color());
        let size = Size::new(1, 1);
        let mut painter = self.painter;
        painter.on_size_set(size);
        Tile {
            name: self.name,
            state: Mutex::new(TileState {
                size,
                pixels: PixelBuffer::new(size, default_color),
                default_color,
                data: None,
                animate: self.animate,
                visible: self.visible,
                accepting_data: true,
                painter,
            }),
        }
    }
}
