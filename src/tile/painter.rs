// src/tile/painter.rs

//! The tile author surface: implement [`Painter`] to give a tile its own
//! drawing behavior, and draw through the [`Canvas`] it is handed.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::geometry::{Position, Size};

/// Drawing behavior for a tile.
///
/// `draw` runs with the tile locked, possibly on the animation thread. It
/// must cope with `data` being `None` (nothing received yet), usually by
/// returning straight away.
pub trait Painter<D>: Send {
    /// Recompute the tile's pixels. The default repaints every pixel with
    /// the tile's default color.
    fn draw(&mut self, canvas: &mut Canvas<'_>, data: Option<&D>) {
        let _ = data;
        canvas.fill_default();
    }

    /// Called after every resize, once the buffer has been reallocated.
    fn on_size_set(&mut self, size: Size) {
        let _ = size;
    }
}

/// Paints the whole tile in its default color.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockPainter;

impl<D> Painter<D> for BlockPainter {}

/// Write access to a tile's pixels for the duration of one draw.
pub struct Canvas<'a> {
    pixels: &'a mut PixelBuffer,
    default_color: Color,
    accepting_data: &'a mut bool,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(
        pixels: &'a mut PixelBuffer,
        default_color: Color,
        accepting_data: &'a mut bool,
    ) -> Self {
        Canvas {
            pixels,
            default_color,
            accepting_data,
        }
    }

    pub fn size(&self) -> Size {
        self.pixels.size()
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    /// Writes one pixel. Positions outside the tile are silently dropped,
    /// so drawing math may wander off the edges.
    pub fn set_pixel(&mut self, pos: impl Into<Position>, color: Color) {
        self.pixels.set(pos.into(), color);
    }

    pub fn get_pixel(&self, pos: impl Into<Position>) -> Option<Color> {
        self.pixels.get(pos.into()).copied()
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn fill_default(&mut self) {
        self.pixels.fill(self.default_color);
    }

    /// Sets every pixel to off.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::OFF);
    }

    pub fn is_accepting_data(&self) -> bool {
        *self.accepting_data
    }

    /// Stop (or resume) taking new data, e.g. while a multi-frame sequence
    /// such as a scroll is in progress.
    pub fn set_accepting_data(&mut self, accepting: bool) {
        *self.accepting_data = accepting;
    }
}
