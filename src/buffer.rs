// src/buffer.rs

//! Row-major grid of colors shared by tiles and the matrix frame buffer.

use crate::color::Color;
use crate::geometry::{Position, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    size: Size,
    cells: Vec<Color>,
}

impl PixelBuffer {
    /// A `size.rows x size.cols` buffer with every cell set to `fill`.
    pub fn new(size: Size, fill: Color) -> Self {
        PixelBuffer {
            size,
            cells: vec![fill; size.area()],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn fill(&mut self, color: Color) {
        self.cells.iter_mut().for_each(|c| *c = color);
    }

    pub fn get(&self, pos: Position) -> Option<&Color> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Writes one cell. Returns false, leaving the buffer untouched, when
    /// `pos` is outside the buffer.
    pub fn set(&mut self, pos: Position, color: Color) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = color;
                true
            }
            None => false,
        }
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        // chunks() rejects a zero chunk size; a zero-column buffer has no cells anyway.
        self.cells.chunks(self.size.cols.max(1))
    }

    /// Copies the buffer out as `[row][col]`.
    pub fn to_rows(&self) -> Vec<Vec<Color>> {
        let mut rows: Vec<Vec<Color>> = self.rows().map(<[Color]>::to_vec).collect();
        rows.resize(self.size.rows, Vec::new());
        rows
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.size.contains(pos) {
            Some(pos.y as usize * self.size.cols + pos.x as usize)
        } else {
            None
        }
    }
}
