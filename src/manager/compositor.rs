// src/manager/compositor.rs

//! Builds the matrix frame buffer from the registered tiles.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::{Result, TilesError};
use crate::geometry::{Position, Size};
use crate::manager::Registration;
use log::trace;

/// Runs one compositing pass into a fresh buffer.
///
/// Tiles are stamped in registration order, so later tiles win where they
/// overlap. Hidden tiles are skipped; animating tiles are redrawn first.
/// A tile whose pixels would land outside the matrix fails the whole pass
/// and nothing is returned, leaving the caller's frame buffer untouched.
pub(crate) fn composite<D>(registrations: &[Registration<D>], matrix: Size) -> Result<PixelBuffer> {
    let mut frame = PixelBuffer::new(matrix, Color::OFF);

    for registration in registrations {
        let tile = registration.tile();
        let offset = registration.offset();
        match tile.with_frame(|pixels| stamp(&mut frame, pixels, offset)) {
            None => trace!("Compositor: tile '{}' hidden, skipped", tile.name()),
            Some(Ok(())) => {}
            Some(Err(tile_size)) => {
                return Err(TilesError::Placement {
                    tile: tile.name().to_string(),
                    offset,
                    tile_size,
                    matrix,
                });
            }
        }
    }

    Ok(frame)
}

/// Copies `pixels` into `frame` with its top-left corner at `offset`.
/// On overrun, returns the tile size without writing anything.
fn stamp(frame: &mut PixelBuffer, pixels: &PixelBuffer, offset: Position) -> Result<(), Size> {
    let tile_size = pixels.size();
    if !fits(offset, tile_size, frame.size()) {
        return Err(tile_size);
    }
    for (row_num, row) in pixels.rows().enumerate() {
        for (col_num, color) in row.iter().enumerate() {
            let dest = Position::new(offset.x + col_num as i32, offset.y + row_num as i32);
            frame.set(dest, *color);
        }
    }
    Ok(())
}

fn fits(offset: Position, tile: Size, matrix: Size) -> bool {
    if tile.is_empty() {
        return true;
    }
    offset.x >= 0
        && offset.y >= 0
        && offset.x as usize + tile.cols <= matrix.cols
        && offset.y as usize + tile.rows <= matrix.rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn fits_checks_every_edge() {
        let matrix = Size::new(8, 4);
        assert!(fits(Position::new(0, 0), Size::new(8, 4), matrix));
        assert!(fits(Position::new(4, 0), Size::new(4, 4), matrix));
        assert!(!fits(Position::new(5, 0), Size::new(4, 4), matrix));
        assert!(!fits(Position::new(0, 1), Size::new(4, 4), matrix));
        assert!(!fits(Position::new(-1, 0), Size::new(1, 1), matrix));
        assert!(!fits(Position::new(0, -1), Size::new(1, 1), matrix));
    }

    #[test]
    fn empty_tiles_fit_anywhere() {
        let matrix = Size::new(2, 2);
        assert!(fits(Position::new(50, -3), Size::new(0, 4), matrix));
        assert!(fits(Position::new(50, 50), Size::new(3, 0), matrix));
    }
}
