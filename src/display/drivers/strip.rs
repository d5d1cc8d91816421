// src/display/drivers/strip.rs

//! Row-major addressable LED strip.
//!
//! The matrix is wired as one strip: pixel `(col, row)` is LED
//! `row * cols + col`. Each flush writes every LED as a little-endian
//! packed `u32` in the configured [`PixelLayout`], with brightness applied
//! to every channel first. The writer is whatever carries the bytes to the
//! LED controller (serial port, SPI device node, pipe).

use crate::color::{Color, PixelLayout};
use crate::display::driver::{scale_channel, DisplayDriver, DisplayError};
use crate::geometry::Size;
use log::{debug, info, trace};
use std::io::Write;
use std::ops::RangeInclusive;

const MAX_BRIGHTNESS: u32 = 255;

pub struct StripDisplayDriver<W: Write + Send> {
    out: W,
    size: Size,
    layout: PixelLayout,
    leds: Vec<[u8; 4]>,
    brightness: u32,
}

impl<W: Write + Send> StripDisplayDriver<W> {
    pub fn new(out: W, size: Size, layout: PixelLayout, brightness: u32) -> Self {
        info!(
            "StripDisplayDriver: {} LEDs ({}), layout {:?}",
            size.area(),
            size,
            layout
        );
        Self {
            out,
            size,
            layout,
            leds: vec![[0; 4]; size.area()],
            brightness: brightness.min(MAX_BRIGHTNESS),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplayDriver for StripDisplayDriver<W> {
    fn size(&self) -> Size {
        self.size
    }

    fn set_pixel(&mut self, col: usize, row: usize, color: &Color) {
        if col < self.size.cols && row < self.size.rows {
            self.leds[row * self.size.cols + col] = color.channels_u8();
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut frame = Vec::with_capacity(self.leds.len() * 4);
        for channels in &self.leds {
            let scaled = channels.map(|c| scale_channel(c, self.brightness, MAX_BRIGHTNESS));
            frame.extend_from_slice(&self.layout.pack(scaled).to_le_bytes());
        }
        self.out.write_all(&frame)?;
        self.out.flush()?;
        trace!("StripDisplayDriver: wrote {} bytes", frame.len());
        Ok(())
    }

    fn brightness(&self) -> u32 {
        self.brightness
    }

    fn brightness_range(&self) -> RangeInclusive<u32> {
        0..=MAX_BRIGHTNESS
    }

    fn set_brightness(&mut self, value: u32) -> Result<(), DisplayError> {
        if value > MAX_BRIGHTNESS {
            return Err(DisplayError::BrightnessOutOfRange {
                value,
                range: self.brightness_range(),
            });
        }
        debug!("StripDisplayDriver: brightness {}", value);
        self.brightness = value;
        Ok(())
    }
}
