// src/display/driver.rs
//! DisplayDriver trait - the minimal set of primitives a physical matrix
//! must provide.
//!
//! The driver owns the hardware. Everything else (tiles, compositing,
//! frame timing) lives in `TileManager`, which talks to the driver only
//! through this trait.
//!
//! ## Threading Model
//! - The driver is owned by the manager behind a mutex.
//! - When animation is enabled, `set_pixel`/`flush` are called from the
//!   scheduler thread, hence the `Send` bound.

use crate::color::Color;
use crate::geometry::Size;
use std::ops::RangeInclusive;

/// Errors reported by a display driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// Writing the frame to the device failed.
    Io(String),
    /// Brightness outside the range the device supports.
    BrightnessOutOfRange {
        value: u32,
        range: RangeInclusive<u32>,
    },
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayError::Io(msg) => write!(f, "device write failed: {}", msg),
            DisplayError::BrightnessOutOfRange { value, range } => write!(
                f,
                "brightness {} outside supported range {}-{}",
                value,
                range.start(),
                range.end()
            ),
        }
    }
}

impl std::error::Error for DisplayError {}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err.to_string())
    }
}

/// Minimal physical display interface.
pub trait DisplayDriver: Send {
    /// Declared physical dimensions.
    fn size(&self) -> Size;

    /// Stage one pixel. Takes effect on the next `flush`.
    ///
    /// Callers stay within `size()`; drivers may ignore anything outside it.
    fn set_pixel(&mut self, col: usize, row: usize, color: &Color);

    /// Push all staged pixels to the device.
    fn flush(&mut self) -> Result<(), DisplayError>;

    fn brightness(&self) -> u32;

    /// The brightness values `set_brightness` accepts.
    fn brightness_range(&self) -> RangeInclusive<u32>;

    fn set_brightness(&mut self, value: u32) -> Result<(), DisplayError>;
}

/// Scales a 0-255 channel by `brightness` out of `max`.
pub(crate) fn scale_channel(channel: u8, brightness: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    ((channel as u32 * brightness.min(max)) / max) as u8
}
