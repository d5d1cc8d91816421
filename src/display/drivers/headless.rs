//! Headless in-memory display driver.
//!
//! Keeps staged and flushed frames in memory. A [`HeadlessMonitor`] handle
//! shares that state, so a test can keep observing the "hardware" after the
//! driver itself has been moved into a `TileManager`.

use crate::color::Color;
use crate::display::driver::{DisplayDriver, DisplayError};
use crate::geometry::Size;
use log::{info, trace};
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DEFAULT_BRIGHTNESS: u32 = 64;
const DEFAULT_BRIGHTNESS_RANGE: RangeInclusive<u32> = 0..=255;

#[derive(Debug)]
struct HeadlessState {
    staged: Vec<Vec<Color>>,
    flushed: Vec<Vec<Color>>,
    flush_count: usize,
    brightness: u32,
}

pub struct HeadlessDisplayDriver {
    size: Size,
    brightness_range: RangeInclusive<u32>,
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessDisplayDriver {
    pub fn new(size: Size) -> Self {
        Self::with_brightness_range(size, DEFAULT_BRIGHTNESS_RANGE)
    }

    /// A driver that accepts brightness only within `range`. Brightness
    /// starts at the default, clamped into `range`.
    pub fn with_brightness_range(size: Size, range: RangeInclusive<u32>) -> Self {
        info!("HeadlessDisplayDriver::new() {} matrix", size);
        let blank = vec![vec![Color::OFF; size.cols]; size.rows];
        let brightness = DEFAULT_BRIGHTNESS.clamp(*range.start(), *range.end());
        Self {
            size,
            brightness_range: range,
            state: Arc::new(Mutex::new(HeadlessState {
                staged: blank.clone(),
                flushed: blank,
                flush_count: 0,
                brightness,
            })),
        }
    }

    /// A handle for observing what this driver has been asked to show.
    pub fn monitor(&self) -> HeadlessMonitor {
        HeadlessMonitor {
            state: Arc::clone(&self.state),
        }
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplayDriver for HeadlessDisplayDriver {
    fn size(&self) -> Size {
        self.size
    }

    fn set_pixel(&mut self, col: usize, row: usize, color: &Color) {
        let mut state = self.state();
        if let Some(cell) = state.staged.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = *color;
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state();
        state.flushed = state.staged.clone();
        state.flush_count += 1;
        trace!("HeadlessDisplayDriver: flush #{}", state.flush_count);
        Ok(())
    }

    fn brightness(&self) -> u32 {
        self.state().brightness
    }

    fn brightness_range(&self) -> RangeInclusive<u32> {
        self.brightness_range.clone()
    }

    fn set_brightness(&mut self, value: u32) -> Result<(), DisplayError> {
        if !self.brightness_range.contains(&value) {
            return Err(DisplayError::BrightnessOutOfRange {
                value,
                range: self.brightness_range.clone(),
            });
        }
        self.state().brightness = value;
        Ok(())
    }
}

/// Read-only view of a [`HeadlessDisplayDriver`]'s device state.
#[derive(Clone)]
pub struct HeadlessMonitor {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessMonitor {
    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of completed flushes.
    pub fn flush_count(&self) -> usize {
        self.state().flush_count
    }

    /// The frame as of the most recent flush, indexed `[row][col]`.
    pub fn flushed_frame(&self) -> Vec<Vec<Color>> {
        self.state().flushed.clone()
    }

    pub fn brightness(&self) -> u32 {
        self.state().brightness
    }
}
