// src/manager.rs

//! TileManager - registers tiles at positions in the matrix, fans data out
//! to them, composites their pixels into one frame buffer and pushes that
//! buffer to the display driver, either on demand or from the animation
//! scheduler.
//!
//! Lock order is registrations, then frame buffer, then driver. Every
//! compositing pass holds the registrations lock from snapshot to swap, so
//! passes never interleave. Tile locks are taken under the registrations
//! lock, never the other way round.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::config::Config;
use crate::display::DisplayDriver;
use crate::error::{Result, TilesError};
use crate::geometry::{Position, Size};
use crate::scheduler::{self, Scheduler, DEFAULT_POLL_INTERVAL};
use crate::tile::Tile;
use log::{debug, info, trace};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

mod compositor;

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A tile bound to the top-left position it occupies in the matrix.
pub struct Registration<D> {
    tile: Arc<Tile<D>>,
    offset: Position,
}

impl<D> Registration<D> {
    pub fn tile(&self) -> &Arc<Tile<D>> {
        &self.tile
    }

    pub fn offset(&self) -> Position {
        self.offset
    }
}

impl<D> Clone for Registration<D> {
    fn clone(&self) -> Self {
        Registration {
            tile: Arc::clone(&self.tile),
            offset: self.offset,
        }
    }
}

impl<D> fmt::Debug for Registration<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("tile", &self.tile.name())
            .field("offset", &self.offset)
            .finish()
    }
}

/// State shared between the caller's thread and the scheduler thread.
struct Shared<D> {
    matrix: Size,
    registrations: Mutex<Vec<Registration<D>>>,
    frame: Mutex<PixelBuffer>,
    driver: Mutex<Box<dyn DisplayDriver>>,
}

impl<D> Shared<D> {
    fn snapshot(&self) -> Vec<Registration<D>> {
        lock(&self.registrations).clone()
    }

    /// Composites `registrations` and swaps the result into the frame
    /// buffer. The caller holds the registrations lock.
    fn composite_into_frame(
        &self,
        registrations: &[Registration<D>],
    ) -> Result<MutexGuard<'_, PixelBuffer>> {
        let composed = compositor::composite(registrations, self.matrix)?;
        let mut frame = lock(&self.frame);
        *frame = composed;
        Ok(frame)
    }

    fn set_pixels_from_tiles(&self) -> Result<()> {
        let registrations = lock(&self.registrations);
        self.composite_into_frame(&registrations)?;
        Ok(())
    }

    /// One compositing pass followed by a flush of the result.
    fn draw_hardware_matrix(&self) -> Result<()> {
        let registrations = lock(&self.registrations);
        let frame = self.composite_into_frame(&registrations)?;
        drop(registrations);
        let mut driver = lock(&self.driver);
        for (row_num, row) in frame.rows().enumerate() {
            for (col_num, color) in row.iter().enumerate() {
                driver.set_pixel(col_num, row_num, color);
            }
        }
        driver.flush()?;
        trace!("TileManager: frame flushed");
        Ok(())
    }
}

/// Manages all the tiles shown on one display.
///
/// With a target frame rate, the first [`TileManager::trigger_draw`] starts
/// a background thread that redraws animating tiles and flushes the matrix
/// at that rate until [`TileManager::stop_drawing`] or drop. Without one,
/// every `trigger_draw` does a single synchronous pass.
pub struct TileManager<D = Value> {
    shared: Arc<Shared<D>>,
    target_fps: Option<f64>,
    scheduler: Scheduler,
}

impl TileManager {
    pub fn builder() -> TileManagerBuilder {
        TileManagerBuilder::new()
    }
}

impl<D: Clone + Send + 'static> TileManager<D> {
    /// Assigns `size` to the tile, places its top-left corner at `offset`
    /// and recomposites, so `pixels()` reflects the new tile immediately.
    ///
    /// The new layout is composited before the registration becomes
    /// visible to the scheduler. If that pass fails (e.g. the tile overruns
    /// the matrix) nothing is registered, the tile gets its previous size
    /// back and the frame buffer is left as it was.
    pub fn register_tile(
        &self,
        tile: Arc<Tile<D>>,
        size: Size,
        offset: impl Into<Position>,
    ) -> Result<()> {
        let offset = offset.into();
        let mut registrations = lock(&self.shared.registrations);
        let previous_size = tile.size();
        tile.set_size(size);

        let mut candidate = registrations.clone();
        candidate.push(Registration {
            tile: Arc::clone(&tile),
            offset,
        });
        if let Err(e) = self.shared.composite_into_frame(&candidate) {
            if previous_size != size {
                tile.set_size(previous_size);
            }
            return Err(e);
        }
        *registrations = candidate;
        drop(registrations);

        info!(
            "TileManager: registered tile '{}' ({}) at {}",
            tile.name(),
            size,
            offset
        );
        Ok(())
    }

    /// Removes every registration of `tile` and returns how many there were.
    /// Removing the last tile stops the scheduler; an error the scheduler
    /// died with is returned here.
    pub fn deregister_tile(&mut self, tile: &Arc<Tile<D>>) -> Result<usize> {
        let (removed, remaining) = {
            let mut registrations = lock(&self.shared.registrations);
            let before = registrations.len();
            registrations.retain(|r| !Arc::ptr_eq(&r.tile, tile));
            (before - registrations.len(), registrations.len())
        };
        info!(
            "TileManager: deregistered tile '{}' ({} registrations)",
            tile.name(),
            removed
        );

        if remaining == 0 && self.scheduler.is_running() {
            debug!("TileManager: no tiles left, stopping scheduler");
            self.scheduler.stop()?;
        }
        Ok(removed)
    }

    /// Offers `payload` to every registered tile. Tiles that are not
    /// accepting data ignore it.
    pub fn send_data_to_tiles(&self, payload: D) {
        let registrations = self.shared.snapshot();
        let accepted = registrations
            .iter()
            .filter(|r| r.tile.set_data(payload.clone()))
            .count();
        trace!(
            "TileManager: data accepted by {}/{} tiles",
            accepted,
            registrations.len()
        );
    }

    /// Updates the display.
    ///
    /// Without a target frame rate this composites and flushes once, before
    /// returning. With one, it makes sure the scheduler is running.
    pub fn trigger_draw(&mut self) -> Result<()> {
        match self.target_fps {
            None => self.shared.draw_hardware_matrix(),
            Some(fps) => {
                if self.scheduler.is_running() {
                    return Ok(());
                }
                let shared = Arc::clone(&self.shared);
                self.scheduler
                    .start(fps, move || shared.draw_hardware_matrix())
            }
        }
    }

    /// Composites and flushes once, regardless of the scheduler.
    pub fn draw_frame(&self) -> Result<()> {
        self.shared.draw_hardware_matrix()
    }
}

impl<D> TileManager<D> {
    /// Rebuilds the frame buffer from the tiles without touching the display.
    pub fn set_pixels_from_tiles(&self) -> Result<()> {
        self.shared.set_pixels_from_tiles()
    }

    /// Stops automatic drawing, returning any error the scheduler died with.
    pub fn stop_drawing(&mut self) -> Result<()> {
        self.scheduler.stop()
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn target_fps(&self) -> Option<f64> {
        self.target_fps
    }

    pub fn matrix_size(&self) -> Size {
        self.shared.matrix
    }

    /// Copy of the composited frame buffer, indexed `[row][col]`.
    pub fn pixels(&self) -> Vec<Vec<Color>> {
        lock(&self.shared.frame).to_rows()
    }

    /// Registered tiles in registration order.
    pub fn tiles(&self) -> Vec<Arc<Tile<D>>> {
        lock(&self.shared.registrations)
            .iter()
            .map(|r| Arc::clone(&r.tile))
            .collect()
    }

    pub fn registrations(&self) -> Vec<Registration<D>> {
        self.shared.snapshot()
    }

    /// Turns every physical pixel off and flushes. Tiles and the frame
    /// buffer are left alone.
    pub fn clear_display(&self) -> Result<()> {
        let mut driver = lock(&self.shared.driver);
        let size = driver.size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                driver.set_pixel(col, row, &Color::OFF);
            }
        }
        driver.flush()?;
        debug!("TileManager: display cleared");
        Ok(())
    }

    pub fn brightness(&self) -> u32 {
        lock(&self.shared.driver).brightness()
    }

    /// Sets the display brightness. Values outside the driver's range are
    /// rejected and the brightness is unchanged.
    pub fn set_brightness(&self, value: u32) -> Result<()> {
        let mut driver = lock(&self.shared.driver);
        let range = driver.brightness_range();
        if !range.contains(&value) {
            return Err(TilesError::invalid_argument(
                "brightness",
                format!("{} is outside {}-{}", value, range.start(), range.end()),
            ));
        }
        driver.set_brightness(value)?;
        debug!("TileManager: brightness {}", value);
        Ok(())
    }

    /// Sets brightness from an untyped value. Anything but a non-negative
    /// integer within the driver's range is rejected.
    pub fn set_brightness_value(&self, value: &Value) -> Result<()> {
        let number = value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                TilesError::invalid_argument(
                    "brightness",
                    format!("expected a non-negative integer, got {}", value),
                )
            })?;
        self.set_brightness(number)
    }
}

impl<D> fmt::Display for TileManager<D> {
    /// One line per matrix row, each pixel as `[index] r,g,b,w`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = lock(&self.shared.frame);
        let mut pixel_num = 0;
        let mut lines = Vec::with_capacity(frame.size().rows);
        for row in frame.rows() {
            let mut line = String::new();
            for color in row {
                let [r, g, b, w] = color.channels_u8();
                line.push_str(&format!("[{:2}] {:3},{:3},{:3},{:3}  ", pixel_num, r, g, b, w));
                pixel_num += 1;
            }
            lines.push(line);
        }
        write!(f, "{}", lines.join("\n").trim_end())
    }
}

impl<D> fmt::Debug for TileManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileManager")
            .field("matrix", &self.shared.matrix)
            .field("target_fps", &self.target_fps)
            .field("tiles", &lock(&self.shared.registrations).len())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

/// Validates and assembles a [`TileManager`].
pub struct TileManagerBuilder {
    driver: Option<Box<dyn DisplayDriver>>,
    size: Option<Size>,
    target_fps: Option<f64>,
    brightness: Option<u32>,
    poll_interval: Duration,
}

impl Default for TileManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TileManagerBuilder {
    pub fn new() -> Self {
        TileManagerBuilder {
            driver: None,
            size: None,
            target_fps: None,
            brightness: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn driver(self, driver: impl DisplayDriver + 'static) -> Self {
        self.boxed_driver(Box::new(driver))
    }

    pub fn boxed_driver(mut self, driver: Box<dyn DisplayDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Matrix size. Defaults to the driver's size; may be smaller.
    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Redraw automatically at this rate. `None` (the default) leaves every
    /// redraw to the caller.
    pub fn target_fps(mut self, fps: Option<f64>) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn brightness(mut self, brightness: u32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Applies the matrix and scheduler sections of `config`.
    pub fn config(mut self, config: &Config) -> Self {
        if let Some(size) = config.matrix.size() {
            self.size = Some(size);
        }
        self.target_fps = config.matrix.target_fps;
        if let Some(brightness) = config.matrix.brightness {
            self.brightness = Some(brightness);
        }
        self.poll_interval = config.scheduler.poll_interval();
        self
    }

    pub fn build<D: Clone + Send + 'static>(self) -> Result<TileManager<D>> {
        let driver = self.driver.ok_or_else(|| {
            TilesError::Configuration("a display driver must be specified".to_string())
        })?;
        let driver_size = driver.size();
        let matrix = self.size.unwrap_or(driver_size);

        if matrix.is_empty() {
            return Err(TilesError::Configuration(format!(
                "matrix size {} has no pixels",
                matrix
            )));
        }
        if matrix.cols > driver_size.cols || matrix.rows > driver_size.rows {
            return Err(TilesError::Configuration(format!(
                "matrix size {} exceeds the {} display",
                matrix, driver_size
            )));
        }
        if let Some(fps) = self.target_fps {
            if scheduler::frame_delay(fps).is_none() {
                return Err(TilesError::Configuration(format!(
                    "target_fps must be a positive frame rate, got {}",
                    fps
                )));
            }
        }

        let manager = TileManager {
            shared: Arc::new(Shared {
                matrix,
                registrations: Mutex::new(Vec::new()),
                frame: Mutex::new(PixelBuffer::new(matrix, Color::OFF)),
                driver: Mutex::new(driver),
            }),
            target_fps: self.target_fps,
            scheduler: Scheduler::new(self.poll_interval),
        };
        if let Some(brightness) = self.brightness {
            manager.set_brightness(brightness)?;
        }

        info!(
            "TileManager: {} matrix, {}",
            matrix,
            match self.target_fps {
                Some(fps) => format!("animating at {} fps", fps),
                None => "manual drawing".to_string(),
            }
        );
        Ok(manager)
    }
}
