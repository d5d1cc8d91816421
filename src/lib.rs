// src/lib.rs

//! Tile compositing and animation for LED matrices.
//!
//! A [`TileManager`] owns a display driver and a set of [`Tile`]s, each
//! registered at a position in the matrix. Tiles paint their own pixels
//! (through a [`Painter`]), the manager composites them into a single frame
//! buffer and pushes it to the driver, either on demand or at a fixed frame
//! rate from a background thread.

pub mod buffer;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod scheduler;
pub mod tile;

pub use color::{Color, Components, PixelLayout};
pub use config::Config;
pub use display::{DisplayDriver, DisplayError};
pub use error::{Result, TilesError};
pub use geometry::{Position, Size};
pub use manager::{Registration, TileManager, TileManagerBuilder};
pub use scheduler::Scheduler;
pub use tile::{BlockPainter, Canvas, Painter, Tile, TileBuilder, TileFlag, TileKind};
