// src/display/mod.rs
//! Physical display abstraction.
//!
//! - DisplayDriver: hardware primitives (set pixel, flush, brightness)
//! - drivers: headless, console and LED strip implementations

pub mod driver;
pub mod drivers;

pub use driver::{DisplayDriver, DisplayError};
pub use drivers::{ConsoleDisplayDriver, HeadlessDisplayDriver, HeadlessMonitor, StripDisplayDriver};
