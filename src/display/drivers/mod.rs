// src/display/drivers/mod.rs
//! Bundled display driver implementations.

pub mod console;
pub mod headless;
pub mod strip;

pub use console::ConsoleDisplayDriver;
pub use headless::{HeadlessDisplayDriver, HeadlessMonitor};
pub use strip::StripDisplayDriver;
