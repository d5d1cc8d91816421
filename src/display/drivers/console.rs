// src/display/drivers/console.rs

//! Renders the matrix into a terminal using 24-bit ANSI background colors.
//! Each matrix pixel becomes two character cells so it looks roughly square.

use crate::color::Color;
use crate::display::driver::{scale_channel, DisplayDriver, DisplayError};
use crate::geometry::Size;
use log::{debug, info, warn};
use std::io::Write;
use std::ops::RangeInclusive;

const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const CURSOR_HOME: &str = "\x1b[H";
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";
const SGR_RESET_ALL: &str = "\x1b[0m";
const PIXEL_CELLS: &str = "  ";

const MAX_BRIGHTNESS: u32 = 255;

pub struct ConsoleDisplayDriver<W: Write + Send> {
    out: W,
    size: Size,
    staged: Vec<[u8; 3]>,
    brightness: u32,
    first_frame: bool,
}

impl<W: Write + Send> ConsoleDisplayDriver<W> {
    pub fn new(out: W, size: Size) -> Self {
        info!("ConsoleDisplayDriver: {} matrix", size);
        Self {
            out,
            size,
            staged: vec![[0; 3]; size.area()],
            brightness: MAX_BRIGHTNESS,
            first_frame: true,
        }
    }

    /// Consumes the driver, restoring the cursor and returning the writer.
    pub fn into_inner(mut self) -> W {
        let restored = write!(self.out, "{}{}", SGR_RESET_ALL, CURSOR_SHOW)
            .and_then(|()| self.out.flush());
        if let Err(e) = restored {
            warn!("ConsoleDisplayDriver: failed to restore cursor: {}", e);
        }
        self.out
    }

    fn render(&mut self) -> std::io::Result<()> {
        if self.first_frame {
            write!(self.out, "{}{}", CURSOR_HIDE, CLEAR_SCREEN_AND_HOME)?;
            self.first_frame = false;
        } else {
            write!(self.out, "{}", CURSOR_HOME)?;
        }
        for row in self.staged.chunks(self.size.cols.max(1)) {
            for [r, g, b] in row {
                let (r, g, b) = (
                    scale_channel(*r, self.brightness, MAX_BRIGHTNESS),
                    scale_channel(*g, self.brightness, MAX_BRIGHTNESS),
                    scale_channel(*b, self.brightness, MAX_BRIGHTNESS),
                );
                write!(self.out, "\x1b[48;2;{};{};{}m{}", r, g, b, PIXEL_CELLS)?;
            }
            write!(self.out, "{}\r\n", SGR_RESET_ALL)?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> DisplayDriver for ConsoleDisplayDriver<W> {
    fn size(&self) -> Size {
        self.size
    }

    fn set_pixel(&mut self, col: usize, row: usize, color: &Color) {
        if col >= self.size.cols || row >= self.size.rows {
            return;
        }
        let [r, g, b, _] = color.channels_u8();
        self.staged[row * self.size.cols + col] = [r, g, b];
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.render()?;
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
        debug!("ConsoleDisplayDriver: brightness {}", value);
        self.brightness = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn flush_writes_one_line_per_row() {
        let mut driver = ConsoleDisplayDriver::new(Vec::new(), Size::new(2, 3));
        driver.set_pixel(1, 0, &Color::new(255.0, 0.0, 0.0));
        driver.flush().unwrap();
        let out = String::from_utf8(driver.into_inner()).unwrap();
        assert!(out.starts_with(CURSOR_HIDE));
        assert_eq!(out.matches("\r\n").count(), 3);
        assert!(out.contains("\x1b[48;2;255;0;0m"));
        assert_eq!(out.matches("\x1b[48;2;0;0;0m").count(), 5);
    }

    #[test]
    fn brightness_scales_rendered_channels() {
        let mut driver = ConsoleDisplayDriver::new(Vec::new(), Size::new(1, 1));
        driver.set_brightness(0).unwrap();
        driver.set_pixel(0, 0, &Color::new(255.0, 255.0, 255.0));
        driver.flush().unwrap();
        let out = String::from_utf8(driver.into_inner()).unwrap();
        assert!(out.contains("\x1b[48;2;0;0;0m"));
        assert!(!out.contains("255"));
    }

    /// Fails every write and flush, counting the attempts.
    struct BrokenPipe {
        attempts: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.attempts += 1;
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn into_inner_returns_writer_when_restore_fails() {
        let driver = ConsoleDisplayDriver::new(BrokenPipe { attempts: 0 }, Size::new(1, 1));
        let out = driver.into_inner();
        // The failed write stops the restore before the flush.
        assert_eq!(out.attempts, 1);
    }

    #[test]
    fn rejects_brightness_above_range() {
        let mut driver = ConsoleDisplayDriver::new(Vec::new(), Size::new(1, 1));
        assert!(driver.set_brightness(256).is_err());
        assert_eq!(driver.brightness(), MAX_BRIGHTNESS);
    }
}
