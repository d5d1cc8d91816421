// src/main.rs

//! Demo: three speckled tiles on one matrix. Every second each tile gets a
//! new base color and the brightness changes. The top-left tile animates,
//! the others only change when redrawn explicitly.

use anyhow::Context;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs::OpenOptions;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tile_matrix::config::{DriverKind, CONFIG};
use tile_matrix::display::{ConsoleDisplayDriver, HeadlessDisplayDriver, StripDisplayDriver};
use tile_matrix::{Canvas, Color, DisplayDriver, Painter, Size, Tile, TileManager};

const DEFAULT_MATRIX_SIZE: Size = Size { cols: 8, rows: 8 };
const DEFAULT_FPS: f64 = 10.0;
const DEMO_ROUNDS: usize = 10;
const ROUND_DELAY: Duration = Duration::from_secs(1);
const BRIGHTNESS_STEPS: [u32; 7] = [2, 4, 8, 16, 32, 64, 128];

/// Paints every pixel as the payload color at a random 40-100% intensity.
struct Speckled;

impl Painter<Color> for Speckled {
    fn draw(&mut self, canvas: &mut Canvas<'_>, data: Option<&Color>) {
        let Some(base) = data.map(Color::to_normalized) else {
            return;
        };
        let mut rng = rand::thread_rng();
        let size = canvas.size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                let intensity: f64 = rng.gen_range(0.4..=1.0);
                let color = Color::from_parts(
                    base.red() * intensity,
                    base.green() * intensity,
                    base.blue() * intensity,
                    None,
                    Some(true),
                );
                canvas.set_pixel((col as i32, row as i32), color);
            }
        }
    }
}

fn build_driver(size: Size) -> anyhow::Result<Box<dyn DisplayDriver>> {
    let output = &CONFIG.output;
    let driver: Box<dyn DisplayDriver> = match output.driver {
        DriverKind::Console => Box::new(ConsoleDisplayDriver::new(std::io::stdout(), size)),
        DriverKind::Headless => Box::new(HeadlessDisplayDriver::new(size)),
        DriverKind::Strip => {
            let path = output
                .device
                .as_ref()
                .context("output.device must be set for the strip driver")?;
            let device = OpenOptions::new()
                .write(true)
                .open(path)
                .with_context(|| format!("Failed to open strip device {}", path.display()))?;
            Box::new(StripDisplayDriver::new(device, size, output.layout, 255))
        }
    };
    Ok(driver)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting tile-matrix demo...");

    let size = CONFIG.matrix.size().unwrap_or(DEFAULT_MATRIX_SIZE);
    let fps = CONFIG.matrix.target_fps.unwrap_or(DEFAULT_FPS);
    let driver = build_driver(size).context("Failed to initialize display driver")?;

    let mut manager: TileManager<Color> = TileManager::builder()
        .config(&CONFIG)
        .size(size)
        .target_fps(Some(fps))
        .boxed_driver(driver)
        .build()
        .context("Failed to build tile manager")?;

    let tiles = [
        Arc::new(Tile::custom(Speckled).name("speckled-1").animate(true).build()),
        Arc::new(Tile::custom(Speckled).name("speckled-2").build()),
        Arc::new(Tile::custom(Speckled).name("speckled-3").build()),
    ];
    let half = Size::new(size.cols / 2, size.rows / 2);
    manager.register_tile(Arc::clone(&tiles[0]), half, (0, 0))?;
    manager.register_tile(Arc::clone(&tiles[1]), half, (half.cols as i32, 0))?;
    manager.register_tile(
        Arc::clone(&tiles[2]),
        Size::new(size.cols, size.rows - half.rows),
        (0, half.rows as i32),
    )?;

    manager.trigger_draw()?;

    let mut rng = rand::thread_rng();
    for round in 0..DEMO_ROUNDS {
        if let Some(brightness) = BRIGHTNESS_STEPS.choose(&mut rng) {
            if let Err(e) = manager.set_brightness(*brightness) {
                warn!("Demo: could not set brightness {}: {}", brightness, e);
            }
        }
        for tile in &tiles {
            tile.set_data(Color::random_with(&mut rng));
            tile.draw();
        }
        info!("Demo: round {}/{}", round + 1, DEMO_ROUNDS);
        thread::sleep(ROUND_DELAY);
    }

    manager.stop_drawing()?;
    manager.clear_display()?;
    info!("Demo finished.");
    Ok(())
}
