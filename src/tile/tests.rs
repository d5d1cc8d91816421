// src/tile/tests.rs

//! Unit tests for `Tile`, its painters and the canvas.

use super::*;
use serde_json::json;
use std::sync::Arc;
use std::thread;
use test_log::test;

// --- Test Helpers ---

fn red() -> Color {
    Color::new(128.0, 0.0, 0.0)
}

fn assert_all(tile: &Tile, expected: Color) {
    for (row_num, row) in tile.pixels().iter().enumerate() {
        for (col_num, pixel) in row.iter().enumerate() {
            assert_eq!(*pixel, expected, "pixel ({}, {})", col_num, row_num);
        }
    }
}

/// Paints the whole tile in the color it receives as data.
struct SolidPainter;

impl Painter<Color> for SolidPainter {
    fn draw(&mut self, canvas: &mut Canvas<'_>, data: Option<&Color>) {
        let Some(color) = data else { return };
        canvas.fill(*color);
    }
}

/// Counts hook calls and remembers the last size it was given.
struct SizeRecorder {
    sizes: Arc<std::sync::Mutex<Vec<Size>>>,
}

impl Painter<Value> for SizeRecorder {
    fn on_size_set(&mut self, size: Size) {
        self.sizes.lock().unwrap().push(size);
    }
}

/// Stops accepting data for `frames` draws after receiving some, like a
/// scroller running through a message.
struct SequencePainter {
    remaining: usize,
    frames: usize,
}

impl Painter<String> for SequencePainter {
    fn draw(&mut self, canvas: &mut Canvas<'_>, data: Option<&String>) {
        if data.is_none() {
            return;
        }
        if self.remaining == 0 {
            if !canvas.is_accepting_data() {
                canvas.set_accepting_data(true);
                return;
            }
            self.remaining = self.frames;
            canvas.set_accepting_data(false);
        }
        self.remaining -= 1;
        let col = (self.frames - self.remaining - 1) as i32;
        canvas.set_pixel((col, 0), Color::new(1.0, 1.0, 1.0));
    }
}

// --- Construction ---

#[test]
fn new_tile_is_one_by_one() {
    let tile: Tile = Tile::new();
    assert_eq!(tile.size(), Size::new(1, 1));
    assert_eq!(tile.pixels().len(), 1);
    assert_eq!(tile.pixels()[0].len(), 1);
    assert!(tile.is_accepting_data());
    assert!(tile.visible());
    assert!(!tile.animate());
    assert_eq!(tile.data(), None);
}

#[test]
fn generic_tiles_get_distinct_random_defaults() {
    let a: Tile = Tile::new();
    let b: Tile = Tile::new();
    assert!(a.default_color().is_rgbw());
    // Two random RGBW colors colliding on every channel is not a realistic outcome.
    assert_ne!(a.default_color(), b.default_color());
}

#[test]
fn custom_tiles_default_to_off() {
    let tile: Tile<Color> = Tile::custom(SolidPainter).build();
    assert_eq!(tile.default_color(), Color::OFF);
    assert_eq!(tile.pixels()[0][0], Color::OFF);
}

#[test]
fn explicit_default_color_fills_pixels() {
    let color = Color::new(0.0, 0.5, 1.0);
    let tile: Tile = Tile::generic().default_color(color).build();
    assert_eq!(tile.default_color(), color);
    assert_eq!(tile.pixels()[0][0], color);
    assert_eq!(tile.pixels()[0][0].white(), None);
}

// --- Size ---

#[test]
fn set_size_reallocates_with_default_color() {
    let tile: Tile = Tile::generic().default_color(red()).build();
    tile.set_pixel((0, 0), Color::OFF);
    tile.set_size(Size::new(10, 5));
    assert_eq!(tile.size(), Size::new(10, 5));
    let pixels = tile.pixels();
    assert_eq!(pixels.len(), 5);
    assert!(pixels.iter().all(|row| row.len() == 10));
    assert_all(&tile, red());
}

#[test]
fn degenerate_size_gives_empty_buffer() {
    let tile: Tile = Tile::new();
    tile.set_size(Size::new(0, 0));
    assert!(tile.pixels().is_empty());
    tile.set_pixel((0, 0), red());
    tile.draw();
}

#[test]
fn size_hook_runs_on_every_resize() {
    let sizes = Arc::new(std::sync::Mutex::new(Vec::new()));
    let tile = Tile::custom(SizeRecorder {
        sizes: Arc::clone(&sizes),
    })
    .build();
    tile.set_size(Size::new(4, 4));
    tile.set_size(Size::new(8, 2));
    assert_eq!(
        *sizes.lock().unwrap(),
        vec![Size::new(1, 1), Size::new(4, 4), Size::new(8, 2)]
    );
}

// --- Pixels ---

#[test]
fn set_pixel_writes_single_cells() {
    let tile: Tile = Tile::generic().default_color(red()).build();
    tile.set_size(Size::new(10, 5));
    let special = Color::new(99.0, 99.0, 99.0);
    tile.set_pixel((1, 1), special);
    tile.set_pixel(Position::new(2, 2), special);

    for (row_num, row) in tile.pixels().iter().enumerate() {
        for (col_num, pixel) in row.iter().enumerate() {
            if [(1, 1), (2, 2)].contains(&(col_num, row_num)) {
                assert_eq!(*pixel, special);
            } else {
                assert_eq!(*pixel, red());
            }
        }
    }
}

#[test]
fn out_of_range_set_pixel_is_ignored() {
    let tile: Tile = Tile::generic().default_color(red()).build();
    tile.set_size(Size::new(3, 3));
    tile.set_pixel((999, -999), Color::OFF);
    tile.set_pixel((-1, 0), Color::OFF);
    tile.set_pixel((3, 0), Color::OFF);
    tile.set_pixel((0, 3), Color::OFF);
    assert_all(&tile, red());
}

#[test]
fn clear_ignores_default_color() {
    let tile: Tile = Tile::generic().default_color(red()).build();
    tile.set_size(Size::new(10, 5));
    tile.clear();
    for row in tile.pixels() {
        for pixel in row {
            assert_eq!(pixel.red(), 0.0);
            assert_eq!(pixel.green(), 0.0);
            assert_eq!(pixel.blue(), 0.0);
            assert_eq!(pixel.white(), Some(0.0));
        }
    }
}

#[test]
fn default_draw_repaints_default_color() {
    let tile: Tile = Tile::generic().default_color(red()).build();
    tile.set_size(Size::new(2, 2));
    tile.clear();
    let replacement = Color::new(0.1, 0.2, 0.3);
    tile.set_default_color(replacement);
    tile.draw();
    assert_all(&tile, replacement);
}

// --- Data ---

#[test]
fn data_accepts_arbitrary_values() {
    let tile: Tile = Tile::new();
    for payload in [json!(99), json!("something"), json!([1, 2, 3]), json!({"a": 1, "b": 2})] {
        assert!(tile.set_data(payload.clone()));
        assert_eq!(tile.data(), Some(payload));
    }
    assert_eq!(tile.take_data(), Some(json!({"a": 1, "b": 2})));
    assert_eq!(tile.data(), None);
}

#[test]
fn busy_tile_declines_data_but_still_reports_it() {
    let tile: Tile = Tile::new();
    tile.set_data(json!("first"));
    tile.set_accepting_data(false);
    assert!(!tile.set_data(json!("second")));
    assert_eq!(tile.data(), Some(json!("first")));
    tile.set_accepting_data(true);
    assert!(tile.set_data(json!("third")));
    assert_eq!(tile.data(), Some(json!("third")));
}

#[test]
fn painter_draws_from_data() {
    let tile = Tile::custom(SolidPainter).build();
    tile.set_size(Size::new(3, 2));
    // No data yet: the painter leaves the buffer alone.
    tile.draw();
    assert!(tile.pixels().iter().flatten().all(|c| *c == Color::OFF));

    let blue = Color::new(0.0, 0.0, 200.0);
    tile.set_data(blue);
    tile.draw();
    assert!(tile.pixels().iter().flatten().all(|c| *c == blue));
}

#[test]
fn painter_can_gate_input_during_a_sequence() {
    let tile = Tile::custom(SequencePainter {
        remaining: 0,
        frames: 3,
    })
    .build();
    tile.set_size(Size::new(3, 1));
    tile.set_data("hello".to_string());

    tile.draw();
    assert!(!tile.is_accepting_data());
    assert!(!tile.set_data("ignored".to_string()));
    tile.draw();
    tile.draw();
    assert_eq!(tile.data().as_deref(), Some("hello"));
    assert!(tile.pixels()[0].iter().all(|c| *c == Color::new(1.0, 1.0, 1.0)));

    // Sequence finished: the next draw reopens the tile.
    tile.draw();
    assert!(tile.is_accepting_data());
    assert!(tile.set_data("next".to_string()));
}

// --- Flags ---

#[test]
fn typed_flag_setters() {
    let tile: Tile = Tile::generic().animate(true).visible(false).build();
    assert!(tile.animate());
    assert!(!tile.visible());
    tile.set_animate(false);
    tile.set_visible(true);
    assert!(!tile.flag(TileFlag::Animate));
    assert!(tile.flag(TileFlag::Visible));
}

#[test]
fn non_boolean_flag_value_is_rejected() {
    let tile: Tile = Tile::new();
    tile.set_animate(true);

    let err = tile
        .set_flag_value(TileFlag::Animate, &json!("yes"))
        .unwrap_err();
    assert!(matches!(err, TilesError::InvalidArgument { name: "animate", .. }));
    assert!(tile.animate());

    for flag in [TileFlag::Visible, TileFlag::AcceptingData] {
        assert!(tile.set_flag_value(flag, &json!(1)).is_err());
        assert!(tile.set_flag_value(flag, &Value::Null).is_err());
        assert!(tile.flag(flag));
    }
}

#[test]
fn boolean_flag_values_are_applied() {
    let tile: Tile = Tile::new();
    tile.set_flag_value(TileFlag::Visible, &json!(false)).unwrap();
    tile.set_flag_value(TileFlag::AcceptingData, &json!(false)).unwrap();
    tile.set_flag_value(TileFlag::Animate, &json!(true)).unwrap();
    assert!(!tile.visible());
    assert!(!tile.is_accepting_data());
    assert!(tile.animate());
}

// --- Compositor access ---

#[test]
fn with_frame_skips_hidden_and_redraws_animated_tiles() {
    let tile = Tile::custom(SolidPainter).build();
    tile.set_size(Size::new(2, 2));
    let green = Color::new(0.0, 128.0, 0.0);
    tile.set_data(green);

    // Not animating: pixels are whatever was last drawn.
    let first = tile.with_frame(|buf| *buf.get(Position::ORIGIN).unwrap());
    assert_eq!(first, Some(Color::OFF));

    tile.set_animate(true);
    let second = tile.with_frame(|buf| *buf.get(Position::ORIGIN).unwrap());
    assert_eq!(second, Some(green));

    tile.set_visible(false);
    assert_eq!(tile.with_frame(|_| ()), None);
}

// --- Concurrency ---

#[test]
fn concurrent_draw_and_data_do_not_tear() {
    let tile = Arc::new(Tile::custom(SolidPainter).build());
    tile.set_size(Size::new(8, 8));
    tile.set_animate(true);

    let drawer = {
        let tile = Arc::clone(&tile);
        thread::spawn(move || {
            for _ in 0..200 {
                tile.with_frame(|buf| {
                    let first = *buf.get(Position::ORIGIN).unwrap();
                    assert!(buf.rows().flatten().all(|c| *c == first));
                });
            }
        })
    };

    for i in 0..200 {
        tile.set_data(Color::new(i as f64 % 256.0, 0.0, 0.0));
    }
    drawer.join().unwrap();
}
