// src/color.rs

//! Defines the `Color` value type, its normalized/denormalized representations
//! and the packed-integer layouts expected by display hardware.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;


/// Largest channel value in the denormalized (integer) representation.
pub const CHANNEL_MAX: f64 = 255.0;

// Products within this distance of a whole number are snapped before
// truncation, so `200 / 255 * 255` comes back as 200 rather than 199.
const DENORMALIZE_SNAP: f64 = 1e-9;

/// Channel order used when packing a color into a single integer.
///
/// This is a contract with the display driver. Strips wired as GRB need
/// `Wgrb`/`Grb`; the historical default is `Wrgb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelLayout {
    /// `white << 24 | red << 16 | green << 8 | blue`
    #[default]
    Wrgb,
    /// `white << 24 | green << 16 | red << 8 | blue`
    Wgrb,
    /// `red << 16 | green << 8 | blue`. White is dropped.
    Rgb,
    /// `green << 16 | red << 8 | blue`. White is dropped.
    Grb,
}

impl PixelLayout {
    /// Packs denormalized `[r, g, b, w]` channels according to this layout.
    pub fn pack(self, [r, g, b, w]: [u8; 4]) -> u32 {
        let (r, g, b, w) = (r as u32, g as u32, b as u32, w as u32);
        match self {
            PixelLayout::Wrgb => w << 24 | r << 16 | g << 8 | b,
            PixelLayout::Wgrb => w << 24 | g << 16 | r << 8 | b,
            PixelLayout::Rgb => r << 16 | g << 8 | b,
            PixelLayout::Grb => g << 16 | r << 8 | b,
        }
    }
}

/// The channels of a color, with or without a white channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Components {
    Rgb(f64, f64, f64),
    Rgbw(f64, f64, f64, f64),
}

/// An immutable RGB(W) color.
///
/// Channels are stored as given and coerced on read: a normalized color
/// reports each channel clamped to `[0.0, 1.0]`, a denormalized color
/// reports each channel clamped to `[0, 255]` and truncated to a whole
/// number. A missing white channel marks the color as RGB-only.
///
/// Equality compares like-for-like: a normalized color is never equal to a
/// denormalized one, even if they look the same. Use
/// [`Color::visually_eq`] to compare across representations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    white: Option<f64>,
    normalized: bool,
}

impl Color {
    /// Fully off, with an explicit zero white channel. Used to reset
    /// the matrix frame buffer and to clear tiles.
    pub const OFF: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
        white: Some(0.0),
        normalized: true,
    };

    /// RGB color. Normalization is inferred: any channel above 1 means
    /// the values are on the 0-255 scale.
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self::from_parts(red, green, blue, None, None)
    }

    /// RGBW color, normalization inferred as for [`Color::new`].
    pub fn rgbw(red: f64, green: f64, blue: f64, white: f64) -> Self {
        Self::from_parts(red, green, blue, Some(white), None)
    }

    /// Full constructor. `normalized` overrides inference when given; it
    /// does not rescale the values, only declares how to read them.
    pub fn from_parts(
        red: f64,
        green: f64,
        blue: f64,
        white: Option<f64>,
        normalized: Option<bool>,
    ) -> Self {
        let normalized = normalized.unwrap_or_else(|| {
            ![red, green, blue, white.unwrap_or(0.0)]
                .iter()
                .any(|v| *v > 1.0)
        });
        Color {
            red,
            green,
            blue,
            white,
            normalized,
        }
    }

    /// A random normalized RGBW color.
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Color {
            red: rng.gen(),
            green: rng.gen(),
            blue: rng.gen(),
            white: Some(rng.gen()),
            normalized: true,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn is_rgbw(&self) -> bool {
        self.white.is_some()
    }

    pub fn red(&self) -> f64 {
        self.coerce(self.red)
    }

    pub fn green(&self) -> f64 {
        self.coerce(self.green)
    }

    pub fn blue(&self) -> f64 {
        self.coerce(self.blue)
    }

    /// The white channel, or `None` for an RGB-only color.
    pub fn white(&self) -> Option<f64> {
        self.white.map(|w| self.coerce(w))
    }

    pub fn components(&self) -> Components {
        match self.white() {
            Some(w) => Components::Rgbw(self.red(), self.green(), self.blue(), w),
            None => Components::Rgb(self.red(), self.green(), self.blue()),
        }
    }

    /// The same color on the `[0.0, 1.0]` scale. Identity if already normalized.
    pub fn to_normalized(&self) -> Color {
        if self.normalized {
            return *self;
        }
        let scale = |v: f64| v / CHANNEL_MAX;
        Color {
            red: scale(self.red()),
            green: scale(self.green()),
            blue: scale(self.blue()),
            white: self.white().map(scale),
            normalized: true,
        }
    }

    /// The same color on the `[0, 255]` scale. Identity if already denormalized.
    pub fn to_denormalized(&self) -> Color {
        if !self.normalized {
            return *self;
        }
        Color {
            red: denormalize(self.red()),
            green: denormalize(self.green()),
            blue: denormalize(self.blue()),
            white: self.white().map(denormalize),
            normalized: false,
        }
    }

    /// Denormalized `[r, g, b, w]` channels. White is 0 for RGB-only colors.
    pub fn channels_u8(&self) -> [u8; 4] {
        let d = self.to_denormalized();
        [
            d.red() as u8,
            d.green() as u8,
            d.blue() as u8,
            d.white().unwrap_or(0.0) as u8,
        ]
    }

    /// Bit-packs the denormalized channels in the given driver layout.
    pub fn as_packed_int(&self, layout: PixelLayout) -> u32 {
        layout.pack(self.channels_u8())
    }

    /// Compares the 0-255 channels regardless of representation. A missing
    /// white channel counts as zero.
    pub fn visually_eq(&self, other: &Color) -> bool {
        self.channels_u8() == other.channels_u8()
    }

    fn coerce(&self, value: f64) -> f64 {
        let value = if value.is_nan() { 0.0 } else { value };
        if self.normalized {
            value.clamp(0.0, 1.0)
        } else {
            value.clamp(0.0, CHANNEL_MAX).trunc()
        }
    }
}

fn denormalize(value: f64) -> f64 {
    let scaled = value * CHANNEL_MAX;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < DENORMALIZE_SNAP {
        nearest
    } else {
        scaled.trunc()
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::OFF
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
            && self.red() == other.red()
            && self.green() == other.green()
            && self.blue() == other.blue()
            && self.white() == other.white()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = |v: f64| {
            if self.normalized {
                let s = format!("{:.5}", v);
                let s = s.trim_end_matches('0').trim_end_matches('.');
                s.to_string()
            } else {
                format!("{}", v as i64)
            }
        };
        write!(
            f,
            "Color(red={}, green={}, blue={}",
            channel(self.red()),
            channel(self.green()),
            channel(self.blue())
        )?;
        if let Some(w) = self.white() {
            write!(f, ", white={}", channel(w))?;
        }
        write!(f, ", normalized={})", self.normalized)
    }
}
