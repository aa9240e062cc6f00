//! Color representation and sampling utilities.
//!
//! This module provides the [`Color`] type used for glyph and mask fills,
//! plus the dominant-color sampling used to pre-fill a freshly selected
//! region's mask and text colors from the underlying page image.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::Rect;
use crate::utils::error::ColorError;

/// Quantization step applied to sampled channels before frequency counting.
///
/// Coarser buckets make the background color win the vote even on noisy
/// scans with slight gradients.
const QUANTIZE_STEP: f32 = 24.0;

/// An opaque RGB color.
///
/// Serializes as a `#rrggbb` hex string, the form the editing front ends
/// exchange and persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Default seed color for recognized text, a dark slate.
    pub const DEFAULT_TEXT: Color = Color {
        r: 0x1e,
        g: 0x29,
        b: 0x3b,
    };

    /// Default mask fill offered for a fresh selection before sampling runs.
    pub const DEFAULT_MASK: Color = Color {
        r: 0xf0,
        g: 0xf0,
        b: 0xf0,
    };

    #[inline]
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a color from a `#rrggbb` hex literal or an `rgb(r, g, b)`
    /// functional literal.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::Malformed`] when the literal matches neither
    /// form.
    pub fn parse(literal: &str) -> Result<Self, ColorError> {
        let malformed = || ColorError::Malformed {
            literal: literal.to_string(),
        };

        let trimmed = literal.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(malformed());
            }
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| malformed())?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| malformed())?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| malformed())?;
            return Ok(Self { r, g, b });
        }

        if let Some(body) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut channels = body.split(',').map(|part| part.trim().parse::<u8>());
            let r = channels.next().ok_or_else(malformed)?.map_err(|_| malformed())?;
            let g = channels.next().ok_or_else(malformed)?.map_err(|_| malformed())?;
            let b = channels.next().ok_or_else(malformed)?.map_err(|_| malformed())?;
            if channels.next().is_some() {
                return Err(malformed());
            }
            return Ok(Self { r, g, b });
        }

        Err(malformed())
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceptual brightness in `[0, 255]` using the ITU-R 601 luma weights.
    #[inline]
    #[must_use]
    pub fn brightness(self) -> f32 {
        (f32::from(self.r) * 299.0 + f32::from(self.g) * 587.0 + f32::from(self.b) * 114.0)
            / 1000.0
    }

    /// Picks black or white text for maximum contrast against `self` as a
    /// background.
    #[inline]
    #[must_use]
    pub fn contrasting_text(self) -> Color {
        if self.brightness() > 128.0 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    #[inline]
    #[must_use]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl From<Rgba<u8>> for Color {
    #[inline]
    fn from(pixel: Rgba<u8>) -> Self {
        Self {
            r: pixel.0[0],
            g: pixel.0[1],
            b: pixel.0[2],
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let literal = String::deserialize(deserializer)?;
        Color::parse(&literal).map_err(serde::de::Error::custom)
    }
}

/// Background and text colors sampled from a page image region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledColors {
    pub bg: Color,
    pub text: Color,
}

impl Default for SampledColors {
    fn default() -> Self {
        Self {
            bg: Color::DEFAULT_MASK,
            text: Color::BLACK,
        }
    }
}

/// Samples the dominant color inside `rect` on `image` and derives a
/// contrasting text color from it.
///
/// The rectangle interior is probed on a sparse grid (never more than a few
/// hundred reads regardless of area), each probe quantized to coarse RGB
/// buckets, and the most frequent bucket wins as the background color. Text
/// color is black on bright backgrounds and white on dark ones.
///
/// Degenerate rectangles and rectangles fully outside the image fall back to
/// [`SampledColors::default`].
#[must_use]
pub fn sample_colors(image: &RgbaImage, rect: &Rect) -> SampledColors {
    if rect.width < 3.0 || rect.height < 3.0 {
        return SampledColors::default();
    }

    let step = (rect.width.min(rect.height) / 25.0).floor().max(2.0);

    let mut counts: HashMap<(u8, u8, u8), u32> = HashMap::new();

    let mut sy = rect.y + 1.0;
    while sy < rect.bottom() - 1.0 {
        let mut sx = rect.x + 1.0;
        while sx < rect.right() - 1.0 {
            let px = sx.floor();
            let py = sy.floor();
            if px >= 0.0 && py >= 0.0 && (px as u32) < image.width() && (py as u32) < image.height()
            {
                let pixel = image.get_pixel(px as u32, py as u32);
                let key = (
                    quantize(pixel.0[0]),
                    quantize(pixel.0[1]),
                    quantize(pixel.0[2]),
                );
                *counts.entry(key).or_insert(0) += 1;
            }
            sx += step;
        }
        sy += step;
    }

    let dominant = counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|((r, g, b), _)| Color::new(r, g, b));

    match dominant {
        Some(bg) => SampledColors {
            bg,
            text: bg.contrasting_text(),
        },
        None => SampledColors::default(),
    }
}

#[inline]
fn quantize(channel: u8) -> u8 {
    let bucket = (f32::from(channel) / QUANTIZE_STEP).round() * QUANTIZE_STEP;
    bucket.min(255.0) as u8
}
