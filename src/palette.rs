// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The color palette and the smooth-coloring index computation.
//!
//! Palettes are persisted as a JSON array of packed integers, one per
//! color, laid out as `blue << 16 | green << 8 | red`.  Entry 0 is the
//! color of the set's interior.

use crate::constants::{COLOR_DENSITY, LOG_ESCAPE_RADIUS};
use crate::error::{MandelbrotError, Result};
use crate::pixel::PixelResult;
use image::Rgb;
use std::fs;
use std::path::Path;

const BUILTIN: &str = include_str!("../resources/color_scheme.json");

/// An immutable, ordered table of packed colors.  Construct it once
/// and lend it to every engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorPalette {
    colors: Vec<u32>,
}

impl ColorPalette {
    /// Fails if the palette is empty or any entry has bits set above
    /// the 24-bit color.
    pub fn new(colors: Vec<u32>) -> Result<Self> {
        if colors.is_empty() {
            return Err(MandelbrotError::EmptyPalette);
        }
        if let Some((index, &value)) = colors.iter().enumerate().find(|(_, &c)| c > 0x00ff_ffff) {
            return Err(MandelbrotError::InvalidColor { index, value });
        }
        Ok(ColorPalette { colors })
    }

    /// Parses a JSON array of packed colors.
    pub fn from_json(text: &str) -> Result<Self> {
        let colors: Vec<u32> = serde_json::from_str(text)?;
        ColorPalette::new(colors)
    }

    /// Reads a persisted palette from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        ColorPalette::from_json(&text)
    }

    /// The palette shipped with the crate.
    pub fn builtin() -> Result<Self> {
        ColorPalette::from_json(BUILTIN)
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a palette cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The packed colors in palette order.
    pub fn as_slice(&self) -> &[u32] {
        &self.colors
    }

    /// The color used for pixels that never escaped.
    pub fn interior(&self) -> u32 {
        self.colors[0]
    }

    /// The packed color for one escape-time result.
    pub fn color_for(&self, result: &PixelResult) -> u32 {
        if result.is_interior() {
            return self.interior();
        }
        let index = color_index(
            result.iterations,
            result.modulus,
            result.delta_magnitude,
            self.colors.len(),
        );
        self.colors[index]
    }
}

/// Scales the base density down as the region shrinks, so deep views
/// don't cycle through the palette too quickly.
pub fn density(delta_magnitude: f64) -> f64 {
    if delta_magnitude < 0.01 {
        COLOR_DENSITY / 4.0
    } else if delta_magnitude < 0.04 {
        COLOR_DENSITY / 3.0
    } else if delta_magnitude <= 0.2 {
        COLOR_DENSITY / 2.0
    } else {
        COLOR_DENSITY
    }
}

/// The smoothed, fractional iteration count of an escaped orbit.
pub fn hue(iterations: u32, modulus: f64) -> f64 {
    let log_z = modulus.log2();
    f64::from(iterations) + 1.0 - (log_z / LOG_ESCAPE_RADIUS).log2().abs()
}

/// The palette index for an escaped pixel, always within
/// `0..total_colors`.
pub fn color_index(iterations: u32, modulus: f64, delta_magnitude: f64, total_colors: usize) -> usize {
    let index = (density(delta_magnitude) * hue(iterations, modulus)).floor();
    let last = total_colors.saturating_sub(1);
    // NaN fails both comparisons and lands on zero.
    if index >= last as f64 {
        last
    } else if index > 0.0 {
        index as usize
    } else {
        0
    }
}

/// Splits a packed `blue << 16 | green << 8 | red` value into its
/// channels.
pub fn unpack(packed: u32) -> Rgb<u8> {
    Rgb([
        (packed & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        ((packed >> 16) & 0xff) as u8,
    ])
}

/// Packs channels into `blue << 16 | green << 8 | red`.
pub fn pack(color: Rgb<u8>) -> u32 {
    let Rgb([r, g, b]) = color;
    u32::from(b) << 16 | u32::from(g) << 8 | u32::from(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_ITERATIONS;
    use rand::Rng;

    #[test]
    fn empty_palette_is_rejected() {
        match ColorPalette::new(vec![]) {
            Err(MandelbrotError::EmptyPalette) => {}
            other => panic!("expected EmptyPalette, got {:?}", other),
        }
    }

    #[test]
    fn oversized_entry_is_rejected() {
        match ColorPalette::new(vec![0, 0x0100_0000]) {
            Err(MandelbrotError::InvalidColor { index: 1, .. }) => {}
            other => panic!("expected InvalidColor, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(ColorPalette::from_json("[1, 2, \"three\"]").is_err());
        assert!(ColorPalette::from_json("{}").is_err());
        assert!(ColorPalette::from_json("[]").is_err());
    }

    #[test]
    fn builtin_palette_loads() {
        let palette = ColorPalette::builtin().unwrap();
        assert_eq!(palette.len(), 515);
        assert_eq!(palette.interior(), 0);
    }

    #[test]
    fn unpack_reverses_byte_order() {
        assert_eq!(unpack(0x00ca_e43e), Rgb([0x3e, 0xe4, 0xca]));
        assert_eq!(unpack(0x0000_00ff), Rgb([0xff, 0, 0]));
        assert_eq!(unpack(0x00ff_0000), Rgb([0, 0, 0xff]));
    }

    #[test]
    fn pack_inverts_unpack() {
        let color = Rgb([202, 228, 62]);
        assert_eq!(pack(color), 62 * 65536 + 228 * 256 + 202);
        assert_eq!(unpack(pack(color)), color);
    }

    #[test]
    fn density_tiers() {
        assert_eq!(density(0.005), 2.5);
        assert_eq!(density(0.02), 10.0 / 3.0);
        assert_eq!(density(0.1), 5.0);
        assert_eq!(density(0.2), 5.0);
        assert_eq!(density(0.21), 10.0);
        assert_eq!(density(4.24), 10.0);
    }

    #[test]
    fn hue_at_escape_radius_is_next_integer() {
        // |z| == ESCAPE_RADIUS makes the smoothing term vanish.
        assert_eq!(hue(3, 4.0), 4.0);
    }

    #[test]
    fn interior_maps_to_first_entry() {
        let palette = ColorPalette::new(vec![7, 8, 9]).unwrap();
        let result = PixelResult {
            iterations: MAX_ITERATIONS,
            modulus: 0.5,
            delta_magnitude: 1.0,
        };
        assert_eq!(palette.color_for(&result), 7);
    }

    #[test]
    fn large_hue_clamps_to_last_entry() {
        let palette = ColorPalette::new(vec![7, 8, 9]).unwrap();
        let result = PixelResult {
            iterations: 400,
            modulus: 5.0,
            delta_magnitude: 1.0,
        };
        assert_eq!(palette.color_for(&result), 9);
    }

    #[test]
    fn index_stays_in_range_for_any_hue_and_density() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let iterations = rng.gen_range(0..MAX_ITERATIONS);
            let modulus = rng.gen_range(1e-3..1e6);
            let delta = rng.gen_range(0.0..10.0);
            let total = rng.gen_range(1..1024);
            let index = color_index(iterations, modulus, delta, total);
            assert!(index < total, "{} out of range for {} colors", index, total);
        }
    }

    #[test]
    fn non_finite_hue_lands_on_first_entry() {
        assert_eq!(color_index(10, std::f64::NAN, 1.0, 515), 0);
        assert_eq!(color_index(10, 0.0, 1.0, 515), 0);
    }
}
