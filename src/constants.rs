// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Numeric constants shared by the CPU and GPU engines.  Changing any
//! of these changes the rendered image, so palettes generated for one
//! set of values are only meaningful for that set.

/// The iteration budget.  A pixel that reaches this count without
/// escaping is considered part of the set.
pub const MAX_ITERATIONS: u32 = 512;

/// The modulus beyond which an orbit is considered to have escaped.
pub const ESCAPE_RADIUS: f64 = 4.0;

/// Palette entries advanced per unit of smoothed hue.
pub const COLOR_DENSITY: f64 = 10.0 * (MAX_ITERATIONS / 512) as f64;

/// `log2(ESCAPE_RADIUS)`, the normaliser for the smoothing term.
pub const LOG_ESCAPE_RADIUS: f64 = 2.0;

/// GPU threads per block, (x, y).
pub const BLOCK_SIZE: (u32, u32) = (64, 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_escape_radius_matches_escape_radius() {
        assert_eq!(LOG_ESCAPE_RADIUS, ESCAPE_RADIUS.log2());
    }

    #[test]
    fn color_density_scales_with_budget() {
        assert_eq!(COLOR_DENSITY, 10.0);
    }
}
