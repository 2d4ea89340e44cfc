// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluation of a single pixel.
//!
//! Each pixel is mapped to a point `c` on the complex plane and the
//! orbit `z = z² + c`, starting at `z = c`, is followed until it
//! leaves the circle of radius `ESCAPE_RADIUS` or the iteration budget
//! runs out.  The count, together with the modulus of the last `z`,
//! is enough for the renderer to compute a smoothed hue.

use crate::constants::{ESCAPE_RADIUS, MAX_ITERATIONS};
use crate::planes::{ComplexRegion, Pixel};
use num::Complex;

/// Everything needed to evaluate one pixel, with no reference back to
/// the request that produced it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelJob {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Corner of the region mapped to pixel (0, 0).
    pub cmin: Complex<f64>,
    /// `cmax - cmin`.
    pub delta: Complex<f64>,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// The outcome of evaluating a pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelResult {
    /// Iterations performed, in `0..=MAX_ITERATIONS`.
    pub iterations: u32,
    /// `|z|` when the iteration stopped.
    pub modulus: f64,
    /// `|cmax - cmin|` of the region the pixel was taken from.
    pub delta_magnitude: f64,
}

impl PixelResult {
    /// True if the orbit never escaped within the budget.
    pub fn is_interior(&self) -> bool {
        self.iterations == MAX_ITERATIONS
    }
}

impl PixelJob {
    /// The job for `pixel` of a `width` x `height` image of `region`.
    pub fn new(width: u32, height: u32, region: &ComplexRegion, pixel: Pixel) -> Self {
        PixelJob {
            width,
            height,
            cmin: region.cmin,
            delta: region.delta(),
            x: pixel.0,
            y: pixel.1,
        }
    }

    /// The point on the complex plane this pixel samples.  Pixel
    /// (0, 0) maps to `cmin` and (width - 1, height - 1) to `cmax`.
    pub fn point(&self) -> Complex<f64> {
        let fx = f64::from(self.x) / f64::from(self.width - 1);
        let fy = f64::from(self.y) / f64::from(self.height - 1);
        self.cmin + Complex::new(fx * self.delta.re, fy * self.delta.im)
    }

    /// Runs the escape-time iteration for this pixel.
    pub fn evaluate(&self) -> PixelResult {
        let (iterations, z) = escape_time(self.point());
        PixelResult {
            iterations,
            modulus: z.norm(),
            delta_magnitude: self.delta.norm(),
        }
    }
}

/// Follows the orbit of `c` and returns the iteration count with the
/// final `z`.
pub fn escape_time(c: Complex<f64>) -> (u32, Complex<f64>) {
    let mut z = c;
    let mut iteration = 0;
    while iteration < MAX_ITERATIONS && z.norm() < ESCAPE_RADIUS {
        z = z * z + c;
        iteration += 1;
    }
    (iteration, z)
}
