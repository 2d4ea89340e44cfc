// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Describes the relationship between a rectangle on the integral
//! plane, with its origin at the top-left pixel, and a rectangle on
//! the complex plane bounded by a pair of corners.

use crate::error::{MandelbrotError, Result};
use itertools::iproduct;
use num::Complex;

/// The x, y of a pixel in the image.  `x` counts columns from the
/// left, `y` counts rows from the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel(pub u32, pub u32);

/// The two corners bounding the mapped region of the complex plane,
/// with the real part of each as the x-component and the imaginary
/// part as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexRegion {
    /// Corner mapped to pixel (0, 0).
    pub cmin: Complex<f64>,
    /// Corner mapped to pixel (width - 1, height - 1).
    pub cmax: Complex<f64>,
}

impl ComplexRegion {
    /// Builds a region from the `(min, max)` ranges of the real and
    /// imaginary axes.
    pub fn new(real_axis_range: (f64, f64), imag_axis_range: (f64, f64)) -> Result<Self> {
        ComplexRegion::from_corners(
            Complex::new(real_axis_range.0, imag_axis_range.0),
            Complex::new(real_axis_range.1, imag_axis_range.1),
        )
    }

    /// Builds a region directly from its two corners.  Fails if the
    /// region has no extent on either axis, or if any bound is not a
    /// finite number.
    pub fn from_corners(cmin: Complex<f64>, cmax: Complex<f64>) -> Result<Self> {
        let finite = [cmin.re, cmin.im, cmax.re, cmax.im]
            .iter()
            .all(|v| v.is_finite());
        let delta = cmax - cmin;
        if !finite || delta.re == 0.0 || delta.im == 0.0 {
            return Err(MandelbrotError::DegenerateRegion);
        }
        Ok(ComplexRegion { cmin, cmax })
    }

    /// `cmax - cmin`.
    pub fn delta(&self) -> Complex<f64> {
        self.cmax - self.cmin
    }

    /// `|cmax - cmin|`, the diagonal extent of the region.  The
    /// renderer uses it to pick a color density tier.
    pub fn delta_magnitude(&self) -> f64 {
        self.delta().norm()
    }

    /// True if the point lies within the closed rectangle.
    pub fn contains(&self, point: Complex<f64>) -> bool {
        let (lo_re, hi_re) = ordered(self.cmin.re, self.cmax.re);
        let (lo_im, hi_im) = ordered(self.cmin.im, self.cmax.im);
        point.re >= lo_re && point.re <= hi_re && point.im >= lo_im && point.im <= hi_im
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Both dimensions must exceed one.  A single row or column would
/// put a zero in the denominator of the pixel-to-point mapping.
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width < 2 || height < 2 {
        return Err(MandelbrotError::InvalidDimensions(width, height));
    }
    Ok(())
}

/// Every pixel of a `width` x `height` image in row-major order: `y`
/// outer, `x` inner.
pub fn pixels(width: u32, height: u32) -> impl Iterator<Item = Pixel> {
    iproduct!(0..height, 0..width).map(|(y, x)| Pixel(x, y))
}
