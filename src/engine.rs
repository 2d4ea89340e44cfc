// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The capability every engine provides.

use crate::error::Result;
use crate::planes::ComplexRegion;
use image::RgbImage;

/// Something that can compute escape-time results for a region and
/// turn them into an image.  `Results` is whatever the engine hands
/// from one phase to the other; the GPU keeps them on the device.
///
/// One engine serves one `generate`/`render` pair at a time.
pub trait Engine {
    /// Output of `generate`, input of `render`.
    type Results;

    /// Evaluates every pixel of a `width` x `height` grid over
    /// `region`.  `tasks` is the worker count for engines that use
    /// one.
    fn generate(
        &self,
        width: u32,
        height: u32,
        region: &ComplexRegion,
        tasks: usize,
    ) -> Result<Self::Results>;

    /// Maps generated results to a row-major RGB image.
    fn render(
        &self,
        width: u32,
        height: u32,
        results: &Self::Results,
        tasks: usize,
    ) -> Result<RgbImage>;
}
