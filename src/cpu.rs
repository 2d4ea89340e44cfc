// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The CPU engine: double-precision escape-time evaluation and
//! coloring, each phase spread over its own short-lived worker pool.

use crate::engine::Engine;
use crate::error::{MandelbrotError, Result};
use crate::palette::{unpack, ColorPalette};
use crate::pixel::{PixelJob, PixelResult};
use crate::planes::{pixels, validate_dimensions, ComplexRegion};
use crate::workers::scatter_gather;
use image::RgbImage;

/// Evaluates and colors pixels on a pool of CPU worker threads.
pub struct CpuEngine<'p> {
    palette: &'p ColorPalette,
}

impl<'p> CpuEngine<'p> {
    /// An engine coloring with `palette`.
    pub fn new(palette: &'p ColorPalette) -> Self {
        CpuEngine { palette }
    }
}

impl<'p> Engine for CpuEngine<'p> {
    type Results = Vec<PixelResult>;

    fn generate(
        &self,
        width: u32,
        height: u32,
        region: &ComplexRegion,
        tasks: usize,
    ) -> Result<Vec<PixelResult>> {
        validate_dimensions(width, height)?;
        let jobs: Vec<PixelJob> = pixels(width, height)
            .map(|pixel| PixelJob::new(width, height, region, pixel))
            .collect();
        debug!("Generating {} pixels on {} CPU workers", jobs.len(), tasks);
        scatter_gather(tasks, &jobs, PixelJob::evaluate)
    }

    fn render(
        &self,
        width: u32,
        height: u32,
        results: &Vec<PixelResult>,
        tasks: usize,
    ) -> Result<RgbImage> {
        validate_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if results.len() != expected {
            return Err(MandelbrotError::ResultCountMismatch {
                expected,
                actual: results.len(),
            });
        }
        let palette = self.palette;
        let colors = scatter_gather(tasks, results, |result| palette.color_for(result))?;
        Ok(image_from_colors(width, height, &colors))
    }
}

/// Lays packed colors out row-major into an image.
pub(crate) fn image_from_colors(width: u32, height: u32, colors: &[u32]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        unpack(colors[(y as usize) * (width as usize) + x as usize])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_ITERATIONS;

    fn setup() -> (ColorPalette, ComplexRegion) {
        (
            ColorPalette::builtin().unwrap(),
            ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap(),
        )
    }

    #[test]
    fn generate_returns_one_result_per_pixel() {
        let (palette, region) = setup();
        let engine = CpuEngine::new(&palette);
        let results = engine.generate(7, 5, &region, 3).unwrap();
        assert_eq!(results.len(), 35);
        assert!(results.iter().all(|r| r.iterations <= MAX_ITERATIONS));
    }

    #[test]
    fn generate_rejects_single_row() {
        let (palette, region) = setup();
        let engine = CpuEngine::new(&palette);
        assert!(engine.generate(10, 1, &region, 1).is_err());
    }

    #[test]
    fn generate_rejects_zero_tasks() {
        let (palette, region) = setup();
        let engine = CpuEngine::new(&palette);
        assert!(engine.generate(4, 4, &region, 0).is_err());
    }

    #[test]
    fn generate_accepts_any_positive_task_count() {
        let (palette, region) = setup();
        let engine = CpuEngine::new(&palette);
        let many = engine.generate(2, 2, &region, usize::MAX).unwrap();
        let one = engine.generate(2, 2, &region, 1).unwrap();
        assert_eq!(many, one);
        assert!(engine.render(2, 2, &many, usize::MAX).is_ok());
    }

    #[test]
    fn render_rejects_wrong_result_count() {
        let (palette, region) = setup();
        let engine = CpuEngine::new(&palette);
        let results = engine.generate(4, 4, &region, 1).unwrap();
        match engine.render(5, 4, &results, 1) {
            Err(MandelbrotError::ResultCountMismatch {
                expected: 20,
                actual: 16,
            }) => {}
            other => panic!("expected ResultCountMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn image_is_row_major_from_top_left() {
        let colors = vec![0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0x00ff_ffff];
        let image = image_from_colors(2, 2, &colors);
        assert_eq!(image.get_pixel(0, 0).0, [0xff, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0xff, 0]);
        assert_eq!(image.get_pixel(0, 1).0, [0, 0, 0xff]);
        assert_eq!(image.get_pixel(1, 1).0, [0xff, 0xff, 0xff]);
    }
}
