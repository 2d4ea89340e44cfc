// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chooses an engine for each request and runs generation then
//! rendering on it.
//!
//! The GPU engine is only built the first time acceleration is asked
//! for.  If no device can be found then, or later, the request is
//! served by the CPU engine instead.  Any other GPU failure is passed
//! back to the caller.

use crate::cpu::CpuEngine;
use crate::engine::Engine;
use crate::error::{MandelbrotError, Result};
use crate::gpu::GpuEngine;
use crate::palette::ColorPalette;
use crate::planes::{validate_dimensions, ComplexRegion};
use image::RgbImage;
use std::time::{Duration, Instant};

/// Which engine produced an image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// The worker-pool engine.
    Cpu,
    /// The compute-shader engine.
    Gpu,
}

/// Wall-clock phase durations.  Informational only.
#[derive(Copy, Clone, Debug, Default)]
pub struct Timings {
    /// Time spent in `generate`.
    pub generation: Duration,
    /// Time spent in `render`.
    pub rendering: Duration,
    /// Both phases together.
    pub total: Duration,
}

/// The image along with how it was made.
pub struct Render {
    /// The colored image, `width` x `height`.
    pub image: RgbImage,
    /// The engine that produced it.
    pub backend: Backend,
    /// How long each phase took.
    pub timings: Timings,
}

type Factory<'p> = Box<dyn Fn(&ColorPalette) -> Result<GpuEngine> + 'p>;

enum Accelerator<'p> {
    Untried(Factory<'p>),
    Ready(GpuEngine),
    Unavailable(String),
}

/// Serves image requests, choosing the GPU engine when asked for and
/// available and the CPU engine otherwise.
pub struct Mandelbrot<'p> {
    palette: &'p ColorPalette,
    accelerator: Accelerator<'p>,
}

impl<'p> Mandelbrot<'p> {
    /// An orchestrator that acquires the GPU on the first request for
    /// it.
    pub fn new(palette: &'p ColorPalette) -> Self {
        Mandelbrot::with_accelerator(palette, GpuEngine::new)
    }

    /// An orchestrator that builds its GPU engine with `factory`.  The
    /// factory runs at most once per orchestrator unless it fails with
    /// something other than `AcceleratorUnavailable`.
    pub fn with_accelerator<F>(palette: &'p ColorPalette, factory: F) -> Self
    where
        F: Fn(&ColorPalette) -> Result<GpuEngine> + 'p,
    {
        Mandelbrot {
            palette,
            accelerator: Accelerator::Untried(Box::new(factory)),
        }
    }

    /// An orchestrator that never touches the GPU, even when asked.
    pub fn cpu_only(palette: &'p ColorPalette) -> Self {
        Mandelbrot {
            palette,
            accelerator: Accelerator::Unavailable("disabled".into()),
        }
    }

    /// Builds the GPU engine on first use.  `Ok(None)` means there is
    /// no usable device.
    fn accelerator(&mut self) -> Result<Option<&GpuEngine>> {
        if let Accelerator::Untried(factory) = &self.accelerator {
            let outcome = factory(self.palette);
            self.accelerator = match outcome {
                Ok(engine) => Accelerator::Ready(engine),
                Err(MandelbrotError::AcceleratorUnavailable(reason)) => {
                    Accelerator::Unavailable(reason)
                }
                Err(err) => return Err(err),
            };
        }
        match &self.accelerator {
            Accelerator::Ready(engine) => Ok(Some(engine)),
            Accelerator::Unavailable(reason) => {
                warn!("GPU acceleration unavailable ({}), using CPU", reason);
                Ok(None)
            }
            Accelerator::Untried(_) => Ok(None),
        }
    }

    /// Produces the image of `region` at `width` x `height`.  `tasks`
    /// sizes the CPU worker pools and is ignored on the GPU.
    pub fn generate(
        &mut self,
        width: u32,
        height: u32,
        region: &ComplexRegion,
        tasks: usize,
        gpu_requested: bool,
    ) -> Result<Render> {
        validate_dimensions(width, height)?;
        debug!(
            "Mandelbrot set generation started with width: {}, height: {}, region: {} to {}",
            width, height, region.cmin, region.cmax
        );

        if gpu_requested {
            if let Some(gpu) = self.accelerator()? {
                let (image, timings) = run(gpu, width, height, region, tasks)?;
                return Ok(Render {
                    image,
                    backend: Backend::Gpu,
                    timings,
                });
            }
        }

        debug!("Workers used in current run: {}", tasks);
        let cpu = CpuEngine::new(self.palette);
        let (image, timings) = run(&cpu, width, height, region, tasks)?;
        Ok(Render {
            image,
            backend: Backend::Cpu,
            timings,
        })
    }
}

fn run<E: Engine>(
    engine: &E,
    width: u32,
    height: u32,
    region: &ComplexRegion,
    tasks: usize,
) -> Result<(RgbImage, Timings)> {
    let begin = Instant::now();

    let results = engine.generate(width, height, region, tasks)?;
    let generation = begin.elapsed();
    info!("Mandelbrot set generated in {:.5}s", generation.as_secs_f64());

    let begin_rendering = Instant::now();
    let image = engine.render(width, height, &results, tasks)?;
    let rendering = begin_rendering.elapsed();
    info!("Mandelbrot set rendered in {:.5}s", rendering.as_secs_f64());

    let total = begin.elapsed();
    info!("Total run time: {:.5}s", total.as_secs_f64());

    Ok((
        image,
        Timings {
            generation,
            rendering,
            total,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_only_falls_back_when_gpu_requested() {
        let palette = ColorPalette::builtin().unwrap();
        let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
        let mut mandelbrot = Mandelbrot::cpu_only(&palette);
        let render = mandelbrot.generate(8, 6, &region, 2, true).unwrap();
        assert_eq!(render.backend, Backend::Cpu);
        assert_eq!(render.image.dimensions(), (8, 6));
    }

    #[test]
    fn kernel_failure_is_not_masked_by_fallback() {
        let palette = ColorPalette::builtin().unwrap();
        let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
        let mut mandelbrot = Mandelbrot::with_accelerator(&palette, |_| {
            Err(MandelbrotError::KernelFailure("bad shader".into()))
        });
        match mandelbrot.generate(8, 6, &region, 1, true) {
            Err(MandelbrotError::KernelFailure(_)) => {}
            Err(other) => panic!("expected KernelFailure, got {:?}", other),
            Ok(_) => panic!("expected KernelFailure"),
        }
    }

    #[test]
    fn factory_is_untouched_without_a_gpu_request() {
        let palette = ColorPalette::builtin().unwrap();
        let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
        let mut mandelbrot =
            Mandelbrot::with_accelerator(&palette, |_| panic!("GPU acquired without a request"));
        let render = mandelbrot.generate(4, 4, &region, 1, false).unwrap();
        assert_eq!(render.backend, Backend::Cpu);
    }

    #[test]
    fn timings_are_consistent() {
        let palette = ColorPalette::builtin().unwrap();
        let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
        let mut mandelbrot = Mandelbrot::cpu_only(&palette);
        let render = mandelbrot.generate(16, 16, &region, 1, false).unwrap();
        let t = render.timings;
        assert!(t.total >= t.generation);
        assert!(t.total >= t.rendering);
    }

    #[test]
    fn invalid_dimensions_fail_before_any_work() {
        let palette = ColorPalette::builtin().unwrap();
        let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
        let mut mandelbrot = Mandelbrot::cpu_only(&palette);
        match mandelbrot.generate(1, 10, &region, 1, false) {
            Err(MandelbrotError::InvalidDimensions(1, 10)) => {}
            Err(other) => panic!("expected InvalidDimensions, got {:?}", other),
            Ok(_) => panic!("expected InvalidDimensions"),
        }
    }
}
