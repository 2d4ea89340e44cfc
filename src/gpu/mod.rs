// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The GPU engine.
//!
//! Two WGSL compute kernels are compiled when the engine is built: one
//! evaluates escape time per pixel, one colors the results against a
//! device-resident copy of the palette.  Both are dispatched over a 2D
//! grid of `BLOCK_SIZE` thread blocks covering the image, one thread
//! per pixel.  The arithmetic is single precision, so pixels right on
//! the set's boundary may disagree with the CPU engine.

mod device;

pub use self::device::GpuContext;

use crate::constants::{BLOCK_SIZE, COLOR_DENSITY, ESCAPE_RADIUS, LOG_ESCAPE_RADIUS, MAX_ITERATIONS};
use crate::cpu::image_from_colors;
use crate::engine::Engine;
use crate::error::{MandelbrotError, Result};
use crate::palette::ColorPalette;
use crate::pixel::PixelResult;
use crate::planes::{validate_dimensions, ComplexRegion};
use bytemuck::{Pod, Zeroable};
use image::RgbImage;
use std::mem;
use wgpu::util::DeviceExt;

const ITERATE_KERNEL: &str = include_str!("../shaders/iterate.wgsl");
const COLORIZE_KERNEL: &str = include_str!("../shaders/colorize.wgsl");

/// Kernel parameters, laid out to match `Params` in both shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct KernelParams {
    width: u32,
    height: u32,
    cmin: [f32; 2],
    dc: [f32; 2],
    dc_abs: f32,
    _pad: u32,
}

/// Escape-time results left on the device between `generate` and
/// `render`.
pub struct GpuResults {
    width: u32,
    height: u32,
    params: wgpu::Buffer,
    iterations: wgpu::Buffer,
    moduli: wgpu::Buffer,
    delta_magnitude: f64,
}

/// Evaluates and colors pixels in compute shaders, one thread per
/// pixel.
pub struct GpuEngine {
    context: GpuContext,
    iterate: wgpu::ComputePipeline,
    colorize: wgpu::ComputePipeline,
    palette: wgpu::Buffer,
}

/// Substitutes the shared constants into a kernel template.
fn specialise(template: &str) -> String {
    template
        .replace("{{MAX_ITERATIONS}}", &MAX_ITERATIONS.to_string())
        .replace("{{ESCAPE_RADIUS}}", &format!("{:?}", ESCAPE_RADIUS))
        .replace("{{LOG_ESCAPE_RADIUS}}", &format!("{:?}", LOG_ESCAPE_RADIUS))
        .replace("{{COLOR_DENSITY}}", &format!("{:?}", COLOR_DENSITY))
        .replace("{{BLOCK_X}}", &BLOCK_SIZE.0.to_string())
        .replace("{{BLOCK_Y}}", &BLOCK_SIZE.1.to_string())
}

/// Blocks needed to cover the image in each direction.
pub fn grid_size(width: u32, height: u32) -> (u32, u32) {
    (
        (width + BLOCK_SIZE.0 - 1) / BLOCK_SIZE.0,
        (height + BLOCK_SIZE.1 - 1) / BLOCK_SIZE.1,
    )
}

impl GpuEngine {
    /// Acquires a device and compiles both kernels.
    pub fn new(palette: &ColorPalette) -> Result<Self> {
        GpuEngine::with_context(GpuContext::new()?, palette)
    }

    /// Compiles both kernels on an already acquired device and
    /// uploads `palette`.
    pub fn with_context(context: GpuContext, palette: &ColorPalette) -> Result<Self> {
        let device = &context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let iterate = compile(device, "get_pixel_iterations", &specialise(ITERATE_KERNEL));
        let colorize = compile(device, "get_pixel_color", &specialise(COLORIZE_KERNEL));
        let palette = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("palette"),
            contents: bytemuck::cast_slice(palette.as_slice()),
            usage: wgpu::BufferUsages::STORAGE,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(MandelbrotError::KernelFailure(err.to_string()));
        }
        debug!("Compiled GPU kernels on {}", context.adapter_info.name);

        Ok(GpuEngine {
            context,
            iterate,
            colorize,
            palette,
        })
    }

    /// Copies device-resident results back to the host.
    pub fn download(&self, results: &GpuResults) -> Result<Vec<PixelResult>> {
        let pixel_count = results.width as usize * results.height as usize;
        let iterations: Vec<u32> = self.read_back(&results.iterations, pixel_count)?;
        let moduli: Vec<f32> = self.read_back(&results.moduli, pixel_count)?;
        Ok(iterations
            .into_iter()
            .zip(moduli)
            .map(|(iterations, modulus)| PixelResult {
                iterations,
                modulus: f64::from(modulus),
                delta_magnitude: results.delta_magnitude,
            })
            .collect())
    }

    fn storage_buffer(&self, label: &str, pixel_count: usize) -> wgpu::Buffer {
        self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (pixel_count * mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    /// Records one dispatch of `pipeline` over the image, submits it,
    /// and waits for the device to finish.
    fn dispatch(
        &self,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        entries: &[wgpu::BindGroupEntry],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let device = &self.context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipeline.get_bind_group_layout(0),
            entries,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            let (grid_x, grid_y) = grid_size(width, height);
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(grid_x, grid_y, 1);
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
        device.poll(wgpu::Maintain::Wait);

        match pollster::block_on(device.pop_error_scope()) {
            Some(err) => Err(MandelbrotError::KernelFailure(err.to_string())),
            None => Ok(()),
        }
    }

    /// Copies `count` 32-bit values out of a storage buffer.
    fn read_back<T: Pod>(&self, source: &wgpu::Buffer, count: usize) -> Result<Vec<T>> {
        let device = &self.context.device;
        let size = (count * mem::size_of::<T>()) as u64;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("readback"),
        });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| MandelbrotError::KernelFailure("readback channel closed".into()))?
            .map_err(|e| MandelbrotError::KernelFailure(e.to_string()))?;

        let data = {
            let view = slice.get_mapped_range();
            bytemuck::cast_slice(&view).to_vec()
        };
        staging.unmap();
        Ok(data)
    }
}

fn compile(device: &wgpu::Device, entry_point: &str, source: &str) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(entry_point),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(entry_point),
        layout: None,
        module: &module,
        entry_point,
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    })
}

impl Engine for GpuEngine {
    type Results = GpuResults;

    /// `tasks` is ignored; the grid decides the parallelism.
    fn generate(
        &self,
        width: u32,
        height: u32,
        region: &ComplexRegion,
        _tasks: usize,
    ) -> Result<GpuResults> {
        validate_dimensions(width, height)?;
        let pixel_count = width as usize * height as usize;
        let delta = region.delta();
        let delta_magnitude = region.delta_magnitude();

        let kernel_params = KernelParams {
            width,
            height,
            cmin: [region.cmin.re as f32, region.cmin.im as f32],
            dc: [delta.re as f32, delta.im as f32],
            dc_abs: delta_magnitude as f32,
            _pad: 0,
        };
        let params = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("params"),
                contents: bytemuck::bytes_of(&kernel_params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let iterations = self.storage_buffer("iterations", pixel_count);
        let moduli = self.storage_buffer("moduli", pixel_count);

        debug!(
            "Generating {} pixels on a {:?} grid of {:?} blocks",
            pixel_count,
            grid_size(width, height),
            BLOCK_SIZE
        );
        self.dispatch(
            "get_pixel_iterations",
            &self.iterate,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: iterations.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: moduli.as_entire_binding(),
                },
            ],
            width,
            height,
        )?;

        Ok(GpuResults {
            width,
            height,
            params,
            iterations,
            moduli,
            delta_magnitude,
        })
    }

    fn render(
        &self,
        width: u32,
        height: u32,
        results: &GpuResults,
        _tasks: usize,
    ) -> Result<RgbImage> {
        validate_dimensions(width, height)?;
        if (results.width, results.height) != (width, height) {
            return Err(MandelbrotError::ResultCountMismatch {
                expected: width as usize * height as usize,
                actual: results.width as usize * results.height as usize,
            });
        }
        let pixel_count = width as usize * height as usize;
        let colors = self.storage_buffer("colors", pixel_count);

        self.dispatch(
            "get_pixel_color",
            &self.colorize,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: results.params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: results.iterations.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: results.moduli.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.palette.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: colors.as_entire_binding(),
                },
            ],
            width,
            height,
        )?;

        let packed: Vec<u32> = self.read_back(&colors, pixel_count)?;
        Ok(image_from_colors(width, height, &packed))
    }
}
