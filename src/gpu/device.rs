// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Adapter and device acquisition.

use crate::constants::BLOCK_SIZE;
use crate::error::{MandelbrotError, Result};

/// The wgpu device and queue the kernels run on.
///
/// `_instance` is declared last so it outlives the device and queue
/// when the context is dropped.
pub struct GpuContext {
    /// The logical device kernels and buffers are created on.
    pub device: wgpu::Device,
    /// The queue dispatches are submitted to.
    pub queue: wgpu::Queue,
    /// What the adapter reported about itself.
    pub adapter_info: wgpu::AdapterInfo,
    _instance: wgpu::Instance,
}

impl GpuContext {
    /// Finds an adapter and opens a device on it.  Any failure here
    /// means acceleration is unavailable, not that something broke.
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::init())
    }

    async fn init() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| MandelbrotError::AcceleratorUnavailable("no GPU adapter found".into()))?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        if limits.max_compute_workgroup_size_x < BLOCK_SIZE.0
            || limits.max_compute_workgroup_size_y < BLOCK_SIZE.1
            || limits.max_compute_invocations_per_workgroup < BLOCK_SIZE.0 * BLOCK_SIZE.1
        {
            return Err(MandelbrotError::AcceleratorUnavailable(format!(
                "{} cannot run {}x{} thread blocks",
                adapter_info.name, BLOCK_SIZE.0, BLOCK_SIZE.1
            )));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mandelbrot"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits,
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| MandelbrotError::AcceleratorUnavailable(e.to_string()))?;

        info!(
            "GPU adapter: {} ({:?}, {:?})",
            adapter_info.name, adapter_info.backend, adapter_info.device_type
        );

        Ok(GpuContext {
            device,
            queue,
            adapter_info,
            _instance: instance,
        })
    }
}
