//! wgpu-backed accelerator capability.
//!
//! Uses wgpu for cross-platform GPU compute (Metal, Vulkan, DX12). This
//! is the one concrete accelerator backend today: it implements the
//! [`Accelerator`](crate::accel::Accelerator) contract by uploading
//! positional arguments as storage buffers, building a compute pipeline
//! from the kernel's WGSL source, and reading results back through a
//! staging buffer.
//!
//! Binding convention for kernel WGSL (see [`shaders`]):
//! - `@group(0) @binding(i)`: positional argument `i`, `storage, read_write`
//! - `@group(1) @binding(0)`: bounds uniform injected by this backend
//!
//! Kernels open their entry point with `if (!in_bounds(i)) { return; }`,
//! the device-side form of the lowered loop's bounds guard, and declare
//! `@workgroup_size(WORKGROUP_SIZE)` so the resolved threads-per-group
//! can be applied at pipeline creation.

pub mod shaders;

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::accel::Accelerator;
use crate::kernel::{Arg, Kernel};
use crate::launch::LaunchConfig;

/// Try to create a wgpu device and queue.
/// Returns None if no GPU adapter is available.
pub fn try_create_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("riptide-gpu"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
        },
        None,
    ))
    .ok()?;
    Some((device, queue))
}

/// Host-range extent, uploaded as the `@group(1)` uniform read by
/// `in_bounds`. Padded to 16 bytes for uniform layout.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BoundsParams {
    len: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}

/// One converted positional argument: a storage buffer for the launch
/// plus a staging buffer for readback.
pub struct GpuBuffer {
    storage: wgpu::Buffer,
    staging: wgpu::Buffer,
    size: u64,
}

/// A kernel's compiled accelerator build: validated shader module plus
/// entry metadata. The pipeline itself is created per launch so the
/// resolved threads-per-group can be baked in as a pipeline constant.
pub struct CompiledKernel {
    module: wgpu::ShaderModule,
    entry_point: String,
    label: String,
}

/// The wgpu implementation of the accelerator capability.
pub struct WgpuAccelerator {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuAccelerator {
    /// Acquire the capability. `None` means no compatible adapter — the
    /// dispatch layer turns that into its unavailable error.
    pub fn try_new() -> Option<Self> {
        let (device, queue) = try_create_device()?;
        Some(Self { device, queue })
    }

    /// Collect any validation error raised since the matching
    /// `push_error_scope` call.
    fn pop_validation(&self, context: &str) -> Result<(), String> {
        match pollster::block_on(self.device.pop_error_scope()) {
            None => Ok(()),
            Some(err) => Err(format!("{context}: {err}")),
        }
    }
}

impl Accelerator for WgpuAccelerator {
    type Buffer = GpuBuffer;
    type Compiled = CompiledKernel;

    fn convert(&self, arg: &Arg<'_>) -> Result<GpuBuffer, String> {
        let bytes = arg.as_bytes();
        if bytes.is_empty() {
            return Err("cannot convert a zero-length argument to a device buffer".into());
        }
        let storage = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("riptide-arg"),
                contents: bytes,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            });
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("riptide-staging"),
            size: bytes.len() as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(GpuBuffer {
            storage,
            staging,
            size: bytes.len() as u64,
        })
    }

    fn compile<K: Kernel>(&self, kernel: &K) -> Result<CompiledKernel, String> {
        // The bounds prelude supplies in_bounds() and the WORKGROUP_SIZE
        // pipeline constant the kernel source builds on.
        let source = format!("{}\n{}", shaders::BOUNDS, kernel.source());

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kernel.name()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.pop_validation(&format!("compiling kernel `{}`", kernel.name()))?;

        Ok(CompiledKernel {
            module,
            entry_point: kernel.entry_point().to_string(),
            label: kernel.name().to_string(),
        })
    }

    fn max_threads(&self, _compiled: &CompiledKernel) -> u32 {
        let limits = self.device.limits();
        limits
            .max_compute_invocations_per_workgroup
            .min(limits.max_compute_workgroup_size_x)
    }

    fn submit(
        &self,
        compiled: &CompiledKernel,
        buffers: &[GpuBuffer],
        domain: u32,
        config: &LaunchConfig,
    ) -> Result<(), String> {
        if config.stream != crate::launch::StreamId::DEFAULT {
            return Err(format!(
                "wgpu backend exposes a single queue; stream {} is not available",
                config.stream.0
            ));
        }
        if config.shared_memory_bytes != 0 {
            return Err(
                "wgpu backend has no dynamic workgroup memory; declare var<workgroup> \
                 storage in the shader instead"
                    .into(),
            );
        }

        // Bake the resolved threads-per-group into the pipeline via the
        // WORKGROUP_SIZE override constant. Illegal values surface here
        // as validation errors.
        let constants = HashMap::from([(
            "WORKGROUP_SIZE".to_string(),
            config.threads_per_group as f64,
        )]);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&compiled.label),
                layout: None,
                module: &compiled.module,
                entry_point: Some(&compiled.entry_point),
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &constants,
                    ..Default::default()
                },
                cache: None,
            });
        self.pop_validation(&format!("building pipeline for `{}`", compiled.label))?;

        let bounds = BoundsParams {
            len: domain,
            _pad0: 0,
            _pad1: 0,
            _pad2: 0,
        };
        let bounds_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("riptide-bounds"),
                contents: bytemuck::bytes_of(&bounds),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let arg_entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(i, buf)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: buf.storage.as_entire_binding(),
            })
            .collect();
        let arg_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("riptide-args"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &arg_entries,
        });
        let bounds_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("riptide-bounds"),
            layout: &pipeline.get_bind_group_layout(1),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: bounds_buf.as_entire_binding(),
            }],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("riptide-launch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&compiled.label),
                timestamp_writes: None,
            });
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &arg_group, &[]);
            pass.set_bind_group(1, &bounds_group, &[]);
            pass.dispatch_workgroups(config.group_count, 1, 1);
        }
        for buf in buffers {
            encoder.copy_buffer_to_buffer(&buf.storage, 0, &buf.staging, 0, buf.size);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.pop_validation(&format!("submitting `{}`", compiled.label))
    }

    fn read_back(&self, buffer: &GpuBuffer, arg: &mut Arg<'_>) -> Result<(), String> {
        let slice = buffer.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| "GPU readback channel closed".to_string())?
            .map_err(|e| format!("GPU readback failed: {e}"))?;

        let data = slice.get_mapped_range();
        let result = arg.copy_from_bytes(&data);
        drop(data);
        buffer.staging.unmap();
        result
    }
}
