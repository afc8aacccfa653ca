// gpu/probe.rs — compiled fingerprint kernel + buffers + compute surface.
//
// This is the wgpu implementation of the `HashDevice` capability trait.
// Everything fallible happens in `new()`: shader compilation, pipeline
// creation against the `compute` entry point, and allocation of the three
// 4-byte buffers, the surface, and the readback staging buffer. wgpu
// reports those failures through error scopes, which is what lets us map
// them onto the typed `GpuError` variants instead of dying in the
// uncaptured-error handler mid-frame.
//
// Per-frame flow (driven by DispatchHarness):
//   dispatch()        — write_buffer(time), one compute pass over the
//                       surface grid, copy both result ints into the
//                       staging buffer, submit, request the async map.
//   wait_completion() — poll(Wait) + channel recv. The map callback fires
//                       only after the submitted work (dispatch + copies)
//                       completes, so this recv IS the completion signal.
//   read_hashes()     — read the mapped 8 bytes, unmap for the next frame.
//
// All resources are created once and reused; only buffer contents change
// between frames.

use std::sync::mpsc;

use crate::gpu::device::{GpuDevice, GpuError};
use crate::harness::{HashDevice, HashPair};

/// Time uniform: one f32, host-written each frame.
pub const TIME_BUFFER_SIZE: u64 = 4;
/// Each hash result: one i32, device-written each dispatch.
pub const HASH_BUFFER_SIZE: u64 = 4;
/// Staging buffer holding both hashes for readback.
pub const READBACK_SIZE: u64 = 2 * HASH_BUFFER_SIZE;

/// Byte offsets of the two hashes inside the readback buffer.
const RUNTIME_OFFSET: u64 = 0;
const COMPTIME_OFFSET: u64 = HASH_BUFFER_SIZE;

/// The compiled kernel and its resources. Owns the device context.
///
/// Create once with [`GpuHashProbe::new`], hand to `DispatchHarness`.
pub struct GpuHashProbe {
    gpu: GpuDevice,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    time_buf: wgpu::Buffer,
    runtime_buf: wgpu::Buffer,
    comptime_buf: wgpu::Buffer,
    readback: wgpu::Buffer,
    surface_size: (u32, u32),
    /// Receiver for the in-flight map request; Some between dispatch()
    /// and wait_completion().
    pending: Option<mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>>,
}

impl GpuHashProbe {
    /// Compile the kernel and allocate every per-process resource.
    ///
    /// # Errors
    /// [`GpuError::KernelCompile`] if the WGSL fails validation,
    /// [`GpuError::EntryPointMissing`] if pipeline creation against entry
    /// point `compute` fails, [`GpuError::BufferAllocation`] if any buffer
    /// or texture cannot be allocated.
    pub fn new(gpu: GpuDevice, surface_w: u32, surface_h: u32) -> Result<Self, GpuError> {
        let device = &gpu.device;

        // ── Kernel compilation ───────────────────────────────────────────
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("hash.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/hash.wgsl").into()),
        });
        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::KernelCompile(e.to_string()));
        }

        // ── Buffers and textures ─────────────────────────────────────────
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let time_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("time uniform"),
            size: TIME_BUFFER_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let runtime_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("runtime hash"),
            size: HASH_BUFFER_SIZE,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let comptime_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("comptime hash"),
            size: HASH_BUFFER_SIZE,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hash readback"),
            size: READBACK_SIZE,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Output surface. Content is written black and discarded; only the
        // dimensions matter (they size the dispatch grid).
        let surface = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("compute surface"),
            size: wgpu::Extent3d {
                width: surface_w,
                height: surface_h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING,
            view_formats: &[],
        });
        // Reserved glyph-atlas slot: 1×1 placeholder, never read.
        let reserved = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("reserved"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::BufferAllocation(e.to_string()));
        }

        // ── Pipeline against the `compute` entry point ───────────────────
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("probe BGL"),
            entries: &[
                // 0 — output surface (write-only storage texture)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                // 1 — reserved texture, bound but unused
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    },
                    count: None,
                },
                // 2 — time uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // 3 — runtime hash, 4 — comptime hash
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("probe pipeline layout"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("compute"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "compute",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::EntryPointMissing(e.to_string()));
        }

        let surface_view = surface.create_view(&wgpu::TextureViewDescriptor::default());
        let reserved_view = reserved.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("probe BG"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&surface_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&reserved_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: time_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: runtime_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: comptime_buf.as_entire_binding(),
                },
            ],
        });

        Ok(GpuHashProbe {
            gpu,
            pipeline,
            bind_group,
            time_buf,
            runtime_buf,
            comptime_buf,
            readback,
            surface_size: (surface_w, surface_h),
            pending: None,
        })
    }
}

impl HashDevice for GpuHashProbe {
    fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    fn dispatch(&mut self, time: f32, groups: (u32, u32)) {
        assert!(self.pending.is_none(), "dispatch while a frame is in flight");

        self.gpu
            .queue
            .write_buffer(&self.time_buf, 0, bytemuck::bytes_of(&time));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("probe dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("compute"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(groups.0, groups.1, 1);
        }
        encoder.copy_buffer_to_buffer(
            &self.runtime_buf,
            0,
            &self.readback,
            RUNTIME_OFFSET,
            HASH_BUFFER_SIZE,
        );
        encoder.copy_buffer_to_buffer(
            &self.comptime_buf,
            0,
            &self.readback,
            COMPTIME_OFFSET,
            HASH_BUFFER_SIZE,
        );
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        // The map request completes only after the submitted dispatch and
        // copies have finished on the device — this is the frame's
        // completion signal.
        let (tx, rx) = mpsc::channel();
        self.readback.slice(..).map_async(wgpu::MapMode::Read, move |r| {
            tx.send(r).ok();
        });
        self.pending = Some(rx);
    }

    fn wait_completion(&mut self) {
        let rx = self.pending.take().expect("wait_completion without a dispatch");
        self.gpu.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .expect("completion channel closed")
            .expect("hash readback mapping failed");
    }

    fn read_hashes(&mut self) -> HashPair {
        let slice = self.readback.slice(..);
        let pair = {
            let mapped = slice.get_mapped_range();
            let words: &[i32] = bytemuck::cast_slice(&mapped);
            HashPair {
                runtime: words[0],
                comptime: words[1],
            }
        };
        self.readback.unmap();
        pair
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
