// gpu/device.rs — wgpu device selection and the fatal error taxonomy.
//
// Responsibilities:
//   - Enumerate adapters across every available backend and select the
//     first one. This tool exists to fingerprint whatever stack the
//     platform provides, so no power/type preference is applied — but every
//     adapter is logged to stderr so the user can see what was skipped.
//   - Capture the static metadata for the startup DeviceReport.
//   - Define `GpuError`, the typed setup-failure taxonomy. Every variant is
//     fatal and detected during initialization; there is no per-frame error
//     path by design.
//
// The context (adapter info, device, queue) is created once, moved into the
// probe, and never mutated afterwards. No ambient global holds it.

use std::fmt;

use crate::report::DeviceReport;

/// The device context: selected adapter's metadata plus the wgpu device and
/// queue. Construct once via [`GpuDevice::new`]; lifetime = process lifetime.
///
/// # Field drop order
/// Rust drops struct fields in declaration order. `_instance` is declared
/// last so the `wgpu::Instance` outlives `device` and `queue`; some
/// translation layers crash if the instance dies first.
pub struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
    report: DeviceReport,
    /// Keeps the instance alive until `device` and `queue` are dropped.
    _instance: wgpu::Instance,
}

impl GpuDevice {
    /// Select the first enumerated adapter on any backend and create a
    /// device + queue with default features and limits.
    ///
    /// # Errors
    /// [`GpuError::NoAdapter`] if enumeration comes back empty,
    /// [`GpuError::DeviceRequest`] if the adapter refuses a device.
    pub fn new() -> Result<Self, GpuError> {
        pollster::block_on(Self::init_async())
    }

    async fn init_async() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapters = instance.enumerate_adapters(wgpu::Backends::all());
        for a in &adapters {
            let info = a.get_info();
            eprintln!(
                "[mathprint] adapter: {} ({:?}, {:?})",
                info.name, info.backend, info.device_type
            );
        }

        let adapter = select_first(adapters)?;
        let adapter_info = adapter.get_info();
        let report = report_for(&adapter_info, &adapter.limits());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mathprint"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(GpuError::DeviceRequest)?;

        Ok(GpuDevice {
            device,
            queue,
            adapter_info,
            report,
            _instance: instance,
        })
    }

    /// Static metadata for the startup report.
    pub fn report(&self) -> &DeviceReport {
        &self.report
    }
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GpuDevice {{ adapter: {} ({:?}, {:?}) }}",
            self.adapter_info.name, self.adapter_info.backend, self.adapter_info.device_type
        )
    }
}

/// First-enumerated selection, mirroring the original tool's `devices[0]`.
/// Generic so the empty-list case is testable without constructing adapters.
fn select_first<T>(adapters: Vec<T>) -> Result<T, GpuError> {
    adapters.into_iter().next().ok_or(GpuError::NoAdapter)
}

/// Build the startup report from adapter metadata and hardware limits.
///
/// wgpu has no low-power or hot-plug queries, so:
///   - `low_power` is derived from the device type (integrated and
///     software adapters share a power envelope with the host);
///   - `removable` is always false until some backend exposes it.
fn report_for(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> DeviceReport {
    DeviceReport {
        name: info.name.clone(),
        low_power: matches!(
            info.device_type,
            wgpu::DeviceType::IntegratedGpu | wgpu::DeviceType::Cpu
        ),
        removable: false,
        max_threads_per_group: limits.max_compute_invocations_per_workgroup,
        max_buffer_bytes: limits.max_buffer_size,
    }
}

// ============================================================
// Error type
// ============================================================

/// Setup failures. All fatal: detected once at initialization, propagated
/// to one top-level abort in main, never retried.
#[derive(Debug)]
pub enum GpuError {
    /// Adapter enumeration returned nothing — no compute-capable device.
    NoAdapter,
    /// An adapter was found but refused to create a device.
    DeviceRequest(wgpu::RequestDeviceError),
    /// The kernel source failed shader-module validation. Carries the
    /// compiler diagnostic verbatim.
    KernelCompile(String),
    /// The module compiled but pipeline creation against entry point
    /// `compute` failed.
    EntryPointMissing(String),
    /// A required buffer or the compute surface could not be allocated.
    BufferAllocation(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::NoAdapter => {
                write!(f, "no compute-capable adapter found on any backend")
            }
            GpuError::DeviceRequest(e) => write!(f, "device request failed: {e}"),
            GpuError::KernelCompile(diag) => {
                write!(f, "kernel failed to compile:\n{diag}")
            }
            GpuError::EntryPointMissing(diag) => {
                write!(f, "compiled kernel has no usable `compute` entry point: {diag}")
            }
            GpuError::BufferAllocation(diag) => {
                write!(f, "buffer allocation failed: {diag}")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::DeviceRequest(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================
// Tests
// ============================================================
