// harness.rs — per-frame dispatch harness.
//
// This is the host-side state machine that drives the fingerprint kernel:
//
//   1. Advance the frame clock by exactly 1/60
//   2. Upload the time uniform and enqueue one dispatch  (Idle → Dispatched)
//   3. Block on the device's completion signal           (Dispatched → Resolved)
//   4. Copy the two hashes out and report them           (Resolved → Idle)
//
// Exactly one frame is in flight at a time. No pipelining, no overlap: the
// completion signal alone establishes the happens-before edge between the
// kernel's writes and the host's read, so no locking exists anywhere.
//
// The device boundary is the `HashDevice` trait. The wgpu implementation
// lives in gpu/probe.rs; tests substitute fakes that run the CPU reference
// hash from hash.rs or record call ordering.

use std::fmt;

/// Workgroups are 8×8×1; fixed, matching the kernel's @workgroup_size.
pub const WORKGROUP_DIM: u32 = 8;

/// Per-frame clock step. The clock is monotonic and never resets.
pub const FRAME_TIME: f32 = 1.0 / 60.0;

/// The two hashes produced by one frame.
///
/// Both lie in `[0, 65536)` for any finite seed. They may legitimately
/// differ on one device — that difference is the measurement, so nothing
/// here compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPair {
    /// Hash of the literal-zero seed, possibly folded by the shader compiler.
    pub comptime: i32,
    /// Hash of the uniform-derived seed, forced through the hardware units.
    pub runtime: i32,
}

/// Monotonic frame clock. Owned exclusively by the harness.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock { time: 0.0 }
    }

    /// Advance by one frame step and return the new time.
    pub fn tick(&mut self) -> f32 {
        self.time += FRAME_TIME;
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame state. The harness holds `Idle` between frames; the other two
/// states exist only inside `run_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No dispatch outstanding.
    Idle,
    /// One dispatch submitted; result buffers must not be read.
    Dispatched,
    /// Completion signal fired; result buffers are safe to read.
    Resolved,
}

/// Number of workgroups needed for a surface, one hash dispatch per frame.
///
/// Integer division, deliberately truncating: pixels outside full 8×8 tiles
/// are not covered, which is acceptable because the surface content is
/// discarded. Clamped to at least one group per dimension so degenerate
/// surfaces still execute the kernel.
pub fn group_count(surface_w: u32, surface_h: u32) -> (u32, u32) {
    ((surface_w / WORKGROUP_DIM).max(1), (surface_h / WORKGROUP_DIM).max(1))
}

/// Capability boundary between the harness and a concrete device.
///
/// The wgpu implementation is `gpu::probe::GpuHashProbe`; tests use fakes.
/// Setup (device selection, kernel compilation, buffer allocation) happens
/// before a `HashDevice` exists and has its own error taxonomy in
/// gpu/device.rs — once constructed, per-frame operation is infallible by
/// contract, so these methods return plain values.
pub trait HashDevice {
    /// Surface dimensions in pixels; these size the dispatch grid.
    fn surface_size(&self) -> (u32, u32);

    /// Write `time` into the 4-byte uniform, then enqueue one dispatch of
    /// the kernel over `groups` workgroups.
    fn dispatch(&mut self, time: f32, groups: (u32, u32));

    /// Block until the completion signal for the outstanding dispatch
    /// fires. Must not return early: `read_hashes` relies on this as the
    /// only synchronization point.
    fn wait_completion(&mut self);

    /// Copy the two 4-byte integers out of device-visible memory.
    /// Only valid after `wait_completion` has returned for this frame.
    fn read_hashes(&mut self) -> HashPair;
}

/// Per-frame dispatch harness. Create once, call [`run_frame`] in a loop.
///
/// [`run_frame`]: DispatchHarness::run_frame
pub struct DispatchHarness<D: HashDevice> {
    device: D,
    clock: FrameClock,
    groups: (u32, u32),
    state: FrameState,
}

impl<D: HashDevice> DispatchHarness<D> {
    pub fn new(device: D) -> Self {
        let (w, h) = device.surface_size();
        DispatchHarness {
            device,
            clock: FrameClock::new(),
            groups: group_count(w, h),
            state: FrameState::Idle,
        }
    }

    /// Run one complete frame: tick, dispatch, wait, read.
    ///
    /// Blocks until the device signals completion. If the device hangs,
    /// this hangs with it — acceptable for a short-lived diagnostic.
    pub fn run_frame(&mut self) -> HashPair {
        debug_assert_eq!(self.state, FrameState::Idle);

        let time = self.clock.tick();
        self.device.dispatch(time, self.groups);
        self.state = FrameState::Dispatched;

        self.device.wait_completion();
        self.state = FrameState::Resolved;

        let pair = self.device.read_hashes();
        self.state = FrameState::Idle;
        pair
    }

    /// Current frame-clock time (the value of the last uploaded uniform).
    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn groups(&self) -> (u32, u32) {
        self.groups
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: HashDevice> fmt::Display for DispatchHarness<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.device.surface_size();
        write!(
            f,
            "DispatchHarness {{ surface: {}×{}, groups: {}×{}, t: {:.4} }}",
            w, h, self.groups.0, self.groups.1, self.clock.time()
        )
    }
}
