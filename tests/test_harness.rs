// tests/test_harness.rs — end-to-end harness scenarios over fake devices.
//
// The fakes implement the same `HashDevice` capability trait as the wgpu
// probe, but run the f64 CPU reference hash from mathprint::hash. A
// reference evaluation has no compiler-folding discrepancy, so its two
// hashes always agree — which is exactly what makes it useful for pinning
// down the harness's own behavior.

use mathprint::harness::{DispatchHarness, FrameState, HashDevice, HashPair, FRAME_TIME};
use mathprint::hash::reference_hash_f64;
use mathprint::report;

/// Fake device evaluating the reference algorithm in double precision.
/// Mirrors the kernel: comptime path seeds with the literal, runtime path
/// seeds through the anti-folding barrier using the uploaded time.
struct ReferenceDevice {
    uploaded_time: Option<f32>,
    completed: bool,
    frames: usize,
}

impl ReferenceDevice {
    fn new() -> Self {
        ReferenceDevice { uploaded_time: None, completed: false, frames: 0 }
    }
}

impl HashDevice for ReferenceDevice {
    fn surface_size(&self) -> (u32, u32) {
        (400, 400)
    }

    fn dispatch(&mut self, time: f32, groups: (u32, u32)) {
        assert!(groups.0 >= 1 && groups.1 >= 1);
        self.uploaded_time = Some(time);
        self.completed = false;
        self.frames += 1;
    }

    fn wait_completion(&mut self) {
        self.completed = true;
    }

    fn read_hashes(&mut self) -> HashPair {
        assert!(self.completed, "read before completion signal");
        let time = f64::from(self.uploaded_time.expect("read before dispatch"));
        HashPair {
            comptime: reference_hash_f64(0.0),
            runtime: reference_hash_f64(0.0 + f64::min(0.0, time)),
        }
    }
}

#[test]
fn one_frame_reference_hashes_agree_and_are_in_range() {
    // The reference device folds nothing, so both paths hash the same seed.
    let mut harness = DispatchHarness::new(ReferenceDevice::new());
    let pair = harness.run_frame();
    assert_eq!(pair.comptime, pair.runtime);
    assert!((0..65536).contains(&pair.comptime));
    assert!((0..65536).contains(&pair.runtime));
}

#[test]
fn ten_frames_clock_steps_and_runtime_stays_constant() {
    let mut harness = DispatchHarness::new(ReferenceDevice::new());

    let mut expected_time = 0.0_f32;
    let first = harness.run_frame();
    expected_time += FRAME_TIME;
    assert_eq!(harness.time(), expected_time);

    for _ in 1..10 {
        let pair = harness.run_frame();
        expected_time += FRAME_TIME;
        assert_eq!(harness.time(), expected_time);
        assert_eq!(pair.runtime, first.runtime);
        assert_eq!(pair.comptime, first.comptime);
    }
    assert_eq!(harness.device().frames, 10);
    assert_eq!(harness.state(), FrameState::Idle);
}

#[test]
fn diverging_hashes_are_reported_not_rejected() {
    // A device whose compiler folded the comptime path differently from
    // the hardware. The harness must hand both through unchanged.
    struct DivergentDevice;
    impl HashDevice for DivergentDevice {
        fn surface_size(&self) -> (u32, u32) {
            (64, 64)
        }
        fn dispatch(&mut self, _time: f32, _groups: (u32, u32)) {}
        fn wait_completion(&mut self) {}
        fn read_hashes(&mut self) -> HashPair {
            HashPair { comptime: 0x4E5C, runtime: 0x9A31 }
        }
    }

    let mut harness = DispatchHarness::new(DivergentDevice);
    let pair = harness.run_frame();
    assert_ne!(pair.comptime, pair.runtime);
    assert_eq!(report::hash_line(pair), "4E5C\t9A31");
}

#[test]
fn degenerate_surface_still_dispatches_one_group() {
    struct TinyDevice {
        groups_seen: Option<(u32, u32)>,
    }
    impl HashDevice for TinyDevice {
        fn surface_size(&self) -> (u32, u32) {
            (3, 5)
        }
        fn dispatch(&mut self, _time: f32, groups: (u32, u32)) {
            self.groups_seen = Some(groups);
        }
        fn wait_completion(&mut self) {}
        fn read_hashes(&mut self) -> HashPair {
            HashPair { comptime: 1, runtime: 1 }
        }
    }

    let mut harness = DispatchHarness::new(TinyDevice { groups_seen: None });
    harness.run_frame();
    assert_eq!(harness.device().groups_seen, Some((1, 1)));
}
