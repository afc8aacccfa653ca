// demos/live.rs — windowed fingerprint run.
//
// Hosts the dispatch harness inside a minifb frame loop, like the original
// playground's live view: a black surface, hashes in the title bar and on
// stdout once per frame. The window only supplies the loop and the exit
// key — presentation of the compute surface itself is not wired up.
//
// USAGE
//   cargo run --example live
//
// Controls:
//   Q/Esc — quit

use minifb::{Key, Window, WindowOptions};

use mathprint::gpu::device::GpuDevice;
use mathprint::gpu::probe::GpuHashProbe;
use mathprint::harness::DispatchHarness;
use mathprint::report;

const SURFACE_W: u32 = 400;
const SURFACE_H: u32 = 400;

fn main() {
    let gpu = GpuDevice::new().expect("failed to initialise a GPU adapter");
    println!("{}", gpu.report());
    let device_name = gpu.report().name.clone();

    let probe = GpuHashProbe::new(gpu, SURFACE_W, SURFACE_H)
        .expect("failed to set up the fingerprint kernel");
    let mut harness = DispatchHarness::new(probe);

    let mut window = Window::new(
        "mathprint",
        SURFACE_W as usize,
        SURFACE_H as usize,
        WindowOptions::default(),
    )
    .expect("failed to create window");
    window.set_target_fps(60);

    // The kernel writes the surface black; mirror that here.
    let framebuffer = vec![0u32; (SURFACE_W * SURFACE_H) as usize];

    while window.is_open()
        && !window.is_key_down(Key::Escape)
        && !window.is_key_down(Key::Q)
    {
        let pair = harness.run_frame();
        let line = report::hash_line(pair);
        println!("{line}");
        window.set_title(&format!("mathprint — {device_name} — {line}"));
        window
            .update_with_buffer(&framebuffer, SURFACE_W as usize, SURFACE_H as usize)
            .expect("window update failed");
    }
}
