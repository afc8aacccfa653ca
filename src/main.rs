// main.rs — headless fingerprint run.
//
// Selects the first adapter, prints the device report, then runs a fixed
// number of frames, printing one `<comptime hex>\t<runtime hex>` line per
// frame on stdout. Adapter enumeration goes to stderr.
//
// USAGE
//   mathprint [frames] [width] [height]
//
// Defaults: 10 frames over a 400×400 surface. On a sane stack every line
// is identical; what the values ARE is the fingerprint.

use std::env;

use mathprint::gpu::device::{GpuDevice, GpuError};
use mathprint::gpu::probe::GpuHashProbe;
use mathprint::harness::DispatchHarness;
use mathprint::report;

const DEFAULT_FRAMES: usize = 10;
const DEFAULT_SURFACE: u32 = 400;

fn main() {
    if let Err(e) = run() {
        eprintln!("[mathprint] fatal: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GpuError> {
    let args: Vec<String> = env::args().collect();
    let frames: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let width: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SURFACE);
    let height: u32 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SURFACE);

    let gpu = GpuDevice::new()?;
    println!("{}", gpu.report());

    let probe = GpuHashProbe::new(gpu, width, height)?;
    let mut harness = DispatchHarness::new(probe);

    for _ in 0..frames {
        let pair = harness.run_frame();
        println!("{}", report::hash_line(pair));
    }

    Ok(())
}
