// gpu/mod.rs — wgpu device layer.
//
// device.rs selects the adapter and owns the fatal-error taxonomy;
// probe.rs holds the compiled kernel and implements the `HashDevice`
// capability trait from harness.rs. The split keeps everything that can
// fail inside the two constructors — after that, frames are driven through
// the trait and cannot fail by contract.

pub mod device;
pub mod probe;
