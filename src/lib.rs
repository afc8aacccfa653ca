// mathprint — GPU transcendental-math fingerprinting.
//
// Runs a chaotic floating-point iteration on the device twice per frame:
// once seeded with a literal the shading compiler may fold at pipeline
// build time, once seeded through a uniform so evaluation is forced onto
// the hardware units at dispatch time. The two resulting integers, and
// their differences across machines, fingerprint the compiler+driver+
// hardware math stack.
//
// Port of the Metal playground version of https://www.shadertoy.com/view/7ssyzr

pub mod hash;
pub mod harness;
pub mod report;
pub mod gpu;
