// hash.rs — CPU reference implementation of the chaotic hardware hash.
//
// Mirrors shaders/hash.wgsl round for round. The GPU kernel is the
// measurement instrument; this module is the authoritative reference it is
// validated against, and the computation behind the fake devices used in
// harness tests.
//
// The algorithm is a 20-round chaotic iteration over fract / normalize /
// sin / sqrt. Those are exactly the operations GPU vendors implement with
// polynomial approximations of differing precision, so two stacks that both
// run this "correctly" still land on different integers. That divergence is
// the measurement: the function is a fingerprint, not a checksum.
//
// Two precisions are provided:
//   - `reference_hash_f64` — what an exact-ish evaluation of the chain
//     produces. Used by the fake device in tests.
//   - `reference_hash_f32` — same chain at shader precision. On hardware
//     with faithful f32 transcendentals the GPU result matches this; on
//     most real drivers it does not, and that is fine.

/// Number of chaotic rounds. Fixed; changing it changes every fingerprint.
pub const ROUNDS: usize = 20;

/// Fractional part, `x - floor(x)`, e.g. `fract(-0.25) == 0.75`.
#[inline]
fn fract_f64(x: f64) -> f64 {
    x - x.floor()
}

#[inline]
fn fract_f32(x: f32) -> f32 {
    x - x.floor()
}

/// Reference hash at f64 precision.
///
/// For any finite `start` the result lies in `[0, 65536)`: the final step
/// is `fract(·) * 256 * 256` floored, and `fract` never reaches 1.0.
pub fn reference_hash_f64(start: f64) -> i32 {
    let mut a = start;
    for _ in 0..ROUNDS {
        // First component of the normalized vector (a+0.1, 6.11, 5.22).
        let x = a + 0.1;
        let norm = (x * x + 6.11 * 6.11 + 5.22 * 5.22).sqrt();
        a = fract_f64(x / norm * 3.01);
        a += (a.sqrt() * 100.3).sin() * 0.31;
    }
    (fract_f64(fract_f64(a.abs()) * 256.0) * 256.0 * 256.0).floor() as i32
}

/// Reference hash at f32 (shader) precision.
pub fn reference_hash_f32(start: f32) -> i32 {
    let mut a = start;
    for _ in 0..ROUNDS {
        let x = a + 0.1;
        let norm = (x * x + 6.11_f32 * 6.11 + 5.22_f32 * 5.22).sqrt();
        a = fract_f32(x / norm * 3.01);
        a += (a.sqrt() * 100.3).sin() * 0.31;
    }
    (fract_f32(fract_f32(a.abs()) * 256.0) * 256.0 * 256.0).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// LCG seed stream — deterministic "random" f64s without a rand dep.
    fn lcg_floats(n: usize) -> Vec<f64> {
        let mut state = 0x2545F491_u32;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                // Spread across sign and magnitude: roughly [-8e3, 8e3).
                (state as f64 / u32::MAX as f64 - 0.5) * 16384.0
            })
            .collect()
    }

    #[test]
    fn hash_in_range_for_finite_seeds() {
        let mut seeds = lcg_floats(500);
        seeds.extend_from_slice(&[0.0, -0.0, 1.0, -1.0, 0.1, 1e-30, 1e30, -1e30]);
        for &s in &seeds {
            let h = reference_hash_f64(s);
            assert!((0..65536).contains(&h), "f64 hash out of range for seed {s}: {h}");
            let h = reference_hash_f32(s as f32);
            assert!((0..65536).contains(&h), "f32 hash out of range for seed {s}: {h}");
        }
    }

    #[test]
    fn hash_is_deterministic() {
        for &s in &[0.0, 0.5, -3.25, 1234.5678] {
            assert_eq!(reference_hash_f64(s), reference_hash_f64(s));
            assert_eq!(reference_hash_f32(s as f32), reference_hash_f32(s as f32));
        }
    }

    #[test]
    fn runtime_seed_is_numerically_zero() {
        // The kernel's runtime path feeds `0.0 + min(0.0, time)` — the
        // barrier that keeps the compiler from folding. time only ever
        // increases from 1/60, so the seed must stay exactly 0.0 and the
        // runtime hash must equal the hash of a literal zero.
        let h0 = reference_hash_f64(0.0);
        for &t in &[0.0, 1.0 / 60.0, 0.5, 1.0, 3600.0, 1e9] {
            let seed = 0.0 + f64::min(0.0, t);
            assert_eq!(seed.to_bits(), 0.0_f64.to_bits());
            assert_eq!(reference_hash_f64(seed), h0);
        }
    }

    #[test]
    fn fract_handles_negatives() {
        assert_eq!(fract_f64(-0.25), 0.75);
        assert_eq!(fract_f64(2.5), 0.5);
        assert_eq!(fract_f32(-0.25), 0.75);
    }

    #[test]
    fn intermediate_stays_finite() {
        // After the fract in each round `a` is in [0, 1), so the sqrt in
        // the sine term never sees a negative argument mid-chain.
        let mut a = -7.5_f64;
        for _ in 0..ROUNDS {
            let x = a + 0.1;
            let norm = (x * x + 6.11 * 6.11 + 5.22 * 5.22).sqrt();
            a = fract_f64(x / norm * 3.01);
            assert!((0.0..1.0).contains(&a));
            a += (a.sqrt() * 100.3).sin() * 0.31;
            assert!(a.is_finite());
        }
    }
}
