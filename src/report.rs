// report.rs — result and device-metadata formatting.
//
// Two outputs, both pass-through:
//   - per frame: the two hashes as zero-padded uppercase hex, tab-separated
//     (comptime first), one line on stdout;
//   - at startup: static device metadata gathered once from the adapter.
//
// No logic lives here beyond formatting. In particular nothing compares the
// two hashes: agreement and divergence are both valid measurements.

use std::fmt;

use crate::harness::HashPair;

/// One frame's measurement line: `<comptime hex>\t<runtime hex>`.
///
/// Hashes are 4 hex digits for any in-range value; a stack that produces an
/// out-of-range integer widens the field rather than truncating, since that
/// anomaly is itself worth seeing.
pub fn hash_line(pair: HashPair) -> String {
    format!("{:04X}\t{:04X}", pair.comptime, pair.runtime)
}

/// Static device metadata, gathered once at startup.
#[derive(Debug, Clone)]
pub struct DeviceReport {
    pub name: String,
    /// Integrated or software adapters report true.
    pub low_power: bool,
    /// Hot-pluggable (external) device. wgpu exposes no hot-plug query on
    /// any backend, so this is currently always false.
    pub removable: bool,
    /// Maximum compute invocations in one workgroup.
    pub max_threads_per_group: u32,
    /// Maximum buffer length in bytes.
    pub max_buffer_bytes: u64,
}

impl DeviceReport {
    /// Maximum buffer length in GiB (bytes ÷ 1024³).
    pub fn max_buffer_gib(&self) -> f64 {
        self.max_buffer_bytes as f64 / (1024.0 * 1024.0 * 1024.0)
    }
}

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "Is device low power? {}.", self.low_power)?;
        writeln!(f, "Is device external? {}.", self.removable)?;
        writeln!(f, "Maximum threads per group: {}.", self.max_threads_per_group)?;
        write!(f, "Maximum buffer length: {} GiB.", self.max_buffer_gib())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_line_is_padded_uppercase_tab_separated() {
        let pair = HashPair { comptime: 0x1A2B, runtime: 0x003C };
        assert_eq!(hash_line(pair), "1A2B\t003C");
    }

    #[test]
    fn hash_line_zero() {
        let pair = HashPair { comptime: 0, runtime: 0 };
        assert_eq!(hash_line(pair), "0000\t0000");
    }

    #[test]
    fn hash_line_max_in_range() {
        let pair = HashPair { comptime: 0xFFFF, runtime: 0xFFFF };
        assert_eq!(hash_line(pair), "FFFF\tFFFF");
    }

    #[test]
    fn gib_conversion() {
        let report = DeviceReport {
            name: "test".into(),
            low_power: false,
            removable: false,
            max_threads_per_group: 1024,
            max_buffer_bytes: 2 << 30,
        };
        assert_eq!(report.max_buffer_gib(), 2.0);
    }

    #[test]
    fn report_display_contains_every_field() {
        let report = DeviceReport {
            name: "Fake GPU 9000".into(),
            low_power: true,
            removable: false,
            max_threads_per_group: 256,
            max_buffer_bytes: 1 << 30,
        };
        let text = report.to_string();
        assert!(text.contains("Fake GPU 9000"));
        assert!(text.contains("low power? true"));
        assert!(text.contains("external? false"));
        assert!(text.contains("threads per group: 256"));
        assert!(text.contains("length: 1 GiB"));
    }
}
