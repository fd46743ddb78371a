//! Counter snapshots, the session baseline, and delta computation.

use crate::collector::procfs::{DiskTotals, NetworkTotals, ProcIo, ProcStatus};
use serde::{Deserialize, Serialize};

impl DiskTotals {
    /// Bytes read/written since `baseline`.
    pub fn since(&self, baseline: &DiskTotals) -> DiskTotals {
        DiskTotals {
            read_bytes: self.read_bytes.saturating_sub(baseline.read_bytes),
            write_bytes: self.write_bytes.saturating_sub(baseline.write_bytes),
        }
    }
}

impl NetworkTotals {
    /// Bytes received/sent since `baseline`.
    pub fn since(&self, baseline: &NetworkTotals) -> NetworkTotals {
        NetworkTotals {
            recv_bytes: self.recv_bytes.saturating_sub(baseline.recv_bytes),
            send_bytes: self.send_bytes.saturating_sub(baseline.send_bytes),
        }
    }
}

impl ProcIo {
    /// I/O accounting since `baseline`.
    pub fn since(&self, baseline: &ProcIo) -> ProcIo {
        ProcIo {
            rchar: self.rchar.saturating_sub(baseline.rchar),
            wchar: self.wchar.saturating_sub(baseline.wchar),
            read_bytes: self.read_bytes.saturating_sub(baseline.read_bytes),
            write_bytes: self.write_bytes.saturating_sub(baseline.write_bytes),
        }
    }
}

/// Kernel-maintained memory maxima of the tracked process, in kB.
///
/// These are already cumulative maxima, so they are carried raw and never
/// subtracted from a baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peaks {
    #[serde(rename = "vmpeak")]
    pub vm_peak: u64,
    #[serde(rename = "vmhwm")]
    pub vm_hwm: u64,
}

impl From<&ProcStatus> for Peaks {
    fn from(status: &ProcStatus) -> Self {
        Peaks {
            vm_peak: status.vm_peak,
            vm_hwm: status.vm_hwm,
        }
    }
}

/// Absolute counters captured when the session starts.
///
/// Set once by the controller and read on every tick. A `None` field means the
/// corresponding mode is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Baseline {
    pub disk: Option<DiskTotals>,
    pub process_io: Option<ProcIo>,
    pub network: Option<NetworkTotals>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_delta() {
        let base = DiskTotals {
            read_bytes: 512000,
            write_bytes: 1024000,
        };
        let now = DiskTotals {
            read_bytes: 612000,
            write_bytes: 1024512,
        };
        assert_eq!(
            now.since(&base),
            DiskTotals {
                read_bytes: 100000,
                write_bytes: 512
            }
        );
    }

    #[test]
    fn test_delta_against_itself_is_zero() {
        let totals = NetworkTotals {
            recv_bytes: 300,
            send_bytes: 3000,
        };
        assert_eq!(totals.since(&totals), NetworkTotals::default());
    }

    #[test]
    fn test_network_delta() {
        let base = NetworkTotals {
            recv_bytes: 300,
            send_bytes: 3000,
        };
        let now = NetworkTotals {
            recv_bytes: 350,
            send_bytes: 3000,
        };
        assert_eq!(now.since(&base).recv_bytes, 50);
        assert_eq!(now.since(&base).send_bytes, 0);
    }

    #[test]
    fn test_delta_is_non_negative_for_many_pairs() {
        let values = [0u64, 1, 511, 512, 4096, 1 << 32, u64::MAX - 1, u64::MAX];
        for &base in &values {
            for &current in values.iter().filter(|&&v| v >= base) {
                let delta = ProcIo {
                    rchar: current,
                    wchar: current,
                    read_bytes: current,
                    write_bytes: current,
                }
                .since(&ProcIo {
                    rchar: base,
                    wchar: base,
                    read_bytes: base,
                    write_bytes: base,
                });
                assert_eq!(delta.rchar, current - base);
                assert_eq!(delta.write_bytes, current - base);
            }
        }
    }

    #[test]
    fn test_counter_reset_saturates() {
        let base = DiskTotals {
            read_bytes: 1000,
            write_bytes: 1000,
        };
        let after_reset = DiskTotals {
            read_bytes: 10,
            write_bytes: 2000,
        };
        let delta = after_reset.since(&base);
        assert_eq!(delta.read_bytes, 0);
        assert_eq!(delta.write_bytes, 1000);
    }

    #[test]
    fn test_peaks_from_status() {
        let status = ProcStatus {
            vm_peak: 30000,
            vm_size: 25000,
            vm_hwm: 9000,
            vm_rss: 8000,
        };
        assert_eq!(
            Peaks::from(&status),
            Peaks {
                vm_peak: 30000,
                vm_hwm: 9000
            }
        );
    }
}
