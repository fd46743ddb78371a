//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.
//!
//! Every field a parser asks for is mandatory: a missing row, column or label
//! is reported as a [`ParseError`], never defaulted to zero.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses a numeric field, stripping any trailing unit suffix such as `" kB"`.
pub fn parse_counter(raw: &str, field: &str) -> Result<u64, ParseError> {
    let digits = raw
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .trim_end();
    if digits.is_empty() {
        return Err(ParseError::new(format!("missing value for {}", field)));
    }
    digits
        .parse()
        .map_err(|_| ParseError::new(format!("invalid {}: {:?}", field, raw.trim())))
}

/// Scans `label: value` lines and returns the values in the order of `labels`.
///
/// Scanning stops as soon as every label has been seen. Any label that never
/// appears is an error.
fn scan_labels<const N: usize>(
    content: &str,
    source: &str,
    labels: [&str; N],
) -> Result<[u64; N], ParseError> {
    let mut values: [Option<u64>; N] = [None; N];
    let mut remaining = N;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if let Some(idx) = labels.iter().position(|label| *label == key)
            && values[idx].is_none()
        {
            values[idx] = Some(parse_counter(value, key)?);
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
    }

    let mut out = [0u64; N];
    for (idx, value) in values.into_iter().enumerate() {
        out[idx] = value.ok_or_else(|| {
            ParseError::new(format!("{}: missing {}: line", source, labels[idx]))
        })?;
    }
    Ok(out)
}

// ============ Process Parsers ============

/// Memory figures from `/proc/[pid]/status`, all in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcStatus {
    pub vm_peak: u64,
    pub vm_size: u64,
    pub vm_hwm: u64,
    pub vm_rss: u64,
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is key:\tvalue pairs, one per line; memory values carry a `kB` suffix.
pub fn parse_proc_status(content: &str) -> Result<ProcStatus, ParseError> {
    let [vm_peak, vm_size, vm_hwm, vm_rss] = scan_labels(
        content,
        "status",
        ["VmPeak", "VmSize", "VmHWM", "VmRSS"],
    )?;

    Ok(ProcStatus {
        vm_peak,
        vm_size,
        vm_hwm,
        vm_rss,
    })
}

/// I/O accounting from `/proc/[pid]/io`, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcIo {
    pub rchar: u64,
    pub wchar: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Parses `/proc/[pid]/io` content.
///
/// Format is key: value pairs, one per line.
pub fn parse_proc_io(content: &str) -> Result<ProcIo, ParseError> {
    let [rchar, wchar, read_bytes, write_bytes] = scan_labels(
        content,
        "io",
        ["rchar", "wchar", "read_bytes", "write_bytes"],
    )?;

    Ok(ProcIo {
        rchar,
        wchar,
        read_bytes,
        write_bytes,
    })
}

// ============ Memory Parser ============

/// Parsed data from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
}

impl MemInfo {
    /// Used memory defined as `MemTotal - MemFree`.
    ///
    /// Buffers and page cache are counted as used.
    pub fn used_kib(&self) -> u64 {
        self.mem_total.saturating_sub(self.mem_free)
    }
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let [mem_total, mem_free] = scan_labels(content, "meminfo", ["MemTotal", "MemFree"])?;
    Ok(MemInfo {
        mem_total,
        mem_free,
    })
}

// ============ Disk Stats Parser ============

/// Sector counters for one row of `/proc/diskstats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskSectors {
    /// Number of sectors read
    pub read_sectors: u64,
    /// Number of sectors written
    pub write_sectors: u64,
}

/// Column of the device name in a whitespace-split diskstats row.
const DISKSTATS_COL_DEVICE: usize = 2;
/// Column of "sectors read".
const DISKSTATS_COL_READ: usize = 5;
/// Column of "sectors written".
const DISKSTATS_COL_WRITE: usize = 9;

/// Selects the row for `device` from `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats_device(content: &str, device: &str) -> Result<DiskSectors, ParseError> {
    let parts: Vec<&str> = content
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|parts| parts.get(DISKSTATS_COL_DEVICE) == Some(&device))
        .ok_or_else(|| ParseError::new(format!("diskstats: no row for device {}", device)))?;

    let get_val = |idx: usize, name: &str| -> Result<u64, ParseError> {
        let raw = parts.get(idx).ok_or_else(|| {
            ParseError::new(format!("diskstats: {} row has no {} column", device, name))
        })?;
        raw.parse()
            .map_err(|_| ParseError::new(format!("diskstats: invalid {} for {}", name, device)))
    };

    Ok(DiskSectors {
        read_sectors: get_val(DISKSTATS_COL_READ, "read_sectors")?,
        write_sectors: get_val(DISKSTATS_COL_WRITE, "write_sectors")?,
    })
}

/// Parses `/sys/block/<dev>/queue/physical_block_size`.
pub fn parse_block_size(content: &str) -> Result<u64, ParseError> {
    let size = parse_counter(content, "physical_block_size")?;
    if size == 0 {
        return Err(ParseError::new("physical_block_size is zero"));
    }
    Ok(size)
}

// ============ Network Device Parser ============

/// Byte counters for one interface in `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetDevStats {
    /// Interface name (eth0, lo, etc.)
    pub interface: String,
    /// Bytes received
    pub rx_bytes: u64,
    /// Bytes transmitted
    pub tx_bytes: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
///
/// Only lines containing a colon describe interfaces; the two header lines are skipped.
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevStats>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        if line.contains('|') {
            continue;
        }
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };

        let interface = name.trim().to_string();
        let values: Vec<&str> = counters.split_whitespace().collect();

        let get_val = |idx: usize, field: &str| -> Result<u64, ParseError> {
            values
                .get(idx)
                .ok_or_else(|| ParseError::new(format!("net/dev: {} has no {}", interface, field)))?
                .parse()
                .map_err(|_| ParseError::new(format!("net/dev: invalid {} for {}", field, interface)))
        };

        let rx_bytes = get_val(0, "rx_bytes")?;
        let tx_bytes = get_val(8, "tx_bytes")?;
        devices.push(NetDevStats {
            interface,
            rx_bytes,
            tx_bytes,
        });
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
";

    #[test]
    fn test_parse_counter_strips_unit_suffix() {
        assert_eq!(parse_counter("   30000 kB", "VmPeak").unwrap(), 30000);
        assert_eq!(parse_counter("\t42\n", "rchar").unwrap(), 42);
        assert_eq!(parse_counter("512", "size").unwrap(), 512);
    }

    #[test]
    fn test_parse_counter_rejects_garbage() {
        assert!(parse_counter(" kB", "VmRSS").is_err());
        assert!(parse_counter("", "VmRSS").is_err());
        assert!(parse_counter("12x4 kB", "VmRSS").is_err());
        assert!(parse_counter("-5", "VmRSS").is_err());
    }

    #[test]
    fn test_parse_proc_status() {
        let content = "\
Name:\tbash
Pid:\t1234
PPid:\t1233
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmLck:\t        0 kB
VmHWM:\t    9000 kB
VmRSS:\t    8000 kB
VmData:\t    2000 kB
voluntary_ctxt_switches:\t500
";
        let status = parse_proc_status(content).unwrap();

        assert_eq!(status.vm_peak, 30000);
        assert_eq!(status.vm_size, 25000);
        assert_eq!(status.vm_hwm, 9000);
        assert_eq!(status.vm_rss, 8000);
    }

    #[test]
    fn test_parse_proc_status_missing_label() {
        // Kernel threads have no Vm* lines at all.
        let content = "Name:\tkthreadd\nPid:\t2\nPPid:\t0\n";
        let err = parse_proc_status(content).unwrap_err();
        assert!(err.message.contains("VmPeak"));
    }

    #[test]
    fn test_parse_proc_status_first_occurrence_wins() {
        let content = "\
VmPeak:\t 10 kB
VmSize:\t 9 kB
VmHWM:\t 8 kB
VmRSS:\t 7 kB
VmRSS:\t garbage
";
        let status = parse_proc_status(content).unwrap();
        assert_eq!(status.vm_rss, 7);
    }

    #[test]
    fn test_parse_proc_io() {
        let content = "\
rchar: 1000000
wchar: 500000
syscr: 5000
syscw: 2500
read_bytes: 100000
write_bytes: 50000
cancelled_write_bytes: 1000
";
        let io = parse_proc_io(content).unwrap();

        assert_eq!(io.rchar, 1000000);
        assert_eq!(io.wchar, 500000);
        assert_eq!(io.read_bytes, 100000);
        assert_eq!(io.write_bytes, 50000);
    }

    #[test]
    fn test_parse_proc_io_non_numeric() {
        let content = "rchar: lots\nwchar: 1\nread_bytes: 2\nwrite_bytes: 3\n";
        assert!(parse_proc_io(content).is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:        2000000 kB
MemFree:          500000 kB
MemAvailable:    1200000 kB
Buffers:          100000 kB
Cached:           300000 kB
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, 2000000);
        assert_eq!(info.mem_free, 500000);
        assert_eq!(info.used_kib(), 1500000);
    }

    #[test]
    fn test_parse_meminfo_malformed() {
        assert!(parse_meminfo("MemTotal: lots kB\nMemFree: 1 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: 100 kB\n").is_err());
    }

    #[test]
    fn test_parse_meminfo_is_idempotent() {
        let content = "MemTotal: 16384000 kB\nMemFree: 8192000 kB\n";
        assert_eq!(parse_meminfo(content), parse_meminfo(content));
    }

    #[test]
    fn test_parse_diskstats_device() {
        let content = "\
   8       0 sda 1234 0 1000 100 5678 0 2000 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
";
        let sda = parse_diskstats_device(content, "sda").unwrap();
        assert_eq!(sda.read_sectors, 1000);
        assert_eq!(sda.write_sectors, 2000);

        let nvme = parse_diskstats_device(content, "nvme0n1").unwrap();
        assert_eq!(nvme.read_sectors, 123456);
        assert_eq!(nvme.write_sectors, 654321);
    }

    #[test]
    fn test_parse_diskstats_device_does_not_match_prefix() {
        let content = "   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260\n";
        assert!(parse_diskstats_device(content, "sda").is_err());
    }

    #[test]
    fn test_parse_diskstats_device_short_row() {
        let content = "   8       0 sda 1234 0 1000 100 5678\n";
        let err = parse_diskstats_device(content, "sda").unwrap_err();
        assert!(err.message.contains("write_sectors"));
    }

    #[test]
    fn test_parse_diskstats_device_non_numeric() {
        let content = "   8       0 sda 1234 0 many 100 5678 0 2000 200 0 150 300\n";
        assert!(parse_diskstats_device(content, "sda").is_err());
    }

    #[test]
    fn test_parse_block_size() {
        assert_eq!(parse_block_size("4096\n").unwrap(), 4096);
        assert!(parse_block_size("0\n").is_err());
        assert!(parse_block_size("\n").is_err());
    }

    #[test]
    fn test_parse_net_dev() {
        let devices = parse_net_dev(NET_DEV).unwrap();

        assert_eq!(devices.len(), 2);

        assert_eq!(devices[0].interface, "lo");
        assert_eq!(devices[0].rx_bytes, 1234567);
        assert_eq!(devices[0].tx_bytes, 1234567);

        assert_eq!(devices[1].interface, "eth0");
        assert_eq!(devices[1].rx_bytes, 9876543);
        assert_eq!(devices[1].tx_bytes, 87654321);
    }

    #[test]
    fn test_parse_net_dev_without_space_after_colon() {
        let content = "  eth0:9876543 5678 1 2 0 0 0 10 87654321 4321 3 4 0 0 0 0\n";
        let devices = parse_net_dev(content).unwrap();
        assert_eq!(devices[0].rx_bytes, 9876543);
        assert_eq!(devices[0].tx_bytes, 87654321);
    }

    #[test]
    fn test_parse_net_dev_truncated_line() {
        let content = "  eth0: 100 1 0 0\n";
        assert!(parse_net_dev(content).is_err());
    }
}
