//! Pre-built mock filesystem scenarios for testing.
//!
//! Counter values are kept small and round so expected deltas are easy to
//! read in assertions.

use super::filesystem::MockFs;

/// `/proc/net/dev` with `lo` (100/1000) and `eth0` (200/2000).
const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:     100       1    0    0    0     0          0         0     1000       10    0    0    0     0       0          0
  eth0:     200       2    0    0    0     0          0         0     2000       20    0    0    0     0       0          0
";

impl MockFs {
    /// Creates a system with one SATA disk, one NVMe disk and two interfaces.
    ///
    /// `sda` has 1000 sectors read and 2000 written; `nvme0n1` reports a
    /// 4096-byte physical block size in sysfs.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:        2000000 kB
MemFree:          500000 kB
MemAvailable:    1200000 kB
Buffers:          100000 kB
Cached:           300000 kB
SwapTotal:             0 kB
SwapFree:              0 kB
",
        );

        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 100 0 1000 50 200 0 2000 80 0 120 130 0 0 0 0
   8       1 sda1 90 0 900 40 180 0 1800 70 0 110 120 0 0 0 0
 259       0 nvme0n1 5000 20 40000 1000 3000 15 30000 800 0 1500 1800 0 0 0 0
",
        );
        fs.add_file("/sys/block/nvme0n1/queue/physical_block_size", "4096\n");

        fs.add_file("/proc/net/dev", NET_DEV);

        fs
    }

    /// Creates [`typical_system`](Self::typical_system) plus a running process `pid`.
    ///
    /// The process has VmPeak 30000 kB, VmSize 25000 kB, VmHWM 9000 kB and
    /// VmRSS 8000 kB, and sees the same two interfaces as the host.
    pub fn tracked_process(pid: u32) -> Self {
        let mut fs = Self::typical_system();

        fs.add_process(
            pid,
            &format!(
                "\
Name:\tworker
Umask:\t0022
State:\tS (sleeping)
Pid:\t{pid}
PPid:\t1
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmLck:\t       0 kB
VmHWM:\t    9000 kB
VmRSS:\t    8000 kB
VmData:\t    2000 kB
Threads:\t1
"
            ),
            "\
rchar: 1000000
wchar: 500000
syscr: 5000
syscw: 2500
read_bytes: 100000
write_bytes: 50000
cancelled_write_bytes: 0
",
            NET_DEV,
        );

        fs
    }

    /// Replaces the status file of `pid` with new memory figures (all in kB).
    pub fn set_process_memory(
        &mut self,
        pid: u32,
        vm_size: u64,
        vm_rss: u64,
        vm_peak: u64,
        vm_hwm: u64,
    ) {
        self.add_file(
            format!("/proc/{}/status", pid),
            format!(
                "Name:\tworker\nPid:\t{pid}\nVmPeak:\t{vm_peak} kB\nVmSize:\t{vm_size} kB\nVmHWM:\t{vm_hwm} kB\nVmRSS:\t{vm_rss} kB\n"
            ),
        );
    }

    /// Replaces `/proc/[pid]/io` with new counters.
    pub fn set_process_io(
        &mut self,
        pid: u32,
        rchar: u64,
        wchar: u64,
        read_bytes: u64,
        write_bytes: u64,
    ) {
        self.add_file(
            format!("/proc/{}/io", pid),
            format!(
                "rchar: {rchar}\nwchar: {wchar}\nsyscr: 0\nsyscw: 0\nread_bytes: {read_bytes}\nwrite_bytes: {write_bytes}\ncancelled_write_bytes: 0\n"
            ),
        );
    }

    /// Replaces the system `/proc/net/dev` with a single `lo` + `eth0` pair.
    pub fn set_net_dev(&mut self, lo: (u64, u64), eth0: (u64, u64)) {
        let content = net_dev_content(lo, eth0);
        self.add_file("/proc/net/dev", content);
    }

    /// Replaces `/proc/[pid]/net/dev` with a single `lo` + `eth0` pair.
    pub fn set_process_net_dev(&mut self, pid: u32, lo: (u64, u64), eth0: (u64, u64)) {
        let content = net_dev_content(lo, eth0);
        self.add_file(format!("/proc/{}/net/dev", pid), content);
    }

    /// Replaces the `sda` row of `/proc/diskstats` with new sector counts.
    pub fn set_sda_sectors(&mut self, read_sectors: u64, write_sectors: u64) {
        self.add_file(
            "/proc/diskstats",
            format!(
                "   8       0 sda 100 0 {read_sectors} 50 200 0 {write_sectors} 80 0 120 130 0 0 0 0\n"
            ),
        );
    }

    /// Replaces `/proc/meminfo` with the given totals (in kB).
    pub fn set_meminfo(&mut self, total: u64, free: u64) {
        self.add_file(
            "/proc/meminfo",
            format!("MemTotal:       {total} kB\nMemFree:        {free} kB\n"),
        );
    }
}

fn net_dev_content(lo: (u64, u64), eth0: (u64, u64)) -> String {
    format!(
        "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: {} 0 0 0 0 0 0 0 {} 0 0 0 0 0 0 0
  eth0: {} 0 0 0 0 0 0 0 {} 0 0 0 0 0 0 0
",
        lo.0, lo.1, eth0.0, eth0.1
    )
}
