//! System-wide reads from `/proc/diskstats`, `/proc/meminfo` and `/proc/net/dev`.

use crate::collector::procfs::parser::{
    NetDevStats, ParseError, parse_block_size, parse_diskstats_device, parse_meminfo, parse_net_dev,
};
use crate::collector::procfs::reader::{
    CollectError, DEFAULT_SECTOR_SIZE, DiskTotals, InterfaceSelection, MemoryTotals,
    NetworkTotals, ProcfsReader,
};
use crate::collector::traits::FileSystem;
use tracing::{debug, warn};

/// Sums receive/transmit bytes over the selected interfaces of a `net/dev` file.
pub(super) fn sum_net_dev(
    content: &str,
    selection: &InterfaceSelection,
) -> Result<NetworkTotals, ParseError> {
    let devices = parse_net_dev(content)?;

    let selected: Vec<&NetDevStats> = match selection {
        InterfaceSelection::All => devices.iter().collect(),
        InterfaceSelection::Named(names) => names
            .iter()
            .map(|name| {
                devices
                    .iter()
                    .find(|dev| &dev.interface == name)
                    .ok_or_else(|| ParseError::new(format!("net/dev: no interface {}", name)))
            })
            .collect::<Result<_, _>>()?,
    };

    let mut totals = NetworkTotals::default();
    for dev in selected {
        let overflow = || ParseError::new(format!("net/dev: {} total overflows", dev.interface));
        totals.recv_bytes = totals
            .recv_bytes
            .checked_add(dev.rx_bytes)
            .ok_or_else(overflow)?;
        totals.send_bytes = totals
            .send_bytes
            .checked_add(dev.tx_bytes)
            .ok_or_else(overflow)?;
    }

    Ok(totals)
}

impl<F: FileSystem> ProcfsReader<F> {
    /// Reads cumulative read/write bytes for `device` from `/proc/diskstats`.
    pub fn read_disk_totals(
        &self,
        device: &str,
        sector_size: u64,
    ) -> Result<DiskTotals, CollectError> {
        let content = self.read(&format!("{}/diskstats", self.proc_path))?;
        let sectors = parse_diskstats_device(&content, device)?;
        let to_bytes = |count: u64| {
            count.checked_mul(sector_size).ok_or_else(|| {
                ParseError::new(format!(
                    "diskstats: {} sectors of {} bytes overflow on {}",
                    count, sector_size, device
                ))
            })
        };

        Ok(DiskTotals {
            read_bytes: to_bytes(sectors.read_sectors)?,
            write_bytes: to_bytes(sectors.write_sectors)?,
        })
    }

    /// Looks up the physical block size of `device` in sysfs.
    ///
    /// Falls back to [`DEFAULT_SECTOR_SIZE`] when the attribute is missing or unreadable.
    pub fn detect_sector_size(&self, device: &str) -> u64 {
        let path = format!(
            "{}/block/{}/queue/physical_block_size",
            self.sys_path, device
        );
        match self.read(&path) {
            Ok(content) => match parse_block_size(&content) {
                Ok(size) => {
                    debug!("{}: physical block size {} bytes", device, size);
                    size
                }
                Err(e) => {
                    warn!("{}: {}, assuming {} bytes", path, e, DEFAULT_SECTOR_SIZE);
                    DEFAULT_SECTOR_SIZE
                }
            },
            Err(e) => {
                debug!("{}: {}, assuming {} bytes", path, e, DEFAULT_SECTOR_SIZE);
                DEFAULT_SECTOR_SIZE
            }
        }
    }

    /// Reads used memory (`MemTotal - MemFree`) from `/proc/meminfo`.
    pub fn read_memory_totals(&self) -> Result<MemoryTotals, CollectError> {
        let content = self.read(&format!("{}/meminfo", self.proc_path))?;
        let info = parse_meminfo(&content)?;
        Ok(MemoryTotals {
            used_kib: info.used_kib(),
        })
    }

    /// Reads byte counters from `/proc/net/dev`, summed over `selection`.
    pub fn read_network_totals(
        &self,
        selection: &InterfaceSelection,
    ) -> Result<NetworkTotals, CollectError> {
        let content = self.read(&format!("{}/net/dev", self.proc_path))?;
        Ok(sum_net_dev(&content, selection)?)
    }
}
