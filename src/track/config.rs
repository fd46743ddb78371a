//! Tracking session configuration.

use crate::collector::procfs::DEFAULT_SECTOR_SIZE;
use crate::track::error::TrackError;
use std::path::PathBuf;
use std::time::Duration;

/// What the session samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Host-wide counters: one block device, `/proc/meminfo`, selected interfaces.
    System,
    /// A single process via `/proc/[pid]/`.
    Process(u32),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::System => write!(f, "system"),
            Target::Process(pid) => write!(f, "pid {}", pid),
        }
    }
}

/// Independently togglable measurement modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub disk_io: bool,
    pub memory: bool,
    pub network: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        disk_io: true,
        memory: true,
        network: true,
    };

    pub const MEMORY_ONLY: Capabilities = Capabilities {
        disk_io: false,
        memory: true,
        network: false,
    };

    /// Returns `true` if no mode is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.disk_io || self.memory || self.network)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

/// Where samples go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Print each sample to stdout as soon as it is taken; nothing is retained.
    #[default]
    Console,
    /// Keep the whole series in memory and write one JSON document on stop.
    File(PathBuf),
}

/// Bytes per diskstats sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorSize {
    Fixed(u64),
    /// Read `/sys/block/<dev>/queue/physical_block_size`, falling back to 512.
    Detect,
}

impl Default for SectorSize {
    fn default() -> Self {
        SectorSize::Fixed(DEFAULT_SECTOR_SIZE)
    }
}

/// How network counters are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkBaseline {
    /// Subtract the first successful read; every run starts from zero.
    #[default]
    Session,
    /// Report the kernel's cumulative counters unchanged.
    Absolute,
}

/// Validated input to a [`TrackController`](crate::track::TrackController).
#[derive(Debug, Clone)]
pub struct TrackConfig {
    pub interval: Duration,
    pub target: Target,
    pub capabilities: Capabilities,
    pub output: OutputTarget,
    /// Block device whose diskstats row is tracked (system target only).
    pub device: String,
    /// Interfaces summed for system network totals.
    pub interfaces: Vec<String>,
    pub sector_size: SectorSize,
    pub network_baseline: NetworkBaseline,
    /// Stop after this many samples.
    pub max_samples: Option<u64>,
    pub proc_path: String,
    pub sys_path: String,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            target: Target::System,
            capabilities: Capabilities::ALL,
            output: OutputTarget::Console,
            device: "sda".to_string(),
            interfaces: vec!["wlan0".to_string(), "lo".to_string(), "eth0".to_string()],
            sector_size: SectorSize::default(),
            network_baseline: NetworkBaseline::default(),
            max_samples: None,
            proc_path: "/proc".to_string(),
            sys_path: "/sys".to_string(),
        }
    }
}

impl TrackConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_interfaces<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces = interfaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sector_size(mut self, sector_size: SectorSize) -> Self {
        self.sector_size = sector_size;
        self
    }

    pub fn with_network_baseline(mut self, baseline: NetworkBaseline) -> Self {
        self.network_baseline = baseline;
        self
    }

    pub fn with_max_samples(mut self, max_samples: u64) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    pub fn with_proc_path(mut self, proc_path: impl Into<String>) -> Self {
        self.proc_path = proc_path.into();
        self
    }

    pub fn with_sys_path(mut self, sys_path: impl Into<String>) -> Self {
        self.sys_path = sys_path.into();
        self
    }

    /// Checks invariants that the sampling loop relies on.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.interval.is_zero() {
            return Err(TrackError::InvalidConfig(
                "interval must be positive".to_string(),
            ));
        }
        if self.capabilities.is_empty() {
            return Err(TrackError::InvalidConfig(
                "at least one of disk I/O, memory or network must be enabled".to_string(),
            ));
        }
        if let SectorSize::Fixed(0) = self.sector_size {
            return Err(TrackError::InvalidConfig(
                "sector size must be positive".to_string(),
            ));
        }
        if self.max_samples == Some(0) {
            return Err(TrackError::InvalidConfig(
                "sample limit must be positive".to_string(),
            ));
        }
        if self.target == Target::System {
            if self.capabilities.disk_io && self.device.trim().is_empty() {
                return Err(TrackError::InvalidConfig(
                    "disk I/O tracking needs a block device".to_string(),
                ));
            }
            if self.capabilities.network && self.interfaces.is_empty() {
                return Err(TrackError::InvalidConfig(
                    "network tracking needs at least one interface".to_string(),
                ));
            }
        }
        Ok(())
    }
}
