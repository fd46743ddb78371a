//! Typed procfs reads shared by the system and per-process collectors.

use crate::collector::procfs::parser::ParseError;
use crate::collector::traits::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bytes per sector when the device does not say otherwise.
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// The tracked process's `/proc/[pid]` entry disappeared.
    ProcessGone(u32),
    /// A per-process file exists but the caller may not read it.
    PermissionDenied(String),
    /// I/O error reading a system-wide file.
    Io(std::io::Error),
    /// Parse error in a procfs file.
    Parse(ParseError),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::ProcessGone(pid) => write!(f, "process {} disappeared", pid),
            CollectError::PermissionDenied(path) => write!(
                f,
                "permission denied reading {} (run as root or as the process owner)",
                path
            ),
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::ProcessGone(_) | CollectError::PermissionDenied(_) => None,
            CollectError::Io(e) => Some(e),
            CollectError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e)
    }
}

/// Cumulative disk traffic of one block device, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskTotals {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// System memory usage, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTotals {
    pub used_kib: u64,
}

/// Cumulative network traffic summed over a set of interfaces, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTotals {
    pub recv_bytes: u64,
    pub send_bytes: u64,
}

/// Which `/proc/net/dev` lines contribute to a [`NetworkTotals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceSelection {
    /// Exactly these interfaces; each one must be present.
    Named(Vec<String>),
    /// Every interface line in the file.
    All,
}

/// Reads procfs (and the one sysfs attribute the tracker needs) through a [`FileSystem`].
///
/// The reader holds no sampling state: every call re-reads its file and
/// returns fresh absolute values. Baselines and deltas live in the controller.
pub struct ProcfsReader<F: FileSystem> {
    pub(super) fs: F,
    pub(super) proc_path: String,
    pub(super) sys_path: String,
}

impl<F: FileSystem> ProcfsReader<F> {
    /// Creates a new reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            sys_path: "/sys".to_string(),
        }
    }

    /// Overrides the sysfs root (usually "/sys").
    pub fn with_sys_path(mut self, sys_path: impl Into<String>) -> Self {
        self.sys_path = sys_path.into();
        self
    }

    pub(super) fn read(&self, path: &str) -> Result<String, CollectError> {
        Ok(self.fs.read_to_string(Path::new(path))?)
    }
}
