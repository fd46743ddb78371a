//! Counter collection from the Linux `/proc` filesystem.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ProcfsReader                 │
//! │  system:  /proc/diskstats  /proc/meminfo     │
//! │           /proc/net/dev    /sys/block/*      │
//! │  process: /proc/[pid]/{status,io,net/dev}    │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │  FileSystem │ (trait)
//!                 └──────┬──────┘
//!              ┌─────────┴─────────┐
//!       ┌──────▼──────┐     ┌──────▼──────┐
//!       │   RealFs    │     │   MockFs    │
//!       │  (Linux)    │     │  (Testing)  │
//!       └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use proctrack::collector::{MockFs, ProcfsReader};
//!
//! let reader = ProcfsReader::new(MockFs::typical_system(), "/proc");
//! let mem = reader.read_memory_totals().unwrap();
//! assert_eq!(mem.used_kib, 1_500_000);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{
    CollectError, DiskTotals, InterfaceSelection, MemoryTotals, NetworkTotals, ProcfsReader,
};
pub use traits::{FileSystem, RealFs};
