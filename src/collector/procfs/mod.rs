//! Readers for the Linux `/proc` filesystem.
//!
//! `parser` holds the pure text parsers; `ProcfsReader` wires them to a
//! [`FileSystem`](crate::collector::FileSystem) and returns typed totals.

pub mod parser;
mod process;
mod reader;
mod system;

pub use parser::{ParseError, ProcIo, ProcStatus};
pub use reader::{
    CollectError, DEFAULT_SECTOR_SIZE, DiskTotals, InterfaceSelection, MemoryTotals,
    NetworkTotals, ProcfsReader,
};
