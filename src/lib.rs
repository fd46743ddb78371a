//! proctrack - procfs resource tracker library.
//!
//! Samples disk I/O, memory and network counters for the whole host or for a
//! single process at a fixed interval, reports them as deltas since the start
//! of the session, and prints them to the console or exports them as JSON.
//!
//! - [`collector`] reads and parses procfs through a mockable filesystem
//! - [`track`] runs the sampling session
//! - [`util`] holds timestamp formatting

pub mod collector;
pub mod track;
pub mod util;
