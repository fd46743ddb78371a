//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for exercising the
//! procfs reader and the tracking loop without a Linux `/proc`.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
