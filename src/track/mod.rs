//! Tracking sessions: configuration, the sampling loop, and sample output.
//!
//! A [`TrackController`] owns a [`ProcfsReader`](crate::collector::ProcfsReader)
//! and a [`TrackConfig`]. Calling [`TrackController::run`] captures a baseline,
//! samples at the configured interval until a stop condition, then flushes the
//! series through its [`SampleSink`].

pub mod config;
pub mod controller;
pub mod error;
pub mod output;
pub mod sample;
pub mod snapshot;

pub use config::{Capabilities, NetworkBaseline, OutputTarget, SectorSize, Target, TrackConfig};
pub use controller::{
    StopHandle, StopReason, TrackController, TrackState, TrackSummary, remaining_interval,
};
pub use error::TrackError;
pub use output::{SampleSink, write_json_atomic};
pub use sample::{MemorySection, ProcessReport, ProcessSample, Sample, SystemSample, TrackedSeries};
pub use snapshot::{Baseline, Peaks};
