//! Emitted samples and the tracked series, in their JSON shapes.
//!
//! System sample:
//! `{"date", "io": {"read_bytes", "write_bytes"}, "mem": {"used_kilobytes"}, "net": {"recv_bytes", "send_bytes"}}`
//!
//! Process sample:
//! `{"date", "vmsize", "vmrss", "rchar", "wchar", "read_bytes", "write_bytes", "rec_bytes", "snd_bytes"}`
//!
//! Sections and fields of disabled modes are omitted.

use crate::collector::procfs::{DiskTotals, MemoryTotals, NetworkTotals, ProcIo, ProcStatus};
use crate::track::config::Target;
use crate::track::snapshot::Peaks;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Memory section of a system sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySection {
    pub used_kilobytes: u64,
}

impl From<MemoryTotals> for MemorySection {
    fn from(totals: MemoryTotals) -> Self {
        MemorySection {
            used_kilobytes: totals.used_kib,
        }
    }
}

/// One host-wide sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSample {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<DiskTotals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<MemorySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<NetworkTotals>,
}

/// One per-process sample.
///
/// `vmsize`/`vmrss` are raw gauges in kB; the other fields are deltas since
/// the session baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSample {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmsize: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmrss: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rchar: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wchar: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snd_bytes: Option<u64>,
}

impl ProcessSample {
    pub fn new(date: String) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    pub fn set_memory(&mut self, status: &ProcStatus) {
        self.vmsize = Some(status.vm_size);
        self.vmrss = Some(status.vm_rss);
    }

    pub fn set_io(&mut self, delta: &ProcIo) {
        self.rchar = Some(delta.rchar);
        self.wchar = Some(delta.wchar);
        self.read_bytes = Some(delta.read_bytes);
        self.write_bytes = Some(delta.write_bytes);
    }

    pub fn set_network(&mut self, delta: &NetworkTotals) {
        self.rec_bytes = Some(delta.recv_bytes);
        self.snd_bytes = Some(delta.send_bytes);
    }
}

/// A sample of either target kind. Serializes as the bare inner object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Sample {
    System(SystemSample),
    Process(ProcessSample),
}

impl Sample {
    pub fn date(&self) -> &str {
        match self {
            Sample::System(s) => &s.date,
            Sample::Process(s) => &s.date,
        }
    }
}

/// Export document of a process session: summary peaks plus the samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    #[serde(flatten)]
    pub peaks: Peaks,
    pub data: Vec<ProcessSample>,
}

/// Samples in temporal order, shaped as the export document.
///
/// A system series serializes as a JSON array; a process series as an object
/// with `vmpeak`, `vmhwm` and `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackedSeries {
    System(Vec<SystemSample>),
    Process(ProcessReport),
}

impl TrackedSeries {
    /// Creates an empty series for `target`.
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::System => TrackedSeries::System(Vec::new()),
            Target::Process(_) => TrackedSeries::Process(ProcessReport::default()),
        }
    }

    /// Appends a sample. A sample of the other target kind is dropped.
    pub fn push(&mut self, sample: Sample) {
        match (self, sample) {
            (TrackedSeries::System(samples), Sample::System(s)) => samples.push(s),
            (TrackedSeries::Process(report), Sample::Process(s)) => report.data.push(s),
            (_, sample) => warn!("dropping sample from {}: target mismatch", sample.date()),
        }
    }

    /// Records the final peaks. No-op for system series.
    pub fn set_peaks(&mut self, peaks: Peaks) {
        if let TrackedSeries::Process(report) = self {
            report.peaks = peaks;
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TrackedSeries::System(samples) => samples.len(),
            TrackedSeries::Process(report) => report.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
