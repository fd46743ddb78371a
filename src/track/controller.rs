//! The sampling loop: baseline capture, fixed-interval ticks, and finalization.
//!
//! ```text
//!   Idle ──run()──▶ Running ──stop request / process exit / limit / read error──▶ Stopped
//! ```
//!
//! Each tick reads procfs, turns absolute counters into deltas against the
//! baseline, hands the sample to the sink, then sleeps whatever is left of the
//! interval. A tick that overruns the interval is followed immediately by the
//! next one; missed ticks are not made up.

use crate::collector::procfs::{CollectError, InterfaceSelection, NetworkTotals, ProcfsReader};
use crate::collector::traits::FileSystem;
use crate::track::config::{NetworkBaseline, SectorSize, Target, TrackConfig};
use crate::track::error::TrackError;
use crate::track::output::SampleSink;
use crate::track::sample::{MemorySection, ProcessSample, Sample, SystemSample};
use crate::track::snapshot::{Baseline, Peaks};
use crate::util::format_timestamp;
use chrono::Local;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Longest uninterrupted sleep; a stop request is noticed within this delay.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Cooperative cancellation flag shared between the controller and a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Asks the session to stop after the tick in flight.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a controller. There is no way back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Idle,
    Running,
    Stopped,
}

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// [`StopHandle::stop`] was called (e.g. SIGINT).
    Requested,
    /// The tracked process's `/proc` entry disappeared.
    ProcessExited(u32),
    /// The configured sample limit was reached.
    SampleLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Requested => write!(f, "stop requested"),
            StopReason::ProcessExited(pid) => write!(f, "process {} exited", pid),
            StopReason::SampleLimit => write!(f, "sample limit reached"),
        }
    }
}

/// Outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub stop_reason: StopReason,
    pub samples: u64,
    /// Last observed VmPeak/VmHWM (process targets only).
    pub peaks: Option<Peaks>,
    /// Export file, if the session wrote one.
    pub output: Option<PathBuf>,
}

/// How long to sleep after a tick that took `elapsed`.
///
/// Never negative: an overrunning tick yields a zero sleep rather than a
/// shortened next interval.
pub fn remaining_interval(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

enum TickOutcome {
    Sample(Sample),
    /// The tick produced nothing but the session continues.
    Skipped,
    ProcessExited(u32),
}

/// Drives one tracking session.
pub struct TrackController<F: FileSystem> {
    reader: ProcfsReader<F>,
    config: TrackConfig,
    state: TrackState,
    stop: StopHandle,
    interfaces: InterfaceSelection,
    sector_size: u64,
    peaks: Option<Peaks>,
}

impl<F: FileSystem> TrackController<F> {
    /// Creates an idle controller reading procfs through `fs`.
    pub fn new(fs: F, config: TrackConfig) -> Self {
        let reader =
            ProcfsReader::new(fs, config.proc_path.clone()).with_sys_path(config.sys_path.clone());
        let interfaces = match config.target {
            Target::System => InterfaceSelection::Named(config.interfaces.clone()),
            Target::Process(_) => InterfaceSelection::All,
        };
        Self {
            reader,
            config,
            state: TrackState::Idle,
            stop: StopHandle::default(),
            interfaces,
            sector_size: 0,
            peaks: None,
        }
    }

    /// Returns a handle that stops this controller from another thread or a signal handler.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Runs the session, printing console samples to stdout.
    pub fn run(&mut self) -> Result<TrackSummary, TrackError> {
        let stdout = std::io::stdout();
        self.run_with_console(stdout.lock())
    }

    /// Runs the session until a stop condition, printing console samples to `console`.
    ///
    /// Process exit, a stop request and the sample limit end the session with
    /// `Ok`. A read error in a system source, or a per-process file the
    /// caller may not read, ends it with `Err` after the samples gathered so
    /// far have been written out.
    pub fn run_with_console<W: Write>(&mut self, console: W) -> Result<TrackSummary, TrackError> {
        if self.state != TrackState::Idle {
            return Err(TrackError::AlreadyStarted);
        }
        self.config.validate()?;

        let baseline = match self.capture_baseline() {
            Ok(baseline) => baseline,
            Err(e) => {
                self.state = TrackState::Stopped;
                return Err(e.into());
            }
        };

        self.state = TrackState::Running;
        info!(
            "Tracking {} every {:?} (disk_io={}, memory={}, network={})",
            self.config.target,
            self.config.interval,
            self.config.capabilities.disk_io,
            self.config.capabilities.memory,
            self.config.capabilities.network
        );

        let mut sink = SampleSink::new(&self.config.output, self.config.target, console);
        let mut failure: Option<TrackError> = None;

        let stop_reason = loop {
            if self.stop.is_stopped() {
                break StopReason::Requested;
            }

            let tick_start = Instant::now();
            match self.tick(&baseline) {
                Ok(TickOutcome::Sample(sample)) => {
                    trace!("Sample {}: {}", sink.emitted() + 1, sample.date());
                    if let Err(e) = sink.emit(sample) {
                        failure = Some(e);
                        break StopReason::Requested;
                    }
                }
                Ok(TickOutcome::Skipped) => {}
                Ok(TickOutcome::ProcessExited(pid)) => break StopReason::ProcessExited(pid),
                Err(e) => {
                    error!("Stopping after read error: {}", e);
                    failure = Some(e.into());
                    break StopReason::Requested;
                }
            }

            if self
                .config
                .max_samples
                .is_some_and(|max| sink.emitted() >= max)
            {
                break StopReason::SampleLimit;
            }

            self.pause(remaining_interval(
                self.config.interval,
                tick_start.elapsed(),
            ));
        };

        self.state = TrackState::Stopped;
        let samples = sink.emitted();
        if failure.is_none() {
            info!("Tracking stopped: {} after {} samples", stop_reason, samples);
        }

        let output = match sink.finish(self.peaks) {
            Ok(output) => output,
            Err(e) => {
                if let Some(first) = failure {
                    error!("{}", e);
                    return Err(first);
                }
                return Err(e);
            }
        };
        if let Some(e) = failure {
            return Err(e);
        }

        Ok(TrackSummary {
            stop_reason,
            samples,
            peaks: self.peaks,
            output,
        })
    }

    /// Reads the absolute counters that every later tick is measured against.
    fn capture_baseline(&mut self) -> Result<Baseline, CollectError> {
        let caps = self.config.capabilities;
        let mut baseline = Baseline::default();

        match self.config.target {
            Target::System => {
                if caps.disk_io {
                    self.sector_size = match self.config.sector_size {
                        SectorSize::Fixed(size) => size,
                        SectorSize::Detect => self.reader.detect_sector_size(&self.config.device),
                    };
                    baseline.disk = Some(
                        self.reader
                            .read_disk_totals(&self.config.device, self.sector_size)?,
                    );
                }
                if caps.network {
                    baseline.network = Some(self.network_baseline(|reader, selection| {
                        reader.read_network_totals(selection)
                    })?);
                }
            }
            Target::Process(pid) => {
                let status = self.reader.read_process_status(pid)?;
                self.peaks = Some(Peaks::from(&status));
                if caps.disk_io {
                    baseline.process_io = Some(self.reader.read_process_io(pid)?);
                }
                if caps.network {
                    baseline.network = Some(self.network_baseline(|reader, _| {
                        reader.read_process_network(pid)
                    })?);
                }
            }
        }

        debug!("Baseline: {:?}", baseline);
        Ok(baseline)
    }

    fn network_baseline<R>(&self, read: R) -> Result<NetworkTotals, CollectError>
    where
        R: Fn(&ProcfsReader<F>, &InterfaceSelection) -> Result<NetworkTotals, CollectError>,
    {
        match self.config.network_baseline {
            NetworkBaseline::Session => read(&self.reader, &self.interfaces),
            NetworkBaseline::Absolute => Ok(Default::default()),
        }
    }

    fn tick(&mut self, baseline: &Baseline) -> Result<TickOutcome, CollectError> {
        let date = format_timestamp(&Local::now());
        match self.config.target {
            Target::System => self.system_tick(date, baseline).map(TickOutcome::Sample),
            Target::Process(pid) => match self.process_tick(pid, date, baseline) {
                Ok(sample) => Ok(TickOutcome::Sample(sample)),
                Err(CollectError::ProcessGone(pid)) => {
                    info!("Process {} is gone", pid);
                    Ok(TickOutcome::ProcessExited(pid))
                }
                Err(e @ CollectError::PermissionDenied(_)) => Err(e),
                Err(e) => {
                    warn!("Skipping sample for pid {}: {}", pid, e);
                    Ok(TickOutcome::Skipped)
                }
            },
        }
    }

    /// All enabled sources are read before anything is emitted; one bad
    /// source fails the whole tick.
    fn system_tick(&self, date: String, baseline: &Baseline) -> Result<Sample, CollectError> {
        let caps = self.config.capabilities;
        let mut sample = SystemSample {
            date,
            ..SystemSample::default()
        };

        if let Some(base) = &baseline.disk {
            let totals = self
                .reader
                .read_disk_totals(&self.config.device, self.sector_size)?;
            sample.io = Some(totals.since(base));
        }
        if caps.memory {
            sample.mem = Some(MemorySection::from(self.reader.read_memory_totals()?));
        }
        if let Some(base) = &baseline.network {
            let totals = self.reader.read_network_totals(&self.interfaces)?;
            sample.net = Some(totals.since(base));
        }

        Ok(Sample::System(sample))
    }

    /// The status file is read on every tick regardless of modes: its
    /// disappearance is what signals that the process exited.
    fn process_tick(
        &mut self,
        pid: u32,
        date: String,
        baseline: &Baseline,
    ) -> Result<Sample, CollectError> {
        let status = self.reader.read_process_status(pid)?;
        self.peaks = Some(Peaks::from(&status));

        let mut sample = ProcessSample::new(date);
        if self.config.capabilities.memory {
            sample.set_memory(&status);
        }
        if let Some(base) = &baseline.process_io {
            let io = self.reader.read_process_io(pid)?;
            sample.set_io(&io.since(base));
        }
        if let Some(base) = &baseline.network {
            let net = self.reader.read_process_network(pid)?;
            sample.set_network(&net.since(base));
        }

        Ok(Sample::Process(sample))
    }

    /// Sleeps for `duration` in short slices, returning early on a stop request.
    fn pause(&self, duration: Duration) {
        let mut remaining = duration;
        while remaining > Duration::ZERO && !self.stop.is_stopped() {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
