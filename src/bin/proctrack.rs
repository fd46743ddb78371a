//! proctrack - samples disk I/O, memory and network usage from procfs.
//!
//! Tracks either the whole host or one process (`--pid`). Samples are printed
//! to stdout as JSON objects, or collected and written to `--output` when the
//! session ends (Ctrl-C, process exit, or `--count` samples).

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use proctrack::collector::{FileSystem, ProcfsReader, RealFs};
use proctrack::track::{
    Capabilities, NetworkBaseline, OutputTarget, SectorSize, Target, TrackConfig, TrackController,
};

/// Procfs resource tracker.
#[derive(Parser, Debug)]
#[command(name = "proctrack", about = "Procfs resource tracker", version)]
struct Args {
    /// Sampling interval in seconds (fractions allowed, e.g. "0.5").
    #[arg(short, long, default_value = "1", value_parser = parse_interval)]
    interval: Duration,

    /// Write the whole series to this JSON file on stop instead of printing samples.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Track a single process instead of the whole system.
    #[arg(short, long)]
    pid: Option<u32>,

    /// Track disk I/O.
    #[arg(long)]
    io: bool,

    /// Track memory.
    #[arg(long)]
    mem: bool,

    /// Track network traffic.
    #[arg(long)]
    net: bool,

    /// Block device whose /proc/diskstats row is tracked.
    #[arg(long, default_value = "sda")]
    device: String,

    /// Interface summed for system network totals. Repeat for several.
    /// Defaults to wlan0, lo and eth0.
    #[arg(long = "interface", value_name = "NAME")]
    interfaces: Vec<String>,

    /// Bytes per diskstats sector.
    #[arg(long, default_value = "512", value_parser = parse_sector_size)]
    sector_size: u64,

    /// Read the sector size from /sys/block/<device>/queue/physical_block_size.
    #[arg(long, conflicts_with = "sector_size")]
    detect_sector_size: bool,

    /// Report the kernel's cumulative network counters instead of deltas.
    #[arg(long)]
    absolute_net_counters: bool,

    /// Stop after this many samples.
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to /sys filesystem.
    #[arg(long, default_value = "/sys")]
    sys_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Parses a positive number of seconds, e.g. "1", "0.25", "2.5".
fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let secs = s
        .parse::<f64>()
        .map_err(|e| format!("invalid interval '{}': {}", s, e))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("interval must be positive, got '{}'", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid interval '{}': {}", s, e))
}

fn parse_sector_size(s: &str) -> Result<u64, String> {
    match s.trim().parse::<u64>() {
        Ok(0) => Err("sector size must be positive".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid sector size '{}': {}", s, e)),
    }
}

/// Initializes the tracing subscriber on stderr; stdout is reserved for samples.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    match format!("proctrack={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("invalid log directive: {}", e),
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

impl Args {
    /// Enabled modes; no mode flag at all means every mode.
    fn capabilities(&self) -> Capabilities {
        if !(self.io || self.mem || self.net) {
            return Capabilities::ALL;
        }
        Capabilities {
            disk_io: self.io,
            memory: self.mem,
            network: self.net,
        }
    }

    fn to_config(&self) -> TrackConfig {
        let mut config = TrackConfig::default()
            .with_interval(self.interval)
            .with_capabilities(self.capabilities())
            .with_device(self.device.clone())
            .with_proc_path(self.proc_path.clone())
            .with_sys_path(self.sys_path.clone());

        if let Some(pid) = self.pid {
            config = config.with_target(Target::Process(pid));
        }
        if let Some(path) = &self.output {
            config = config.with_output(OutputTarget::File(path.clone()));
        }
        if !self.interfaces.is_empty() {
            config = config.with_interfaces(self.interfaces.iter().cloned());
        }
        config = config.with_sector_size(if self.detect_sector_size {
            SectorSize::Detect
        } else {
            SectorSize::Fixed(self.sector_size)
        });
        if self.absolute_net_counters {
            config = config.with_network_baseline(NetworkBaseline::Absolute);
        }
        if let Some(count) = self.count {
            config = config.with_max_samples(count);
        }
        config
    }
}

/// Checks the environment before the session starts.
///
/// For a process target every `/proc/<pid>` file the enabled modes need is
/// read once, so an unreadable file (another user's `io`) is reported here.
fn check_environment<F: FileSystem>(fs: F, args: &Args) -> Result<(), String> {
    if !fs.exists(Path::new(&args.proc_path)) {
        return Err(format!("procfs not found at {}", args.proc_path));
    }
    if let Some(pid) = args.pid {
        let reader = ProcfsReader::new(fs, args.proc_path.clone());
        if !reader.process_exists(pid) {
            return Err(format!("process {} not found in {}", pid, args.proc_path));
        }

        let caps = args.capabilities();
        reader
            .read_process_status(pid)
            .map_err(|e| e.to_string())?;
        if caps.disk_io {
            reader.read_process_io(pid).map_err(|e| e.to_string())?;
        }
        if caps.network {
            reader
                .read_process_network(pid)
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("proctrack {} starting", env!("CARGO_PKG_VERSION"));
    debug!("{:?}", args);

    let fs = RealFs::new();
    if let Err(e) = check_environment(fs, &args) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let mut controller = TrackController::new(fs, args.to_config());

    let stop = controller.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        stop.stop();
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    match controller.run() {
        Ok(summary) => {
            if let Some(peaks) = summary.peaks {
                info!("VmPeak {} kB, VmHWM {} kB", peaks.vm_peak, peaks.vm_hwm);
            }
            info!("Shutdown complete ({})", summary.stop_reason);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
