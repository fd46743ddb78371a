//! Sample delivery: streamed to the console or accumulated and exported once.

use crate::track::config::{OutputTarget, Target};
use crate::track::error::TrackError;
use crate::track::sample::{Sample, TrackedSeries};
use crate::track::snapshot::Peaks;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes `value` as 2-space indented JSON to `path`, all or nothing.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it, so a failed write never leaves a truncated artifact behind.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), TrackError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let output_error = |source: std::io::Error| TrackError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(output_error)?;
    tmp.write_all(json.as_bytes()).map_err(output_error)?;
    tmp.as_file().sync_all().map_err(output_error)?;
    tmp.persist(path).map_err(|e| output_error(e.error))?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

enum SinkMode<W: Write> {
    Console(W),
    Export {
        path: PathBuf,
        series: TrackedSeries,
    },
}

/// Destination of the samples of one session.
pub struct SampleSink<W: Write> {
    mode: SinkMode<W>,
    emitted: u64,
}

impl<W: Write> SampleSink<W> {
    /// Creates the sink for `output`; `console` is only used for [`OutputTarget::Console`].
    pub fn new(output: &OutputTarget, target: Target, console: W) -> Self {
        let mode = match output {
            OutputTarget::Console => SinkMode::Console(console),
            OutputTarget::File(path) => SinkMode::Export {
                path: path.clone(),
                series: TrackedSeries::for_target(target),
            },
        };
        Self { mode, emitted: 0 }
    }

    /// Number of samples delivered so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Prints `sample` immediately (console) or appends it to the series (export).
    pub fn emit(&mut self, sample: Sample) -> Result<(), TrackError> {
        match &mut self.mode {
            SinkMode::Console(out) => {
                let json = serde_json::to_string_pretty(&sample)?;
                writeln!(out, "{}", json).map_err(TrackError::Console)?;
                out.flush().map_err(TrackError::Console)?;
            }
            SinkMode::Export { series, .. } => series.push(sample),
        }
        self.emitted += 1;
        Ok(())
    }

    /// Ends the session's output.
    ///
    /// In export mode the full series, with `peaks` for process targets, is
    /// written to the configured file and its path returned. Console mode has
    /// nothing left to write.
    pub fn finish(self, peaks: Option<Peaks>) -> Result<Option<PathBuf>, TrackError> {
        match self.mode {
            SinkMode::Console(_) => Ok(None),
            SinkMode::Export { path, mut series } => {
                if let Some(peaks) = peaks {
                    series.set_peaks(peaks);
                }
                write_json_atomic(&path, &series)?;
                info!("Saved {} samples to {}", series.len(), path.display());
                Ok(Some(path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::sample::{ProcessSample, SystemSample};
    use serde_json::Value;

    fn system(date: &str) -> Sample {
        Sample::System(SystemSample {
            date: date.to_string(),
            ..SystemSample::default()
        })
    }

    #[test]
    fn test_console_prints_each_sample_immediately() {
        let mut buf = Vec::new();
        {
            let mut sink = SampleSink::new(&OutputTarget::Console, Target::System, &mut buf);
            sink.emit(system("a")).unwrap();
            sink.emit(system("b")).unwrap();
            assert_eq!(sink.emitted(), 2);
            assert_eq!(sink.finish(None).unwrap(), None);
        }

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\n  \"date\": \"a\"\n}"));

        let objects: Vec<Value> = serde_json::Deserializer::from_str(&text)
            .into_iter::<Value>()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1]["date"], "b");
    }

    #[test]
    fn test_export_writes_once_on_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut sink = SampleSink::new(
            &OutputTarget::File(path.clone()),
            Target::System,
            std::io::sink(),
        );
        sink.emit(system("a")).unwrap();
        sink.emit(system("b")).unwrap();
        assert!(!path.exists());

        let written = sink.finish(None).unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"date\": \"a\""));
        let series: TrackedSeries = serde_json::from_str(&text).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_export_process_includes_peaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pid.json");

        let mut sink = SampleSink::new(
            &OutputTarget::File(path.clone()),
            Target::Process(5),
            std::io::sink(),
        );
        sink.emit(Sample::Process(ProcessSample::new("a".to_string())))
            .unwrap();
        sink.finish(Some(Peaks {
            vm_peak: 11,
            vm_hwm: 22,
        }))
        .unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["vmpeak"], 11);
        assert_eq!(value["vmhwm"], 22);
        assert_eq!(value["data"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale").unwrap();

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[\n  1,\n  2,\n  3\n]\n");
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = write_json_atomic(&path, &vec![1]).unwrap_err();
        match err {
            TrackError::OutputWrite { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_export_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json_atomic(&path, &vec!["x"]).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
