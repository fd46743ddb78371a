//! Errors that end a tracking session.

use crate::collector::CollectError;
use std::path::PathBuf;

/// Error type for tracking sessions.
#[derive(Debug)]
pub enum TrackError {
    /// The configuration violates an invariant of the sampling loop.
    InvalidConfig(String),
    /// `run` was called on a controller that already ran.
    AlreadyStarted,
    /// A procfs read failed during baseline capture or a tick.
    Collect(CollectError),
    /// A sample could not be written to the console.
    Console(std::io::Error),
    /// The tracked series could not be serialized.
    Serialize(serde_json::Error),
    /// The export file could not be written.
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            TrackError::AlreadyStarted => write!(f, "tracking session already started"),
            TrackError::Collect(e) => write!(f, "collection failed: {}", e),
            TrackError::Console(e) => write!(f, "failed to write sample: {}", e),
            TrackError::Serialize(e) => write!(f, "failed to serialize samples: {}", e),
            TrackError::OutputWrite { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::InvalidConfig(_) | TrackError::AlreadyStarted => None,
            TrackError::Collect(e) => Some(e),
            TrackError::Console(e) => Some(e),
            TrackError::Serialize(e) => Some(e),
            TrackError::OutputWrite { source, .. } => Some(source),
        }
    }
}

impl From<CollectError> for TrackError {
    fn from(e: CollectError) -> Self {
        TrackError::Collect(e)
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(e: serde_json::Error) -> Self {
        TrackError::Serialize(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_includes_path() {
        let err = TrackError::OutputWrite {
            path: PathBuf::from("/nonexistent/out.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/out.json"));
        assert!(msg.contains("no such directory"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_collect_error() {
        let err: TrackError = CollectError::ProcessGone(12).into();
        assert!(matches!(err, TrackError::Collect(CollectError::ProcessGone(12))));
        assert_eq!(err.to_string(), "collection failed: process 12 disappeared");
    }
}
