//! In-memory mock filesystem for testing the reader and controller without real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various `/proc` states, including a process vanishing between reads.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for `exists` on directories).
    directories: HashSet<PathBuf>,
    /// Files that exist but fail to read with `PermissionDenied`.
    denied: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, replacing any previous content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();

        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        self.files.insert(path, content.into());
    }

    /// Removes a single file. Its directory stays in place.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    /// Makes reads of an existing file fail with `PermissionDenied`, like
    /// `/proc/[pid]/io` of another user's process.
    pub fn deny_read(&mut self, path: impl AsRef<Path>) {
        self.denied.insert(path.as_ref().to_path_buf());
    }

    /// Adds a process with the `/proc/[pid]/` files the tracker reads.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `status` - Content of `/proc/[pid]/status`
    /// * `io` - Content of `/proc/[pid]/io` (can be empty if not accessible)
    /// * `net_dev` - Content of `/proc/[pid]/net/dev`
    pub fn add_process(&mut self, pid: u32, status: &str, io: &str, net_dev: &str) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.directories.insert(base.clone());
        self.add_file(base.join("status"), status);
        if !io.is_empty() {
            self.add_file(base.join("io"), io);
        }
        self.add_file(base.join("net/dev"), net_dev);
    }

    /// Removes `/proc/[pid]` and everything below it, as the kernel does on exit.
    pub fn remove_process(&mut self, pid: u32) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.files.retain(|path, _| !path.starts_with(&base));
        self.directories.retain(|path| !path.starts_with(&base));
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.denied.contains(path) && self.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }
}
