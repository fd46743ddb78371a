//! Per-process reads from `/proc/[pid]/`.
//!
//! A failure to read a per-process file is reported as
//! [`CollectError::ProcessGone`]: once the kernel tears down `/proc/[pid]`
//! every file under it becomes unreadable, and that is how the tracker learns
//! the target exited. `PermissionDenied` is the exception: the process is
//! alive but owned by another user.

use crate::collector::procfs::parser::{ProcIo, ProcStatus, parse_proc_io, parse_proc_status};
use crate::collector::procfs::reader::{
    CollectError, InterfaceSelection, NetworkTotals, ProcfsReader,
};
use crate::collector::procfs::system::sum_net_dev;
use crate::collector::traits::FileSystem;
use std::io::ErrorKind;
use std::path::Path;

impl<F: FileSystem> ProcfsReader<F> {
    fn read_process_file(&self, pid: u32, name: &str) -> Result<String, CollectError> {
        let path = format!("{}/{}/{}", self.proc_path, pid, name);
        self.fs
            .read_to_string(Path::new(&path))
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => CollectError::PermissionDenied(path.clone()),
                _ => CollectError::ProcessGone(pid),
            })
    }

    /// Returns `true` while `/proc/[pid]` exists.
    pub fn process_exists(&self, pid: u32) -> bool {
        self.fs
            .exists(Path::new(&format!("{}/{}", self.proc_path, pid)))
    }

    /// Reads VmSize/VmRSS/VmPeak/VmHWM from `/proc/[pid]/status`.
    pub fn read_process_status(&self, pid: u32) -> Result<ProcStatus, CollectError> {
        let content = self.read_process_file(pid, "status")?;
        Ok(parse_proc_status(&content)?)
    }

    /// Reads rchar/wchar/read_bytes/write_bytes from `/proc/[pid]/io`.
    pub fn read_process_io(&self, pid: u32) -> Result<ProcIo, CollectError> {
        let content = self.read_process_file(pid, "io")?;
        Ok(parse_proc_io(&content)?)
    }

    /// Reads `/proc/[pid]/net/dev`, summed over every interface visible in the
    /// process's network namespace.
    pub fn read_process_network(&self, pid: u32) -> Result<NetworkTotals, CollectError> {
        let content = self.read_process_file(pid, "net/dev")?;
        Ok(sum_net_dev(&content, &InterfaceSelection::All)?)
    }
}
