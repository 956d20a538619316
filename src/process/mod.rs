//! Process discovery from `/proc`
//!
//! Just enough enumeration for a front end to populate a target picker:
//! PID plus command line. Kernel threads (empty cmdline) are skipped.

use crate::core::types::{MemoryError, MemoryResult, Pid};
use serde::{Deserialize, Serialize};
use std::fs;

/// One running process visible under `/proc`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub cmdline: String,
}

/// Enumerates PIDs and command lines from `/proc`
pub fn list_processes() -> MemoryResult<Vec<ProcessInfo>> {
    let entries = fs::read_dir("/proc")
        .map_err(|e| MemoryError::Unknown(format!("cannot read /proc: {}", e)))?;

    let mut processes = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(pid) = name.to_str().and_then(|s| s.parse::<Pid>().ok()) else {
            continue;
        };
        if let Some(cmdline) = read_cmdline(pid) {
            processes.push(ProcessInfo { pid, cmdline });
        }
    }
    processes.sort_by_key(|p| p.pid);
    Ok(processes)
}

/// Processes whose command line contains `pattern`
pub fn find_processes(pattern: &str) -> MemoryResult<Vec<ProcessInfo>> {
    let mut processes = list_processes()?;
    processes.retain(|p| p.cmdline.contains(pattern));
    Ok(processes)
}

/// Command line of one process, with NUL separators replaced by spaces.
///
/// Returns `None` for vanished processes and kernel threads.
fn read_cmdline(pid: Pid) -> Option<String> {
    let raw = fs::read(format!("/proc/{}/cmdline", pid)).ok()?;
    if raw.is_empty() {
        return None;
    }
    let cmdline = raw
        .split(|&b| b == 0)
        .filter(|part| !part.is_empty())
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    if cmdline.is_empty() {
        None
    } else {
        Some(cmdline)
    }
}
