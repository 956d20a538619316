//! Process memory I/O over `/proc/<pid>/mem`
//!
//! All transfers use positioned reads and writes (`pread`/`pwrite` through
//! [`FileExt`]), so a single descriptor can be shared read-only across scan
//! tasks without seek races. Partial transfers are failures, never silent
//! short results.

use crate::core::types::{
    Address, MemoryElement, MemoryError, MemoryResult, Pid, ScanType, ScanValue,
};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;

/// Reads and writes typed byte spans inside a target process.
///
/// Holds only the PID; the memory pseudo-file is opened fresh per
/// operation (bulk callers open once per batch and share the descriptor).
#[derive(Debug, Clone, Default)]
pub struct MemIo {
    pid: Pid,
}

impl MemIo {
    pub fn new() -> Self {
        MemIo { pid: 0 }
    }

    pub fn with_pid(pid: Pid) -> Self {
        MemIo { pid }
    }

    pub fn set_pid(&mut self, pid: Pid) {
        self.pid = pid;
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Opens the target's memory pseudo-file for reading
    pub fn open_read(&self) -> MemoryResult<File> {
        if self.pid == 0 {
            return Err(MemoryError::NoProcess);
        }
        File::open(format!("/proc/{}/mem", self.pid))
            .map_err(|e| MemoryError::process_access(self.pid, e.to_string()))
    }

    /// Opens the target's memory pseudo-file for writing
    pub fn open_write(&self) -> MemoryResult<File> {
        if self.pid == 0 {
            return Err(MemoryError::NoProcess);
        }
        OpenOptions::new()
            .write(true)
            .open(format!("/proc/{}/mem", self.pid))
            .map_err(|e| MemoryError::process_access(self.pid, e.to_string()))
    }

    /// Reads `size` raw bytes at `address`
    pub fn read_bytes(&self, address: Address, size: usize) -> MemoryResult<Vec<u8>> {
        let file = self.open_read()?;
        let mut buf = vec![0u8; size];
        file.read_exact_at(&mut buf, address.as_offset())
            .map_err(|e| MemoryError::read_failed(address, e.to_string()))?;
        Ok(buf)
    }

    /// Reads `size` bytes at `address` into a candidate element.
    ///
    /// The element's scan type defaults to int32; callers reinterpret it
    /// with [`MemoryElement::set_scan_type`] as needed.
    pub fn read(&self, address: Address, size: usize) -> MemoryResult<MemoryElement> {
        let bytes = self.read_bytes(address, size)?;
        Ok(MemoryElement::with_bytes(address, ScanType::default(), bytes))
    }

    /// Reads and decodes one typed value at `address`
    pub fn read_value(&self, address: Address, scan_type: ScanType) -> MemoryResult<ScanValue> {
        let bytes = self.read_bytes(address, scan_type.size())?;
        ScanValue::from_bytes(&bytes, scan_type)
            .ok_or_else(|| MemoryError::read_failed(address, "short read"))
    }

    /// Writes raw bytes at `address`; a partial write is a failure
    pub fn write(&self, address: Address, bytes: &[u8]) -> MemoryResult<()> {
        let file = self.open_write()?;
        file.write_all_at(bytes, address.as_offset())
            .map_err(|e| MemoryError::write_failed(address, e.to_string()))
    }

    /// Encodes and writes one typed value at `address`
    pub fn write_value(&self, address: Address, value: ScanValue) -> MemoryResult<()> {
        self.write(address, &value.to_bytes())
    }
}
