//! Custom error types for memedit

use std::fmt;
use thiserror::Error;

/// Main error type for memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("No target process selected")]
    NoProcess,

    #[error("Cannot access process {pid}: {reason}")]
    ProcessAccess { pid: i32, reason: String },

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("Invalid scan type: {0}")]
    InvalidScanType(String),

    #[error("Operator {0} is not valid for this operation")]
    InvalidOperator(String),

    #[error("Invalid scan scope: start 0x{start:x} is above end 0x{end:x}")]
    InvalidScope { start: usize, end: usize },

    #[error("Empty candidate list: {0}")]
    EmptyList(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates a process access error
    pub fn process_access(pid: i32, reason: impl Into<String>) -> Self {
        MemoryError::ProcessAccess {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failed error
    pub fn write_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::WriteFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}
