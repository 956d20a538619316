//! Typed scan value decoded from raw bytes

use super::error::{MemoryError, MemoryResult};
use super::scan_type::ScanType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded value of one of the scannable primitive types.
///
/// Encoding follows the host's native representation, matching what a
/// direct read of another process's memory yields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ScanValue {
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
}

impl ScanValue {
    /// Returns the size in bytes of the value
    pub const fn size(&self) -> usize {
        self.scan_type().size()
    }

    /// Gets the scan type for this value
    pub const fn scan_type(&self) -> ScanType {
        match self {
            ScanValue::I8(_) => ScanType::Int8,
            ScanValue::I16(_) => ScanType::Int16,
            ScanValue::I32(_) => ScanType::Int32,
            ScanValue::F32(_) => ScanType::Float32,
            ScanValue::F64(_) => ScanType::Float64,
        }
    }

    /// Converts the value to its native byte representation
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            ScanValue::I8(v) => v.to_ne_bytes().to_vec(),
            ScanValue::I16(v) => v.to_ne_bytes().to_vec(),
            ScanValue::I32(v) => v.to_ne_bytes().to_vec(),
            ScanValue::F32(v) => v.to_ne_bytes().to_vec(),
            ScanValue::F64(v) => v.to_ne_bytes().to_vec(),
        }
    }

    /// Decodes a value from bytes based on the scan type.
    ///
    /// Returns `None` when the slice is shorter than the type's width.
    pub fn from_bytes(bytes: &[u8], scan_type: ScanType) -> Option<Self> {
        if bytes.len() < scan_type.size() {
            return None;
        }
        let value = match scan_type {
            ScanType::Int8 => ScanValue::I8(bytes[0] as i8),
            ScanType::Int16 => ScanValue::I16(i16::from_ne_bytes([bytes[0], bytes[1]])),
            ScanType::Int32 => ScanValue::I32(i32::from_ne_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            ScanType::Float32 => ScanValue::F32(f32::from_ne_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            ScanType::Float64 => ScanValue::F64(f64::from_ne_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
        };
        Some(value)
    }

    /// Parses a user-supplied string as a value of the given scan type
    pub fn parse(s: &str, scan_type: ScanType) -> MemoryResult<Self> {
        let s = s.trim();
        let invalid = || MemoryError::InvalidScanType(format!("'{}' is not a valid {}", s, scan_type));
        let value = match scan_type {
            ScanType::Int8 => ScanValue::I8(s.parse().map_err(|_| invalid())?),
            ScanType::Int16 => ScanValue::I16(s.parse().map_err(|_| invalid())?),
            ScanType::Int32 => ScanValue::I32(s.parse().map_err(|_| invalid())?),
            ScanType::Float32 => ScanValue::F32(s.parse().map_err(|_| invalid())?),
            ScanType::Float64 => ScanValue::F64(s.parse().map_err(|_| invalid())?),
        };
        Ok(value)
    }
}

impl fmt::Display for ScanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanValue::I8(v) => write!(f, "{}", v),
            ScanValue::I16(v) => write!(f, "{}", v),
            ScanValue::I32(v) => write!(f, "{}", v),
            ScanValue::F32(v) => write!(f, "{}", v),
            ScanValue::F64(v) => write!(f, "{}", v),
        }
    }
}
