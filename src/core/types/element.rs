//! Located candidate values produced by scans and filters

use super::address::Address;
use super::scan_type::ScanType;
use super::value::ScanValue;
use serde::{Deserialize, Serialize};

/// One located, typed candidate: an address, the interpretation applied to
/// it, and the raw bytes observed there by the most recent scan or filter
/// pass.
///
/// The remembered bytes always describe the immediately preceding pass, not
/// the original scan: every pass a candidate survives refreshes them, so
/// Changed/Unchanged/Increased/Decreased diff consecutive passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryElement {
    address: Address,
    size: usize,
    scan_type: ScanType,
    remembered: Vec<u8>,
}

impl MemoryElement {
    /// Creates an element with no remembered bytes yet; size derives from
    /// the scan type
    pub fn new(address: Address, scan_type: ScanType) -> Self {
        MemoryElement {
            address,
            size: scan_type.size(),
            scan_type,
            remembered: Vec::new(),
        }
    }

    /// Creates an element remembering the given bytes; size derives from
    /// the byte count, overriding the scan type's width
    pub fn with_bytes(address: Address, scan_type: ScanType, bytes: Vec<u8>) -> Self {
        MemoryElement {
            address,
            size: bytes.len(),
            scan_type,
            remembered: bytes,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    /// Reinterprets the element under a different scan type, resizing to
    /// the new type's width
    pub fn set_scan_type(&mut self, scan_type: ScanType) {
        self.scan_type = scan_type;
        self.size = scan_type.size();
        self.remembered.truncate(self.size);
    }

    /// Bytes captured the last time this candidate was scanned or filtered
    pub fn remembered(&self) -> &[u8] {
        &self.remembered
    }

    /// Replaces the remembered bytes with a fresh capture
    pub fn remember(&mut self, bytes: Vec<u8>) {
        self.size = bytes.len();
        self.remembered = bytes;
    }

    /// Decodes the remembered bytes under the element's scan type
    pub fn recall_value(&self) -> Option<ScanValue> {
        ScanValue::from_bytes(&self.remembered, self.scan_type)
    }
}
