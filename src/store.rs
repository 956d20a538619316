//! Named-address list persistence
//!
//! The record format `{description, address, scanType, locked}` lives only
//! here; the engine itself deals in `(Address, ScanType)` pairs.

use crate::core::types::{Address, MemoryError, MemoryResult, ScanType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One saved address with a user-facing description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedAddress {
    pub description: String,
    /// Hex string, no prefix
    pub address: String,
    pub scan_type: ScanType,
    #[serde(default)]
    pub locked: bool,
}

impl NamedAddress {
    pub fn new(description: impl Into<String>, address: Address, scan_type: ScanType) -> Self {
        NamedAddress {
            description: description.into(),
            address: format!("{:x}", address),
            scan_type,
            locked: false,
        }
    }

    /// The `(address, scan type)` pair the engine consumes.
    ///
    /// The record's address is always hex, so it is parsed with an explicit
    /// radix; an all-digit string like "1000" must not fall back to decimal.
    pub fn target(&self) -> MemoryResult<(Address, ScanType)> {
        let address = usize::from_str_radix(&self.address, 16)
            .map(Address::new)
            .map_err(|_| MemoryError::InvalidAddress(self.address.clone()))?;
        Ok((address, self.scan_type))
    }
}

/// Saves a named-address list as pretty-printed JSON
pub fn save_list(path: impl AsRef<Path>, list: &[NamedAddress]) -> MemoryResult<()> {
    let json = serde_json::to_string_pretty(list)?;
    fs::write(path, json)?;
    Ok(())
}

/// Loads a named-address list from a JSON file
pub fn load_list(path: impl AsRef<Path>) -> MemoryResult<Vec<NamedAddress>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
