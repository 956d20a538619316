//! Scan type and comparison operator enums

use super::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive interpretation applied to raw bytes during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl ScanType {
    /// Byte width of one value of this type
    pub const fn size(&self) -> usize {
        match self {
            ScanType::Int8 => 1,
            ScanType::Int16 => 2,
            ScanType::Int32 => 4,
            ScanType::Float32 => 4,
            ScanType::Float64 => 8,
        }
    }

    /// Canonical name, matching the persisted record format
    pub const fn name(&self) -> &'static str {
        match self {
            ScanType::Int8 => "int8",
            ScanType::Int16 => "int16",
            ScanType::Int32 => "int32",
            ScanType::Float32 => "float32",
            ScanType::Float64 => "float64",
        }
    }
}

impl Default for ScanType {
    fn default() -> Self {
        ScanType::Int32
    }
}

impl FromStr for ScanType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" => Ok(ScanType::Int8),
            "int16" => Ok(ScanType::Int16),
            "int32" => Ok(ScanType::Int32),
            "float32" => Ok(ScanType::Float32),
            "float64" => Ok(ScanType::Float64),
            other => Err(MemoryError::InvalidScanType(other.to_string())),
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison applied between scanned bytes and a target or remembered value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Changed,
    Unchanged,
    Increased,
    Decreased,
}

impl OpType {
    /// True for operators that compare against a remembered previous value
    /// instead of a user-supplied target
    pub const fn requires_previous(&self) -> bool {
        matches!(
            self,
            OpType::Changed | OpType::Unchanged | OpType::Increased | OpType::Decreased
        )
    }
}

impl FromStr for OpType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "eq" => Ok(OpType::Equal),
            "!=" | "ne" => Ok(OpType::NotEqual),
            ">" | "gt" => Ok(OpType::GreaterThan),
            "<" | "lt" => Ok(OpType::LessThan),
            ">=" | "ge" => Ok(OpType::GreaterOrEqual),
            "<=" | "le" => Ok(OpType::LessOrEqual),
            "changed" => Ok(OpType::Changed),
            "unchanged" => Ok(OpType::Unchanged),
            "increased" => Ok(OpType::Increased),
            "decreased" => Ok(OpType::Decreased),
            other => Err(MemoryError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpType::Equal => "=",
            OpType::NotEqual => "!=",
            OpType::GreaterThan => ">",
            OpType::LessThan => "<",
            OpType::GreaterOrEqual => ">=",
            OpType::LessOrEqual => "<=",
            OpType::Changed => "changed",
            OpType::Unchanged => "unchanged",
            OpType::Increased => "increased",
            OpType::Decreased => "decreased",
        };
        f.write_str(s)
    }
}
