//! Core type definitions for memedit
//!
//! Fundamental types used throughout the engine: the address wrapper, scan
//! type and operator enums, decoded values, candidate elements, region
//! block captures, and error types.

mod address;
mod block;
mod element;
mod error;
mod scan_type;
mod value;

// Re-export all public types
pub use address::Address;
pub use block::{MemoryBlock, MemoryBlockSet};
pub use element::MemoryElement;
pub use error::{MemoryError, MemoryResult};
pub use scan_type::{OpType, ScanType};
pub use value::ScanValue;

// Common type aliases
pub type Pid = i32;
pub type Size = usize;
