//! Core module containing fundamental types for memedit
//!
//! Foundational building blocks used throughout the engine: address
//! handling, scan values, candidate elements and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, MemoryBlock, MemoryBlockSet, MemoryElement, MemoryError, MemoryResult, OpType,
    ScanType, ScanValue,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

// Platform verification at compile time
#[cfg(not(target_os = "linux"))]
compile_error!("memedit reads /proc and only supports Linux");
