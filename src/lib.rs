//! memedit: scan, filter and edit the live memory of another Linux process

pub mod config;
pub mod core;
pub mod memory;
pub mod process;
pub mod sched;
pub mod store;

// Re-export main types from the core module
pub use crate::core::types::{
    Address, MemoryBlock, MemoryBlockSet, MemoryElement, MemoryError, MemoryResult, OpType, Pid,
    ScanType, ScanValue,
};

pub use crate::memory::{AddressPair, MemIo, MemScanner, Region, RegionMap, Snapshot};
pub use crate::sched::TaskScheduler;
