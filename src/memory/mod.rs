//! Memory access, region model and the scan/filter engine
//!
//! `io` reads and writes the target through `/proc/<pid>/mem`, `maps`
//! models the mapped regions, `compare` holds the typed operator
//! semantics, and `scanner`/`snapshot` drive the candidate search.

pub mod compare;
pub mod io;
pub mod maps;
pub mod scanner;
pub mod snapshot;

pub use compare::{compare_values, mem_compare};
pub use io::MemIo;
pub use maps::{Region, RegionMap};
pub use scanner::{page_size, AddressPair, MemScanner};
pub use snapshot::Snapshot;
