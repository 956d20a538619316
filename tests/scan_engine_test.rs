//! End-to-end scan and filter tests against this test process's own memory
//!
//! Each test plants values in a heap buffer, scopes the scanner to that
//! buffer and drives real passes through /proc/self/mem.

use memedit::{Address, MemScanner, OpType, Pid, ScanType};
use pretty_assertions::assert_eq;

const FILL: u8 = 0xAA;

/// Heap buffer the scanner is scoped to. The fill byte never decodes to a
/// planted value, so only planted positions match.
struct Arena {
    buf: Vec<u8>,
}

impl Arena {
    fn new(len: usize) -> Self {
        Arena {
            buf: vec![FILL; len],
        }
    }

    fn start(&self) -> Address {
        Address::new(self.buf.as_ptr() as usize)
    }

    fn end(&self) -> Address {
        Address::new(self.buf.as_ptr() as usize + self.buf.len())
    }

    fn addr_of(&self, offset: usize) -> Address {
        Address::new(self.buf.as_ptr() as usize + offset)
    }

    fn plant_i32(&mut self, offset: usize, value: i32) {
        let bytes = value.to_ne_bytes();
        // Volatile so the store is not elided before the scanner reads it
        for (i, b) in bytes.iter().enumerate() {
            unsafe { std::ptr::write_volatile(&mut self.buf[offset + i], *b) };
        }
    }

    fn scanner(&self) -> MemScanner {
        let mut scanner = MemScanner::with_pid(std::process::id() as Pid);
        scanner.set_scope_start(self.start());
        scanner.set_scope_end(self.end());
        scanner
    }
}

#[test]
fn scan_finds_planted_value_and_filter_tracks_changes() {
    let mut arena = Arena::new(4096);
    arena.plant_i32(100, 42);

    let mut scanner = arena.scanner();
    let value = 42i32.to_ne_bytes();
    let matches = scanner.scan(&value, ScanType::Int32, OpType::Equal).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].address(), arena.addr_of(100));
    assert_eq!(matches[0].scan_type(), ScanType::Int32);
    assert_eq!(matches[0].remembered(), 42i32.to_ne_bytes());

    // After the target changes, an Equal filter drops the candidate...
    arena.plant_i32(100, 43);
    let survivors = scanner
        .filter(matches.clone(), &value, ScanType::Int32, OpType::Equal)
        .unwrap();
    assert_eq!(survivors.len(), 0);

    // ...and a NotEqual filter keeps it, remembering the fresh bytes
    let survivors = scanner
        .filter(matches, &value, ScanType::Int32, OpType::NotEqual)
        .unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].address(), arena.addr_of(100));
    assert_eq!(survivors[0].remembered(), 43i32.to_ne_bytes());
}

#[test]
fn scan_with_relational_operator() {
    let mut arena = Arena::new(2048);
    arena.plant_i32(8, 1000);
    arena.plant_i32(512, 2000);

    let mut scanner = arena.scanner();
    let threshold = 1500i32.to_ne_bytes();
    let matches = scanner
        .scan(&threshold, ScanType::Int32, OpType::GreaterThan)
        .unwrap();

    // The fill pattern decodes negative, so only the larger plant matches
    assert!(matches.iter().any(|e| e.address() == arena.addr_of(512)));
    assert!(!matches.iter().any(|e| e.address() == arena.addr_of(8)));
}

#[test]
fn increased_filter_updates_remembered_value() {
    let mut arena = Arena::new(1024);
    arena.plant_i32(40, 10);

    let mut scanner = arena.scanner();
    let matches = scanner
        .scan(&10i32.to_ne_bytes(), ScanType::Int32, OpType::Equal)
        .unwrap();
    assert_eq!(matches.len(), 1);

    arena.plant_i32(40, 20);
    let survivors = scanner
        .filter_unknown(matches, ScanType::Int32, OpType::Increased)
        .unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].address(), arena.addr_of(40));
    assert_eq!(survivors[0].remembered(), 20i32.to_ne_bytes());

    // Chained pass compares against 20 now, not 10
    let survivors = scanner
        .filter_unknown(survivors, ScanType::Int32, OpType::Increased)
        .unwrap();
    assert_eq!(survivors.len(), 0);
}

#[test]
fn unknown_scan_round_trip_is_lossless_on_quiescent_memory() {
    let arena = Arena::new(64);
    let mut scanner = arena.scanner();

    let baseline = scanner.scan_unknown(ScanType::Int32).unwrap();
    // One candidate per step-1 window position
    assert_eq!(baseline.len(), 64 - 4 + 1);

    let unchanged = scanner
        .filter_unknown(baseline, ScanType::Int32, OpType::Unchanged)
        .unwrap();
    assert_eq!(unchanged.len(), 64 - 4 + 1);
}

#[test]
fn unknown_scan_then_decreased_narrows_to_changed_position() {
    let mut arena = Arena::new(256);
    arena.plant_i32(64, 500);

    let mut scanner = arena.scanner();
    let baseline = scanner.scan_unknown(ScanType::Int32).unwrap();

    arena.plant_i32(64, 400);
    let survivors = scanner
        .filter_unknown(baseline, ScanType::Int32, OpType::Decreased)
        .unwrap();

    assert!(survivors.iter().any(|e| e.address() == arena.addr_of(64)));
    // Every survivor overlaps the 4 rewritten bytes
    for e in &survivors {
        let a = e.address().as_usize();
        let lo = arena.addr_of(64).as_usize();
        assert!(a + 4 > lo && a < lo + 4, "survivor at {} outside plant", e.address());
    }
}

#[test]
fn filter_never_grows_the_candidate_set() {
    let mut arena = Arena::new(4096);
    for offset in (0..4096).step_by(256) {
        arena.plant_i32(offset, 7);
    }

    let mut scanner = arena.scanner();
    let matches = scanner
        .scan(&7i32.to_ne_bytes(), ScanType::Int32, OpType::Equal)
        .unwrap();
    let before = matches.len();
    assert_eq!(before, 16);

    let survivors = scanner
        .filter(matches, &7i32.to_ne_bytes(), ScanType::Int32, OpType::Equal)
        .unwrap();
    assert!(survivors.len() <= before);
    assert_eq!(survivors.len(), 16);
}

#[test]
fn filter_with_small_chunk_size_keeps_the_same_survivors() {
    let mut arena = Arena::new(4096);
    for offset in (0..4096).step_by(256) {
        arena.plant_i32(offset, 7);
    }

    let mut scanner = arena.scanner();
    let matches = scanner
        .scan(&7i32.to_ne_bytes(), ScanType::Int32, OpType::Equal)
        .unwrap();
    assert_eq!(matches.len(), 16);

    // Force many filter tasks instead of one
    scanner.set_chunk_size(3);
    let survivors = scanner
        .filter(matches, &7i32.to_ne_bytes(), ScanType::Int32, OpType::Equal)
        .unwrap();
    assert_eq!(survivors.len(), 16);
    assert!(survivors.windows(2).all(|w| w[0].address() <= w[1].address()));
}

#[test]
fn small_result_lists_come_back_address_sorted() {
    let mut arena = Arena::new(8192);
    for offset in [7000, 32, 4100, 1024] {
        arena.plant_i32(offset, 99);
    }

    let mut scanner = arena.scanner();
    let matches = scanner
        .scan(&99i32.to_ne_bytes(), ScanType::Int32, OpType::Equal)
        .unwrap();

    assert_eq!(matches.len(), 4);
    assert!(matches.windows(2).all(|w| w[0].address() <= w[1].address()));
}

#[test]
fn snapshot_compare_pinpoints_changed_bytes() {
    let mut arena = Arena::new(512);
    let mut scanner = arena.scanner();

    scanner.save_snapshot(&[]).unwrap();
    assert!(scanner.has_snapshot());

    arena.plant_i32(128, 1234);
    let changed = scanner
        .snapshot_compare(ScanType::Int8, OpType::Changed)
        .unwrap();

    // Every changed byte lies inside the rewritten span
    assert!(!changed.is_empty());
    for e in &changed {
        let a = e.address().as_usize();
        let lo = arena.addr_of(128).as_usize();
        assert!((lo..lo + 4).contains(&a));
    }

    // The capture was consumed
    assert!(!scanner.has_snapshot());
    assert!(scanner
        .snapshot_compare(ScanType::Int8, OpType::Changed)
        .is_err());
}

#[test]
fn interested_maps_returns_containing_region_once() {
    let arena = Arena::new(128);
    let mut scanner = arena.scanner();

    let matches = scanner.scan_unknown(ScanType::Int32).unwrap();
    assert!(!matches.is_empty());

    let interested = scanner.interested_maps(&matches).unwrap();
    assert_eq!(interested.len(), 1);
    assert!(interested[0].contains(arena.start()));
}

#[test]
fn scan_without_scope_walks_the_full_map() {
    // A full-map scan of our own process must at least find the planted
    // value somewhere in the heap
    let mut arena = Arena::new(64);
    arena.plant_i32(0, 0x5EED5EED_u32 as i32);

    let mut scanner = MemScanner::with_pid(std::process::id() as Pid);
    let matches = scanner
        .scan(
            &0x5EED5EED_u32.to_ne_bytes(),
            ScanType::Int32,
            OpType::Equal,
        )
        .unwrap();
    assert!(matches.iter().any(|e| e.address() == arena.start()));
}
