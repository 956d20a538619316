//! Region-level before/after diffing
//!
//! A snapshot captures whole-region byte blocks when no discrete candidate
//! list exists yet. A later compare pulls a second capture, pairs blocks by
//! overlapping address range and slides a type-width window across each
//! overlap, emitting one candidate per position satisfying the operator.

use crate::core::types::{
    Address, MemoryBlock, MemoryBlockSet, MemoryElement, MemoryError, MemoryResult, OpType,
    ScanType,
};
use crate::memory::compare::mem_compare;
use tracing::debug;

/// A full byte capture of the interesting regions at a point in time.
///
/// Consumed by [`Snapshot::compare`]: a successful compare clears the
/// capture, so a new `save` is needed before the next diff.
#[derive(Debug, Default)]
pub struct Snapshot {
    blocks: MemoryBlockSet,
    is_unknown: bool,
}

impl Snapshot {
    pub fn new() -> Self {
        Snapshot {
            blocks: MemoryBlockSet::new(),
            is_unknown: false,
        }
    }

    /// True once a baseline has been captured and not yet consumed
    pub fn is_unknown(&self) -> bool {
        self.is_unknown
    }

    pub fn blocks(&self) -> &MemoryBlockSet {
        &self.blocks
    }

    /// Stores a freshly pulled capture as the diff baseline
    pub fn save(&mut self, blocks: MemoryBlockSet) {
        debug!(
            blocks = blocks.len(),
            bytes = blocks.total_bytes(),
            "snapshot saved"
        );
        self.blocks = blocks;
        self.is_unknown = true;
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.is_unknown = false;
    }

    /// Diffs the saved baseline against `current`, consuming the baseline.
    ///
    /// Each emitted element remembers the *current* bytes at its position,
    /// so subsequent unknown-value filters compare consecutive passes.
    pub fn compare(
        &mut self,
        current: &MemoryBlockSet,
        scan_type: ScanType,
        op: OpType,
    ) -> MemoryResult<Vec<MemoryElement>> {
        if self.blocks.is_empty() {
            return Err(MemoryError::EmptyList(
                "no snapshot captured to compare against".to_string(),
            ));
        }

        let mut results = Vec::new();
        for (prev, curr) in pair_blocks(&self.blocks, current) {
            compare_pair(prev, curr, scan_type, op, &mut results);
        }
        self.clear();
        Ok(results)
    }
}

/// Pairs each previous block with the first current block whose range
/// overlaps it; at most one pairing per previous block.
fn pair_blocks<'a>(
    prev: &'a MemoryBlockSet,
    curr: &'a MemoryBlockSet,
) -> Vec<(&'a MemoryBlock, &'a MemoryBlock)> {
    let mut pairs = Vec::new();
    for p in prev {
        for c in curr {
            if blocks_matched(p, c) {
                pairs.push((p, c));
                break;
            }
        }
    }
    pairs
}

/// Two blocks match when either one's start address falls within the
/// other's `[start, end]` span
fn blocks_matched(a: &MemoryBlock, b: &MemoryBlock) -> bool {
    let (a_first, a_last) = (a.address().as_usize(), a.end_address().as_usize());
    let (b_first, b_last) = (b.address().as_usize(), b.end_address().as_usize());
    (a_first <= b_first && a_last >= b_first) || (a_first <= b_last && a_last >= b_last)
}

/// Slides a type-width window across the overlap of a block pair,
/// comparing old vs. new bytes at each step
fn compare_pair(
    prev: &MemoryBlock,
    curr: &MemoryBlock,
    scan_type: ScanType,
    op: OpType,
    results: &mut Vec<MemoryElement>,
) {
    let size = scan_type.size();
    let start = prev.address().as_usize().max(curr.address().as_usize());
    let end = prev
        .end_address()
        .as_usize()
        .min(curr.end_address().as_usize());
    if end < start + size {
        return;
    }

    let prev_base = start - prev.address().as_usize();
    let curr_base = start - curr.address().as_usize();
    let len = end - start;

    for k in 0..=(len - size) {
        let old = &prev.data()[prev_base + k..prev_base + k + size];
        let new = &curr.data()[curr_base + k..curr_base + k + size];
        if mem_compare(new, old, scan_type, op) {
            results.push(MemoryElement::with_bytes(
                Address::new(start + k),
                scan_type,
                new.to_vec(),
            ));
        }
    }
}
