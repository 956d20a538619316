//! Scan and filter orchestration across a target's address space
//!
//! The scanner walks either the full region map or an explicit scope,
//! partitions the space into page-granularity tasks, and drives them
//! through the [`TaskScheduler`]. Matches accumulate in one shared list
//! guarded by a single mutex per call; the lock is held only for the
//! append, never for the read-and-compare work.

use crate::core::types::{
    Address, MemoryBlock, MemoryBlockSet, MemoryElement, MemoryError, MemoryResult, OpType, Pid,
    ScanType,
};
use crate::memory::compare::mem_compare;
use crate::memory::io::MemIo;
use crate::memory::maps::{Region, RegionMap};
use crate::memory::snapshot::Snapshot;
use crate::sched::TaskScheduler;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Sliding-window step during page scans
const STEP: usize = 1;
/// Candidates handled per filter task unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 128;
/// Result lists at or below this length are address-sorted; larger lists
/// return unsorted to bound sort cost
const SORT_THRESHOLD: usize = 800;

/// Host page size, the granularity of scan tasks and bulk reads
pub fn page_size() -> usize {
    // SAFETY: sysconf takes no pointers and cannot fail unsafely
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        4096
    } else {
        size as usize
    }
}

/// Optional explicit `(start, end)` range overriding region enumeration.
///
/// Active only when both bounds are non-zero; a single bound set alone
/// leaves scanning in full-map mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressPair {
    pub start: Address,
    pub end: Address,
}

impl AddressPair {
    pub fn is_active(&self) -> bool {
        !self.start.is_null() && !self.end.is_null()
    }
}

/// Orchestrates value scans, unknown-value captures and filter passes
/// against one target process.
///
/// Only the PID and the scope persist across calls; every scan or filter
/// re-enumerates regions and opens the memory pseudo-file afresh.
pub struct MemScanner {
    pid: Pid,
    memio: MemIo,
    scope: AddressPair,
    scheduler: TaskScheduler,
    snapshot: Snapshot,
    chunk_size: usize,
}

impl MemScanner {
    pub fn new() -> Self {
        MemScanner {
            pid: 0,
            memio: MemIo::new(),
            scope: AddressPair::default(),
            scheduler: TaskScheduler::new(),
            snapshot: Snapshot::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_pid(pid: Pid) -> Self {
        let mut scanner = Self::new();
        scanner.set_pid(pid);
        scanner
    }

    pub fn set_pid(&mut self, pid: Pid) {
        self.pid = pid;
        self.memio.set_pid(pid);
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn memio(&self) -> &MemIo {
        &self.memio
    }

    /// Bounds worker concurrency for subsequent passes
    pub fn set_max_threads(&mut self, max_threads: usize) {
        self.scheduler.set_max_threads(max_threads);
    }

    /// Candidates handled per filter task; floors at 1
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn set_scope_start(&mut self, address: Address) {
        self.scope.start = address;
    }

    pub fn set_scope_end(&mut self, address: Address) {
        self.scope.end = address;
    }

    pub fn scope(&self) -> AddressPair {
        self.scope
    }

    /// True only when both scope bounds are non-zero
    pub fn has_scope(&self) -> bool {
        self.scope.is_active()
    }

    pub fn clear_scope(&mut self) {
        self.scope = AddressPair::default();
    }

    /// True once an unknown-value snapshot is waiting for a compare
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_unknown()
    }

    /// Known-value scan: finds every position in scope whose bytes satisfy
    /// `op` against `value`.
    ///
    /// `value` must be exactly one `scan_type` wide. Pages that vanish
    /// between enumeration and read are skipped, not errors.
    pub fn scan(
        &mut self,
        value: &[u8],
        scan_type: ScanType,
        op: OpType,
    ) -> MemoryResult<Vec<MemoryElement>> {
        self.check_target()?;
        check_value_op(value, scan_type, op)?;

        let file = Arc::new(self.memio.open_read()?);
        let results = Arc::new(Mutex::new(Vec::new()));
        let value = Arc::new(value.to_vec());
        let page = page_size();

        if self.has_scope() {
            // One task per page block across the explicit range
            let (start, end) = (self.scope.start.as_usize(), self.scope.end.as_usize());
            let mut block = start;
            while block < end {
                let block_end = (block + page).min(end);
                let (file, results, value) =
                    (Arc::clone(&file), Arc::clone(&results), Arc::clone(&value));
                self.scheduler.queue_task(move || {
                    scan_range(&file, &results, block, block_end, page, &value, scan_type, op);
                });
                block = block_end;
            }
        } else {
            // One task per mapped region, paging inside it
            let maps = RegionMap::load(self.pid)?;
            for region in maps.regions() {
                let (start, end) = (region.start.as_usize(), region.end.as_usize());
                let (file, results, value) =
                    (Arc::clone(&file), Arc::clone(&results), Arc::clone(&value));
                self.scheduler.queue_task(move || {
                    scan_range(&file, &results, start, end, page, &value, scan_type, op);
                });
            }
        }

        self.scheduler.start();
        self.scheduler.clear();

        Ok(sorted_if_small(take_results(results)))
    }

    /// Unknown-value scan: captures every position in scope as a candidate
    /// remembering its current bytes.
    ///
    /// There is no target value to match yet, so the whole readable space
    /// is the baseline; later unknown-value filters narrow it by observing
    /// how each candidate changed.
    pub fn scan_unknown(&mut self, scan_type: ScanType) -> MemoryResult<Vec<MemoryElement>> {
        self.check_target()?;

        let blocks = self.capture_blocks(&[])?;
        let size = scan_type.size();
        let mut list = Vec::new();
        for block in &blocks {
            let data = block.data();
            if data.len() < size {
                continue;
            }
            let base = block.address().as_usize();
            let mut k = 0;
            while k <= data.len() - size {
                list.push(MemoryElement::with_bytes(
                    Address::new(base + k),
                    scan_type,
                    data[k..k + size].to_vec(),
                ));
                k += STEP;
            }
        }
        Ok(sorted_if_small(list))
    }

    /// Narrows a known-value candidate list by re-reading each candidate
    /// and re-applying `op` against `value`.
    ///
    /// Survivors remember their freshly read bytes.
    pub fn filter(
        &mut self,
        list: Vec<MemoryElement>,
        value: &[u8],
        scan_type: ScanType,
        op: OpType,
    ) -> MemoryResult<Vec<MemoryElement>> {
        self.check_target()?;
        check_value_op(value, scan_type, op)?;
        if list.is_empty() {
            return Ok(Vec::new());
        }

        let value = Arc::new(value.to_vec());
        self.filter_chunked(list, scan_type, move |fresh, _element| {
            mem_compare(fresh, &value, scan_type, op)
        })
    }

    /// Narrows an unknown-value candidate list by diffing each candidate's
    /// fresh bytes against its remembered bytes.
    ///
    /// Only the previous-value operators (Changed/Unchanged/Increased/
    /// Decreased) are valid here. Survivors remember the fresh bytes, so
    /// chained unknown filters always compare consecutive passes.
    pub fn filter_unknown(
        &mut self,
        list: Vec<MemoryElement>,
        scan_type: ScanType,
        op: OpType,
    ) -> MemoryResult<Vec<MemoryElement>> {
        self.check_target()?;
        if !op.requires_previous() {
            return Err(MemoryError::InvalidOperator(op.to_string()));
        }
        if list.is_empty() {
            return Err(MemoryError::EmptyList(
                "unknown-value filter needs a prior capture".to_string(),
            ));
        }

        self.filter_chunked(list, scan_type, move |fresh, element| {
            mem_compare(fresh, element.remembered(), scan_type, op)
        })
    }

    /// Captures a region-level snapshot as the baseline for a later
    /// [`MemScanner::snapshot_compare`].
    ///
    /// A non-empty `base` narrows the capture to the regions containing
    /// its candidates (each region captured once).
    pub fn save_snapshot(&mut self, base: &[MemoryElement]) -> MemoryResult<()> {
        self.check_target()?;
        let blocks = self.capture_blocks(base)?;
        self.snapshot.save(blocks);
        Ok(())
    }

    /// Pulls a second capture and diffs it against the saved baseline,
    /// consuming the baseline.
    pub fn snapshot_compare(
        &mut self,
        scan_type: ScanType,
        op: OpType,
    ) -> MemoryResult<Vec<MemoryElement>> {
        self.check_target()?;
        if !self.snapshot.is_unknown() {
            return Err(MemoryError::EmptyList(
                "no snapshot captured to compare against".to_string(),
            ));
        }
        let current = self.capture_blocks(&[])?;
        let results = self.snapshot.compare(&current, scan_type, op)?;
        Ok(sorted_if_small(results))
    }

    /// Regions of the current map containing at least one candidate,
    /// deduplicated
    pub fn interested_maps(&self, candidates: &[MemoryElement]) -> MemoryResult<Vec<Region>> {
        let maps = RegionMap::load(self.pid)?;
        Ok(maps.interested_maps(candidates))
    }

    /// Structural pre-checks shared by every pass: a target must be
    /// selected and the scope well-formed. Checked before any task is
    /// scheduled.
    fn check_target(&self) -> MemoryResult<()> {
        if self.pid == 0 {
            return Err(MemoryError::NoProcess);
        }
        let AddressPair { start, end } = self.scope;
        if self.has_scope() && start > end {
            return Err(MemoryError::InvalidScope {
                start: start.as_usize(),
                end: end.as_usize(),
            });
        }
        Ok(())
    }

    /// Reads whole blocks for every range in scope: the explicit scope if
    /// set, else each mapped region (narrowed to the regions containing
    /// `base` candidates when `base` is non-empty). Unreadable ranges are
    /// skipped silently.
    fn capture_blocks(&self, base: &[MemoryElement]) -> MemoryResult<MemoryBlockSet> {
        let file = self.memio.open_read()?;

        let ranges: Vec<(usize, usize)> = if self.has_scope() {
            vec![(self.scope.start.as_usize(), self.scope.end.as_usize())]
        } else {
            let maps = RegionMap::load(self.pid)?;
            let regions = if base.is_empty() {
                maps.regions().to_vec()
            } else {
                maps.interested_maps(base)
            };
            regions
                .iter()
                .map(|r| (r.start.as_usize(), r.end.as_usize()))
                .collect()
        };

        let mut blocks = MemoryBlockSet::new();
        for (start, end) in ranges {
            if end <= start {
                continue;
            }
            let mut buf = vec![0u8; end - start];
            match file.read_exact_at(&mut buf, start as u64) {
                Ok(()) => blocks.push(MemoryBlock::new(Address::new(start), buf)),
                Err(e) => {
                    debug!(start = %Address::new(start), "skipping unreadable range: {}", e);
                }
            }
        }
        Ok(blocks)
    }

    /// Dispatches a filter pass in `chunk_size` slices through the
    /// scheduler. `keep` decides survival from the fresh bytes and the
    /// existing element; survivors are retyped and remember the fresh
    /// bytes.
    fn filter_chunked<F>(
        &mut self,
        list: Vec<MemoryElement>,
        scan_type: ScanType,
        keep: F,
    ) -> MemoryResult<Vec<MemoryElement>>
    where
        F: Fn(&[u8], &MemoryElement) -> bool + Send + Sync + 'static,
    {
        let file = Arc::new(self.memio.open_read()?);
        let input = Arc::new(list);
        let results = Arc::new(Mutex::new(Vec::new()));
        let keep = Arc::new(keep);
        let size = scan_type.size();

        let mut chunk_start = 0;
        while chunk_start < input.len() {
            let chunk_end = (chunk_start + self.chunk_size).min(input.len());
            let (file, input, results, keep) = (
                Arc::clone(&file),
                Arc::clone(&input),
                Arc::clone(&results),
                Arc::clone(&keep),
            );
            self.scheduler.queue_task(move || {
                let mut survivors = Vec::new();
                for element in &input[chunk_start..chunk_end] {
                    let mut fresh = vec![0u8; size];
                    if file
                        .read_exact_at(&mut fresh, element.address().as_offset())
                        .is_err()
                    {
                        continue;
                    }
                    if keep(&fresh, element) {
                        let mut kept = element.clone();
                        kept.set_scan_type(scan_type);
                        kept.remember(fresh);
                        survivors.push(kept);
                    }
                }
                if !survivors.is_empty() {
                    results
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .extend(survivors);
                }
            });
            chunk_start = chunk_end;
        }

        self.scheduler.start();
        self.scheduler.clear();

        Ok(sorted_if_small(take_results(results)))
    }
}

impl Default for MemScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-checks for value-driven passes: the operator must not need a
/// previous value, and the value must be exactly one type wide
fn check_value_op(value: &[u8], scan_type: ScanType, op: OpType) -> MemoryResult<()> {
    if op.requires_previous() {
        return Err(MemoryError::InvalidOperator(op.to_string()));
    }
    if value.len() != scan_type.size() {
        return Err(MemoryError::InvalidScanType(format!(
            "value is {} bytes but {} is {} bytes wide",
            value.len(),
            scan_type,
            scan_type.size()
        )));
    }
    Ok(())
}

/// Scans `[start, end)` one page block at a time, sliding a value-width
/// window at STEP granularity over each readable block. Matches collect
/// locally and append to the shared list under one short lock.
#[allow(clippy::too_many_arguments)]
fn scan_range(
    file: &File,
    results: &Mutex<Vec<MemoryElement>>,
    start: usize,
    end: usize,
    page: usize,
    value: &[u8],
    scan_type: ScanType,
    op: OpType,
) {
    let size = value.len();
    let mut block = start;
    while block < end {
        let len = (end - block).min(page);
        let mut buf = vec![0u8; len];
        if let Err(e) = file.read_exact_at(&mut buf, block as u64) {
            // The page may have vanished since enumeration; not an abort
            debug!(address = %Address::new(block), "skipping unreadable page: {}", e);
            block += len;
            continue;
        }

        if len >= size {
            let mut matches = Vec::new();
            let mut k = 0;
            while k <= len - size {
                if mem_compare(&buf[k..k + size], value, scan_type, op) {
                    matches.push(MemoryElement::with_bytes(
                        Address::new(block + k),
                        scan_type,
                        buf[k..k + size].to_vec(),
                    ));
                }
                k += STEP;
            }
            if !matches.is_empty() {
                results
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .extend(matches);
            }
        }
        block += len;
    }
}

fn take_results(results: Arc<Mutex<Vec<MemoryElement>>>) -> Vec<MemoryElement> {
    match Arc::try_unwrap(results) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|p| p.into_inner()),
        // All task clones are dropped once the batch completes
        Err(shared) => std::mem::take(
            &mut *shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
        ),
    }
}

/// Address-sorts small result lists; larger ones return in task completion
/// order
fn sorted_if_small(mut list: Vec<MemoryElement>) -> Vec<MemoryElement> {
    if list.len() <= SORT_THRESHOLD {
        list.sort_by_key(MemoryElement::address);
    }
    list
}
