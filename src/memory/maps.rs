//! Mapped-region model parsed from `/proc/<pid>/maps`
//!
//! A [`RegionMap`] is loaded on demand and never cached across calls: the
//! target's mappings can change between scans.

use crate::core::types::{Address, MemoryElement, MemoryError, MemoryResult, Pid};
use std::fs;
use std::str::FromStr;

/// One contiguous `[start, end)` range mapped into the target process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start: Address,
    pub end: Address,
    pub perms: String,
    pub path: Option<String>,
}

impl Region {
    /// Size of the region in bytes
    pub fn len(&self) -> usize {
        self.end.as_usize() - self.start.as_usize()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.as_bytes().get(1) == Some(&b'w')
    }

    /// Check if an address falls inside this region
    pub fn contains(&self, address: Address) -> bool {
        self.start <= address && address < self.end
    }

    /// Check if this region fully contains the `[start, end)` range
    pub fn contains_range(&self, start: Address, end: Address) -> bool {
        self.start <= start && end <= self.end
    }

    /// Check if this region intersects the `[start, end)` range
    pub fn overlaps(&self, start: Address, end: Address) -> bool {
        self.start < end && start < self.end
    }
}

/// Ordered set of disjoint readable ranges in the target's address space
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    /// Parses the target's region table, keeping readable regions only
    pub fn load(pid: Pid) -> MemoryResult<Self> {
        if pid == 0 {
            return Err(MemoryError::NoProcess);
        }
        let table = fs::read_to_string(format!("/proc/{}/maps", pid))
            .map_err(|e| MemoryError::process_access(pid, e.to_string()))?;

        let mut regions = Vec::new();
        for line in table.lines() {
            match parse_maps_line(line) {
                Ok(region) => {
                    if region.is_readable() {
                        regions.push(region);
                    }
                }
                Err(e) => {
                    tracing::debug!(line, "skipping unparsable maps line: {}", e);
                }
            }
        }
        Ok(RegionMap { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Finds the region containing `address`, if any
    pub fn find_containing(&self, address: Address) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(address))
    }

    /// Check if any region fully contains the `[start, end)` range
    pub fn contains_range(&self, start: Address, end: Address) -> bool {
        self.regions.iter().any(|r| r.contains_range(start, end))
    }

    /// Check if any region intersects the `[start, end)` range
    pub fn overlaps(&self, start: Address, end: Address) -> bool {
        self.regions.iter().any(|r| r.overlaps(start, end))
    }

    /// Regions touched by at least one candidate, each listed once.
    ///
    /// Used to narrow a snapshot capture to only the regions a candidate
    /// list still cares about.
    pub fn interested_maps(&self, candidates: &[MemoryElement]) -> Vec<Region> {
        let mut interested: Vec<Region> = Vec::new();
        for element in candidates {
            if let Some(region) = self.find_containing(element.address()) {
                if !interested.iter().any(|r| r.start == region.start) {
                    interested.push(region.clone());
                }
            }
        }
        interested
    }
}

/// Parses one `/proc/<pid>/maps` line:
/// `start-end perms offset dev inode [path]`
fn parse_maps_line(line: &str) -> MemoryResult<Region> {
    let mut fields = line.split_whitespace();
    let range = fields
        .next()
        .ok_or_else(|| MemoryError::Unknown(format!("empty maps line: '{}'", line)))?;
    let perms = fields
        .next()
        .ok_or_else(|| MemoryError::Unknown(format!("missing perms: '{}'", line)))?;

    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| MemoryError::InvalidAddress(range.to_string()))?;
    let start = Address::new(
        usize::from_str_radix(start, 16)
            .map_err(|_| MemoryError::InvalidAddress(start.to_string()))?,
    );
    let end = Address::new(
        usize::from_str_radix(end, 16).map_err(|_| MemoryError::InvalidAddress(end.to_string()))?,
    );

    // offset, dev, inode are unused; the path is everything after them and
    // may itself contain spaces
    let rest: Vec<&str> = fields.skip(3).collect();
    let path = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    Ok(Region {
        start,
        end,
        perms: perms.to_string(),
        path,
    })
}

impl FromStr for Region {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_maps_line(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ScanType;

    fn region(start: usize, end: usize) -> Region {
        Region {
            start: Address::new(start),
            end: Address::new(end),
            perms: "rw-p".to_string(),
            path: None,
        }
    }

    #[test]
    fn test_parse_maps_line() {
        let r: Region = "7f3a1c000000-7f3a1c021000 rw-p 00000000 00:00 0"
            .parse()
            .unwrap();
        assert_eq!(r.start, Address::new(0x7f3a1c000000));
        assert_eq!(r.end, Address::new(0x7f3a1c021000));
        assert!(r.is_readable());
        assert!(r.is_writable());
        assert_eq!(r.path, None);

        let r: Region = "55e7c0b00000-55e7c0b21000 r-xp 00001000 103:02 9175041 /usr/bin/cat"
            .parse()
            .unwrap();
        assert!(r.is_readable());
        assert!(!r.is_writable());
        assert_eq!(r.path.as_deref(), Some("/usr/bin/cat"));

        let r: Region = "ffffffffff600000-ffffffffff601000 --xp 00000000 00:00 0 [vsyscall]"
            .parse()
            .unwrap();
        assert!(!r.is_readable());
        assert_eq!(r.path.as_deref(), Some("[vsyscall]"));

        // Paths may contain spaces
        let r: Region =
            "7f0000000000-7f0000001000 r--p 00000000 103:02 42 /usr/share/My App/lib.so"
                .parse()
                .unwrap();
        assert_eq!(r.path.as_deref(), Some("/usr/share/My App/lib.so"));

        assert!("garbage".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_queries() {
        let r = region(0x1000, 0x2000);
        assert_eq!(r.len(), 0x1000);
        assert!(r.contains(Address::new(0x1000)));
        assert!(r.contains(Address::new(0x1fff)));
        assert!(!r.contains(Address::new(0x2000)));
        assert!(r.contains_range(Address::new(0x1100), Address::new(0x1200)));
        assert!(!r.contains_range(Address::new(0x1100), Address::new(0x2001)));
        assert!(r.overlaps(Address::new(0x1f00), Address::new(0x2f00)));
        assert!(!r.overlaps(Address::new(0x2000), Address::new(0x3000)));
    }

    #[test]
    fn test_interested_maps_dedup() {
        let map = RegionMap {
            regions: vec![region(0x1000, 0x2000), region(0x5000, 0x6000)],
        };
        let candidates = vec![
            MemoryElement::new(Address::new(0x1100), ScanType::Int32),
            MemoryElement::new(Address::new(0x1200), ScanType::Int32),
            MemoryElement::new(Address::new(0x9000), ScanType::Int32),
        ];
        let interested = map.interested_maps(&candidates);
        assert_eq!(interested.len(), 1);
        assert_eq!(interested[0].start, Address::new(0x1000));
        assert_eq!(interested[0].end, Address::new(0x2000));
    }

    #[test]
    fn test_load_own_maps() {
        let map = RegionMap::load(std::process::id() as Pid).unwrap();
        assert!(!map.is_empty());
        for r in map.regions() {
            assert!(r.start < r.end);
            assert!(r.is_readable());
        }
    }

    #[test]
    fn test_load_rejects_missing_process() {
        assert!(matches!(RegionMap::load(0), Err(MemoryError::NoProcess)));
        // PID below 0 never exists in /proc
        assert!(matches!(
            RegionMap::load(-1),
            Err(MemoryError::ProcessAccess { .. })
        ));
    }
}
