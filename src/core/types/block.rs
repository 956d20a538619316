//! Raw byte captures of contiguous memory regions

use super::address::Address;

/// An immutable capture of one contiguous region at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBlock {
    address: Address,
    data: Vec<u8>,
}

impl MemoryBlock {
    pub fn new(address: Address, data: Vec<u8>) -> Self {
        MemoryBlock { address, data }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// One-past-the-last captured address
    pub fn end_address(&self) -> Address {
        Address::new(self.address.as_usize() + self.data.len())
    }
}

/// An ordered sequence of block captures, one per region
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockSet {
    blocks: Vec<MemoryBlock>,
}

impl MemoryBlockSet {
    pub fn new() -> Self {
        MemoryBlockSet { blocks: Vec::new() }
    }

    pub fn push(&mut self, block: MemoryBlock) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MemoryBlock> {
        self.blocks.iter()
    }

    /// Total number of captured bytes across all blocks
    pub fn total_bytes(&self) -> usize {
        self.blocks.iter().map(MemoryBlock::size).sum()
    }
}

impl<'a> IntoIterator for &'a MemoryBlockSet {
    type Item = &'a MemoryBlock;
    type IntoIter = std::slice::Iter<'a, MemoryBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_bounds() {
        let b = MemoryBlock::new(Address::new(0x1000), vec![0u8; 0x100]);
        assert_eq!(b.size(), 0x100);
        assert_eq!(b.end_address(), Address::new(0x1100));
    }

    #[test]
    fn test_block_set() {
        let mut set = MemoryBlockSet::new();
        assert!(set.is_empty());

        set.push(MemoryBlock::new(Address::new(0x1000), vec![0u8; 16]));
        set.push(MemoryBlock::new(Address::new(0x5000), vec![0u8; 32]));
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_bytes(), 48);

        set.clear();
        assert!(set.is_empty());
    }
}
