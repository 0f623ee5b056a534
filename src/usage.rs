use std::collections::BTreeMap;

use crate::memory::{FrameTable, ProcessId, Tier};

/// Memory accounting over frame table snapshots.
///
/// Every frame counts for `frame_size` units, whatever its content length.
/// Byte totals saturate at `u64::MAX` rather than overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    frame_size: u64,
}

/// Summary of one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierUsage {
    pub tier: Tier,
    pub capacity: usize,
    pub free: usize,
    pub occupied: usize,
    pub available_bytes: u64,
    pub used_bytes: u64,
    /// Occupied frames per owning process
    pub per_process: BTreeMap<ProcessId, usize>,
}

impl MemoryUsage {
    pub fn new(frame_size: u64) -> Self {
        MemoryUsage { frame_size }
    }

    #[inline]
    pub fn frame_size(&self) -> u64 {
        self.frame_size
    }

    /// Free frames across `tables`, times the frame size
    pub fn available_memory(&self, tables: &[&FrameTable]) -> u64 {
        let free: usize = tables.iter().map(|t| t.free_count()).sum();
        self.bytes(free)
    }

    /// Frames owned by `process_id` across `tables`, times the frame size
    pub fn memory_used_by_process(&self, tables: &[&FrameTable], process_id: ProcessId) -> u64 {
        let owned: usize = tables.iter().map(|t| t.owned_by(process_id).count()).sum();
        self.bytes(owned)
    }

    fn bytes(&self, frames: usize) -> u64 {
        (frames as u64).saturating_mul(self.frame_size)
    }

    pub fn summarize(&self, table: &FrameTable) -> TierUsage {
        let mut per_process = BTreeMap::new();
        for pid in table.frames().iter().filter_map(|f| f.process_id()) {
            *per_process.entry(pid).or_insert(0) += 1;
        }
        let free = table.free_count();
        let occupied = table.capacity() - free;

        TierUsage {
            tier: table.tier(),
            capacity: table.capacity(),
            free,
            occupied,
            available_bytes: self.bytes(free),
            used_bytes: self.bytes(occupied),
            per_process,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{CommitMode, allocate, release};
    use crate::constants::FRAME_SIZE;
    use crate::segmentation::Segment;

    fn pid(id: u32) -> ProcessId {
        ProcessId::new(id).unwrap()
    }

    fn segment(pages: &[&str]) -> Segment {
        Segment::new(pages.iter().map(|p| p.to_string()).collect())
    }

    fn loaded_tables() -> (FrameTable, FrameTable) {
        let mut ram = FrameTable::new(Tier::Ram, 4);
        let mut swap = FrameTable::new(Tier::Swap, 6);
        allocate(&[segment(&["a1", "a2", "a3"])], pid(1), &mut ram, &mut swap, CommitMode::Partial)
            .unwrap();
        allocate(&[segment(&["b1"]), segment(&["c1", "c2"])], pid(2), &mut ram, &mut swap, CommitMode::Partial)
            .unwrap();
        (ram, swap)
    }

    #[test]
    fn test_empty_tables_fully_available() {
        let usage = MemoryUsage::new(FRAME_SIZE);
        let ram = FrameTable::new(Tier::Ram, 4);
        let swap = FrameTable::new(Tier::Swap, 6);

        assert_eq!(usage.available_memory(&[&ram]), 4 * 4096);
        assert_eq!(usage.available_memory(&[&ram, &swap]), 10 * 4096);
        assert_eq!(usage.memory_used_by_process(&[&ram, &swap], pid(1)), 0);
    }

    #[test]
    fn test_usage_after_allocation() {
        let usage = MemoryUsage::new(FRAME_SIZE);
        let (ram, swap) = loaded_tables();

        // RAM holds 3 first pages, swap holds 3 overflow pages
        assert_eq!(usage.available_memory(&[&ram]), 4096);
        assert_eq!(usage.available_memory(&[&ram, &swap]), 4 * 4096);
        assert_eq!(usage.memory_used_by_process(&[&ram, &swap], pid(1)), 3 * 4096);
        assert_eq!(usage.memory_used_by_process(&[&ram], pid(2)), 2 * 4096);
        assert_eq!(usage.memory_used_by_process(&[&ram, &swap], pid(2)), 3 * 4096);
    }

    #[test]
    fn test_release_restores_capacity() {
        let usage = MemoryUsage::new(FRAME_SIZE);
        let (mut ram, mut swap) = loaded_tables();

        release(pid(1), &mut ram, &mut swap);
        release(pid(2), &mut ram, &mut swap);

        let capacity = (ram.capacity() + swap.capacity()) as u64;
        assert_eq!(usage.available_memory(&[&ram, &swap]), capacity * FRAME_SIZE);
    }

    #[test]
    fn test_huge_frame_size_saturates() {
        let usage = MemoryUsage::new(u64::MAX);
        let (ram, swap) = loaded_tables();

        assert_eq!(usage.available_memory(&[&ram, &swap]), u64::MAX);
        assert_eq!(usage.memory_used_by_process(&[&ram, &swap], pid(1)), u64::MAX);
        assert_eq!(usage.memory_used_by_process(&[&ram], pid(9)), 0);
        assert_eq!(usage.summarize(&ram).used_bytes, u64::MAX);
    }

    #[test]
    fn test_summary() {
        let usage = MemoryUsage::new(100);
        let (ram, _swap) = loaded_tables();
        let summary = usage.summarize(&ram);

        assert_eq!(summary.tier, Tier::Ram);
        assert_eq!(summary.capacity, 4);
        assert_eq!(summary.free, 1);
        assert_eq!(summary.occupied, 3);
        assert_eq!(summary.available_bytes, 100);
        assert_eq!(summary.used_bytes, 300);
        assert_eq!(summary.per_process.get(&pid(1)), Some(&1));
        assert_eq!(summary.per_process.get(&pid(2)), Some(&2));
    }
}
