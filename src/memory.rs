use std::fmt;
use std::num::NonZeroU32;

use crate::error::{Error, Result};

/// Identifier of a process owning frames. Zero is reserved for "unowned"
/// and only ever appears in persisted frame records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(NonZeroU32);

impl ProcessId {
    pub fn new(id: u32) -> Result<Self> {
        NonZeroU32::new(id)
            .map(ProcessId)
            .ok_or(Error::InvalidProcessId(id))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two independent frame table tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Ram,
    Swap,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Ram => write!(f, "RAM"),
            Tier::Swap => write!(f, "Swap"),
        }
    }
}

/// What an occupied frame holds: one page of one segment, owned by a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub process_id: ProcessId,
    /// 1-based index of the owning segment
    pub segment_id: u32,
    /// 1-based index of the page within its segment
    pub page_number: u32,
    pub content: String,
}

/// A slot in a frame table.
///
/// A frame is either free (no placement) or occupied (a placement with an
/// owner, segment, page number and content), so the free flag can never
/// disagree with the rest of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    number: u32,
    placement: Option<Placement>,
}

impl Frame {
    /// Create a free frame
    pub fn free(number: u32) -> Self {
        Frame {
            number,
            placement: None,
        }
    }

    pub fn occupied(number: u32, placement: Placement) -> Self {
        Frame {
            number,
            placement: Some(placement),
        }
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.placement.is_none()
    }

    #[inline]
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Owning process, `None` when free
    pub fn process_id(&self) -> Option<ProcessId> {
        self.placement.as_ref().map(|p| p.process_id)
    }

    pub fn is_owned_by(&self, process_id: ProcessId) -> bool {
        self.process_id() == Some(process_id)
    }

    /// Content held by the frame; empty when free
    pub fn content(&self) -> &str {
        self.placement.as_ref().map_or("", |p| p.content.as_str())
    }

    /// Segment id of the placement; 0 when free
    pub fn segment_id(&self) -> u32 {
        self.placement.as_ref().map_or(0, |p| p.segment_id)
    }

    /// Page number of the placement; 0 when free
    pub fn page_number(&self) -> u32 {
        self.placement.as_ref().map_or(0, |p| p.page_number)
    }

    fn occupy(&mut self, placement: Placement) {
        self.placement = Some(placement);
    }

    fn clear(&mut self) -> Option<Placement> {
        self.placement.take()
    }
}

/// Ordered, fixed-capacity sequence of frames for one tier.
///
/// The capacity is decided when the table is created or loaded and never
/// changes afterwards; frames only flip between free and occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    tier: Tier,
    frames: Vec<Frame>,
}

impl FrameTable {
    /// Create a table of `capacity` free frames numbered from 0
    pub fn new(tier: Tier, capacity: u32) -> Self {
        let frames = (0..capacity).map(Frame::free).collect();
        FrameTable { tier, frames }
    }

    /// Wrap frames loaded from storage, keeping their order and numbers
    pub fn from_frames(tier: Tier, frames: Vec<Frame>) -> Self {
        FrameTable { tier, frames }
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn free_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_free()).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.capacity() - self.free_count()
    }

    /// Frames currently owned by `process_id`, in table order
    pub fn owned_by(&self, process_id: ProcessId) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(move |f| f.is_owned_by(process_id))
    }

    /// Place a page into the frame at `index` and return its frame number.
    ///
    /// Returns `None`, leaving the table untouched, when `index` is out of
    /// bounds or the frame is already occupied.
    pub fn occupy(&mut self, index: usize, placement: Placement) -> Option<u32> {
        let frame = self.frames.get_mut(index).filter(|f| f.is_free())?;
        frame.occupy(placement);
        Some(frame.number)
    }

    /// Reset every frame owned by `process_id` to the free state.
    ///
    /// Walks the whole table; returns the numbers of the released frames.
    pub fn release_process(&mut self, process_id: ProcessId) -> Vec<u32> {
        let mut released = Vec::new();
        for frame in self.frames.iter_mut() {
            if frame.is_owned_by(process_id) {
                frame.clear();
                released.push(frame.number);
            }
        }
        released
    }
}

/// Monotonic first-fit scan position over one frame table.
///
/// The cursor only moves forward: a frame freed behind it is not seen again
/// until a new cursor is created for the next allocation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeFrameCursor {
    next: usize,
}

impl FreeFrameCursor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.next
    }

    /// Index of the next free frame at or after the cursor, or `None` once
    /// the end of the table is reached.
    pub fn next_free(&mut self, table: &FrameTable) -> Option<usize> {
        while self.next < table.capacity() && !table.frames[self.next].is_free() {
            self.next += 1;
        }
        (self.next < table.capacity()).then_some(self.next)
    }

    /// Occupy the next free frame with `placement`, returning its number,
    /// or `None` when the table has no free frame left past the cursor.
    pub fn place(&mut self, table: &mut FrameTable, placement: Placement) -> Option<u32> {
        let slot = self.next_free(table)?;
        table.occupy(slot, placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u32) -> ProcessId {
        ProcessId::new(id).unwrap()
    }

    fn placement(process: u32, segment_id: u32, page_number: u32, content: &str) -> Placement {
        Placement {
            process_id: pid(process),
            segment_id,
            page_number,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_process_id_rejects_zero() {
        assert!(matches!(ProcessId::new(0), Err(Error::InvalidProcessId(0))));
        assert_eq!(pid(7).get(), 7);
        assert_eq!(pid(7).to_string(), "7");
    }

    #[test]
    fn test_table_initialization() {
        let table = FrameTable::new(Tier::Ram, 4);

        assert_eq!(table.tier(), Tier::Ram);
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.free_count(), 4);
        assert_eq!(table.occupied_count(), 0);

        // Frame numbers follow position
        let numbers: Vec<u32> = table.frames().iter().map(Frame::number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_free_frame_fields_are_zeroed() {
        let frame = Frame::free(3);
        assert!(frame.is_free());
        assert_eq!(frame.content(), "");
        assert_eq!(frame.segment_id(), 0);
        assert_eq!(frame.page_number(), 0);
        assert_eq!(frame.process_id(), None);
    }

    #[test]
    fn test_occupy_and_release() {
        let mut table = FrameTable::new(Tier::Swap, 3);
        assert_eq!(table.occupy(1, placement(5, 2, 3, "abc")), Some(1));

        let frame = table.frame(1).unwrap();
        assert!(!frame.is_free());
        assert_eq!(frame.content(), "abc");
        assert_eq!(frame.segment_id(), 2);
        assert_eq!(frame.page_number(), 3);
        assert_eq!(frame.process_id(), Some(pid(5)));
        assert_eq!(table.occupied_count(), 1);

        assert_eq!(table.release_process(pid(5)), vec![1]);
        assert_eq!(table.frame(1), Some(&Frame::free(1)));
        assert_eq!(table.free_count(), 3);
    }

    #[test]
    fn test_occupy_rejects_taken_or_missing_frame() {
        let mut table = FrameTable::new(Tier::Ram, 1);
        assert_eq!(table.occupy(0, placement(1, 1, 1, "a")), Some(0));

        // Occupied frame keeps its first placement
        assert_eq!(table.occupy(0, placement(2, 1, 1, "b")), None);
        assert_eq!(table.frame(0).unwrap().content(), "a");

        // Out of bounds
        assert_eq!(table.occupy(5, placement(2, 1, 1, "c")), None);
        assert_eq!(table.capacity(), 1);
    }

    #[test]
    fn test_cursor_place() {
        let mut table = FrameTable::new(Tier::Swap, 2);
        table.occupy(0, placement(1, 1, 2, "a"));

        let mut cursor = FreeFrameCursor::new();
        assert_eq!(cursor.place(&mut table, placement(2, 1, 2, "b")), Some(1));
        assert_eq!(cursor.place(&mut table, placement(2, 1, 3, "c")), None);
        assert_eq!(table.free_count(), 0);
    }

    #[test]
    fn test_release_leaves_other_processes() {
        let mut table = FrameTable::new(Tier::Ram, 3);
        table.occupy(0, placement(1, 1, 1, "one"));
        table.occupy(1, placement(2, 1, 1, "two"));
        table.occupy(2, placement(1, 2, 1, "three"));

        assert_eq!(table.release_process(pid(1)), vec![0, 2]);
        assert_eq!(table.owned_by(pid(2)).count(), 1);
        assert_eq!(table.frame(1).unwrap().content(), "two");

        // Nothing left to release
        assert!(table.release_process(pid(1)).is_empty());
    }

    #[test]
    fn test_cursor_skips_occupied_frames() {
        let mut table = FrameTable::new(Tier::Ram, 4);
        table.occupy(0, placement(1, 1, 1, "a"));
        table.occupy(2, placement(1, 2, 1, "b"));

        let mut cursor = FreeFrameCursor::new();
        assert_eq!(cursor.next_free(&table), Some(1));
        table.occupy(1, placement(1, 3, 1, "c"));
        assert_eq!(cursor.next_free(&table), Some(3));
        table.occupy(3, placement(1, 4, 1, "d"));
        assert_eq!(cursor.next_free(&table), None);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_cursor_never_rewinds() {
        let mut table = FrameTable::new(Tier::Swap, 3);
        table.occupy(0, placement(1, 1, 2, "a"));
        table.occupy(1, placement(2, 1, 2, "b"));

        let mut cursor = FreeFrameCursor::new();
        assert_eq!(cursor.next_free(&table), Some(2));
        table.occupy(2, placement(2, 1, 3, "c"));

        // Frame 0 is freed behind the cursor and stays unseen
        table.release_process(pid(1));
        assert_eq!(cursor.next_free(&table), None);

        // A fresh cursor finds it again
        assert_eq!(FreeFrameCursor::new().next_free(&table), Some(0));
    }

    #[test]
    fn test_empty_table() {
        let table = FrameTable::new(Tier::Ram, 0);
        assert_eq!(table.capacity(), 0);
        assert_eq!(FreeFrameCursor::new().next_free(&table), None);
    }
}
