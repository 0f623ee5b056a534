//! Placing segments into the RAM and Swap frame tables, and releasing them.
//!
//! The first page of every segment goes to the next free RAM frame, the
//! remaining pages to the next free Swap frame. Both scans use a
//! [`FreeFrameCursor`] created per call, so a call never revisits a slot it
//! has already passed.

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::AllocError;
use crate::memory::{FrameTable, FreeFrameCursor, Placement, ProcessId, Tier};
use crate::segmentation::Segment;

/// What happens to the tables when allocation runs out of frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Frames written before the failure stay written
    #[default]
    Partial,
    /// Tables are only modified when every page fits
    Atomic,
}

/// One page written into a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPage {
    pub tier: Tier,
    pub frame_number: u32,
    pub segment_id: u32,
    pub page_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    pub placed: Vec<PlacedPage>,
}

impl AllocationReport {
    pub fn pages_in(&self, tier: Tier) -> usize {
        self.placed.iter().filter(|p| p.tier == tier).count()
    }
}

/// Frames freed by a release, per tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub ram_frames: Vec<u32>,
    pub swap_frames: Vec<u32>,
}

impl ReleaseReport {
    pub fn total(&self) -> usize {
        self.ram_frames.len() + self.swap_frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Place every page of `segments` into the tables on behalf of `process_id`.
///
/// Segment ids and page numbers are 1-based. On exhaustion the error names
/// the tier that ran out; with [`CommitMode::Partial`] the pages placed before
/// the failure remain in the tables, with [`CommitMode::Atomic`] the tables
/// are left exactly as they were.
pub fn allocate(
    segments: &[Segment],
    process_id: ProcessId,
    ram: &mut FrameTable,
    swap: &mut FrameTable,
    mode: CommitMode,
) -> Result<AllocationReport, AllocError> {
    debug_assert_eq!(ram.tier(), Tier::Ram);
    debug_assert_eq!(swap.tier(), Tier::Swap);

    match mode {
        CommitMode::Partial => place_segments(segments, process_id, ram, swap),
        CommitMode::Atomic => {
            let mut staged_ram = ram.clone();
            let mut staged_swap = swap.clone();
            let report = place_segments(segments, process_id, &mut staged_ram, &mut staged_swap)?;
            *ram = staged_ram;
            *swap = staged_swap;
            Ok(report)
        }
    }
}

fn place_segments(
    segments: &[Segment],
    process_id: ProcessId,
    ram: &mut FrameTable,
    swap: &mut FrameTable,
) -> Result<AllocationReport, AllocError> {
    let mut ram_cursor = FreeFrameCursor::new();
    let mut swap_cursor = FreeFrameCursor::new();
    let mut report = AllocationReport::default();

    for (index, segment) in segments.iter().enumerate() {
        let segment_id = index as u32 + 1;

        for (offset, page) in segment.pages().iter().enumerate() {
            let page_number = offset as u32 + 1;
            let (table, cursor) = if offset == 0 {
                (&mut *ram, &mut ram_cursor)
            } else {
                (&mut *swap, &mut swap_cursor)
            };

            let placement = Placement {
                process_id,
                segment_id,
                page_number,
                content: page.clone(),
            };
            let Some(frame_number) = cursor.place(table, placement) else {
                let pages_placed = report.placed.len();
                let err = match table.tier() {
                    Tier::Ram => AllocError::RamExhausted {
                        segment_id,
                        pages_placed,
                    },
                    Tier::Swap => AllocError::SwapExhausted {
                        segment_id,
                        page_number,
                        pages_placed,
                    },
                };
                warn!("{}", err);
                return Err(err);
            };

            debug!(
                "process {}: segment {} page {} -> {} frame {}",
                process_id,
                segment_id,
                page_number,
                table.tier(),
                frame_number
            );
            report.placed.push(PlacedPage {
                tier: table.tier(),
                frame_number,
                segment_id,
                page_number,
            });
        }
    }

    info!(
        "process {}: {} segments placed ({} pages in RAM, {} in swap)",
        process_id,
        segments.len(),
        report.pages_in(Tier::Ram),
        report.pages_in(Tier::Swap)
    );
    Ok(report)
}

/// Free every frame owned by `process_id` in both tables.
///
/// Other processes' frames and free frames are untouched; releasing a process
/// that owns nothing is a no-op.
pub fn release(process_id: ProcessId, ram: &mut FrameTable, swap: &mut FrameTable) -> ReleaseReport {
    let report = ReleaseReport {
        ram_frames: ram.release_process(process_id),
        swap_frames: swap.release_process(process_id),
    };

    for frame in &report.ram_frames {
        debug!("process {}: released {} frame {}", process_id, ram.tier(), frame);
    }
    for frame in &report.swap_frames {
        debug!("process {}: released {} frame {}", process_id, swap.tier(), frame);
    }
    info!(
        "process {}: released {} RAM frames and {} swap frames",
        process_id,
        report.ram_frames.len(),
        report.swap_frames.len()
    );
    report
}
