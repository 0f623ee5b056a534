//! Load -> mutate -> store orchestration over the two persisted frame tables.
//!
//! Each operation loads both tables, runs to completion, and writes them back.
//! The manager assumes it is the only writer of the table files.

use std::path::{Path, PathBuf};

use log::info;

use crate::allocation::{self, AllocationReport, CommitMode, ReleaseReport};
use crate::config::SimulatorConfig;
use crate::error::{Error, Result};
use crate::io::{load_table, read_source_lines, save_table};
use crate::memory::{FrameTable, ProcessId, Tier};
use crate::segmentation::segment_lines;
use crate::usage::{MemoryUsage, TierUsage};

pub struct MemoryManager {
    config: SimulatorConfig,
    ram_path: PathBuf,
    swap_path: PathBuf,
}

/// Usage of both tiers, plus totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    pub ram: TierUsage,
    pub swap: TierUsage,
    pub available_bytes: u64,
    /// Bytes held by the queried process, if one was given
    pub process_bytes: Option<(ProcessId, u64)>,
}

impl MemoryManager {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        config: SimulatorConfig,
        ram_path: P,
        swap_path: Q,
    ) -> Result<Self> {
        config.validate()?;
        Ok(MemoryManager {
            config,
            ram_path: ram_path.into(),
            swap_path: swap_path.into(),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Create fresh tables with every frame free, overwriting existing files
    pub fn init_tables(&self, ram_frames: usize, swap_frames: usize) -> Result<()> {
        let ram = FrameTable::new(Tier::Ram, frame_count(Tier::Ram, ram_frames)?);
        let swap = FrameTable::new(Tier::Swap, frame_count(Tier::Swap, swap_frames)?);
        save_table(&self.ram_path, &ram)?;
        save_table(&self.swap_path, &swap)?;
        info!(
            "created {} ({} frames) and {} ({} frames)",
            self.ram_path.display(),
            ram_frames,
            self.swap_path.display(),
            swap_frames
        );
        Ok(())
    }

    fn load_tables(&self) -> Result<(FrameTable, FrameTable)> {
        let ram = load_table(&self.ram_path, Tier::Ram)?;
        let swap = load_table(&self.swap_path, Tier::Swap)?;
        Ok((ram, swap))
    }

    fn store_tables(&self, ram: &FrameTable, swap: &FrameTable) -> Result<()> {
        save_table(&self.ram_path, ram)?;
        save_table(&self.swap_path, swap)
    }

    /// Segment the source at `source`, then place it for `process_id`.
    ///
    /// In partial-commit mode the tables are stored even when allocation runs
    /// out of frames, so the pages placed before the failure persist; the
    /// allocation error is still returned. In atomic mode nothing is stored on
    /// failure.
    pub fn load_program<P: AsRef<Path>>(&self, source: P, process_id: ProcessId) -> Result<AllocationReport> {
        let lines = read_source_lines(source.as_ref())?;
        let segment_size = self.config.segment_size_for(lines.len())?;
        let segments = segment_lines(
            &lines,
            segment_size,
            self.config.page_size()?,
            self.config.tail_pagination,
        );
        info!(
            "{}: {} lines in {} segments of up to {} lines",
            source.as_ref().display(),
            lines.len(),
            segments.len(),
            segment_size
        );

        let (mut ram, mut swap) = self.load_tables()?;
        match allocation::allocate(&segments, process_id, &mut ram, &mut swap, self.config.commit) {
            Ok(report) => {
                self.store_tables(&ram, &swap)?;
                Ok(report)
            }
            Err(err) => {
                if self.config.commit == CommitMode::Partial && err.pages_placed() > 0 {
                    self.store_tables(&ram, &swap)?;
                }
                Err(Error::Alloc(err))
            }
        }
    }

    /// Free every frame owned by `process_id` in both tables
    pub fn release_process(&self, process_id: ProcessId) -> Result<ReleaseReport> {
        let (mut ram, mut swap) = self.load_tables()?;
        let report = allocation::release(process_id, &mut ram, &mut swap);
        if !report.is_empty() {
            self.store_tables(&ram, &swap)?;
        }
        Ok(report)
    }

    /// Read-only usage snapshot; RAM and Swap both count as available capacity
    pub fn usage(&self, process_id: Option<ProcessId>) -> Result<UsageReport> {
        let (ram, swap) = self.load_tables()?;
        let usage = MemoryUsage::new(self.config.frame_size);
        let tables = [&ram, &swap];

        Ok(UsageReport {
            ram: usage.summarize(&ram),
            swap: usage.summarize(&swap),
            available_bytes: usage.available_memory(&tables),
            process_bytes: process_id.map(|pid| (pid, usage.memory_used_by_process(&tables, pid))),
        })
    }
}

/// Frame numbers are `u32`, so a tier holds at most `u32::MAX` frames
fn frame_count(tier: Tier, frames: usize) -> Result<u32> {
    u32::try_from(frames).map_err(|_| {
        Error::InvalidConfig(format!(
            "{} table of {} frames exceeds the maximum of {}",
            tier,
            frames,
            u32::MAX
        ))
    })
}
