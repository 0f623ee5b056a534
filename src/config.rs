use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::Deserialize;

use crate::allocation::CommitMode;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::segmentation::TailPagination;

/// Runtime parameters of the simulator.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "page_size": 64, "commit": "atomic" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    pub frame_size: u64,
    pub page_size: usize,
    pub segment_fan_out: usize,
    pub commit: CommitMode,
    pub tail_pagination: TailPagination,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            frame_size: FRAME_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            segment_fan_out: DEFAULT_SEGMENT_FAN_OUT,
            commit: CommitMode::default(),
            tail_pagination: TailPagination::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: SimulatorConfig =
            serde_json::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 {
            return Err(Error::InvalidConfig("frame_size must be positive".to_string()));
        }
        if self.frame_size > MAX_FRAME_SIZE {
            return Err(Error::InvalidConfig(format!(
                "frame_size {} exceeds the maximum of {}",
                self.frame_size, MAX_FRAME_SIZE
            )));
        }
        self.page_size()?;
        self.fan_out()?;
        Ok(())
    }

    pub fn page_size(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.page_size)
            .ok_or_else(|| Error::InvalidConfig("page_size must be positive".to_string()))
    }

    fn fan_out(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.segment_fan_out)
            .ok_or_else(|| Error::InvalidConfig("segment_fan_out must be positive".to_string()))
    }

    /// Lines per segment for a source of `line_count` lines:
    /// `ceil(line_count / fan_out)`, never less than one.
    pub fn segment_size_for(&self, line_count: usize) -> Result<NonZeroUsize> {
        let size = line_count.div_ceil(self.fan_out()?.get());
        Ok(NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN))
    }
}
