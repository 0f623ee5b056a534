use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::memory::Tier;

/// Failure while placing pages into the frame tables.
///
/// Both variants carry how many pages were already placed by the failing
/// call, so a caller running in partial-commit mode knows what was left behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error(
        "RAM exhausted: no free frame for the first page of segment {segment_id} \
         ({pages_placed} pages placed before the failure)"
    )]
    RamExhausted { segment_id: u32, pages_placed: usize },
    #[error(
        "swap exhausted: no free frame for page {page_number} of segment {segment_id} \
         ({pages_placed} pages placed before the failure)"
    )]
    SwapExhausted {
        segment_id: u32,
        page_number: u32,
        pages_placed: usize,
    },
}

impl AllocError {
    /// The tier that ran out of free frames.
    pub fn tier(&self) -> Tier {
        match self {
            AllocError::RamExhausted { .. } => Tier::Ram,
            AllocError::SwapExhausted { .. } => Tier::Swap,
        }
    }

    pub fn pages_placed(&self) -> usize {
        match self {
            AllocError::RamExhausted { pages_placed, .. }
            | AllocError::SwapExhausted { pages_placed, .. } => *pages_placed,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read source text {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read frame table {path}: {source}")]
    TableUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("frame table {path} is not valid JSON: {source}")]
    TableMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("frame table {path}: frame {frame_number} is inconsistent: {reason}")]
    TableInconsistent {
        path: PathBuf,
        frame_number: u32,
        reason: String,
    },
    #[error("failed to write frame table {path}: {source}")]
    TableUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode frame table: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid process id {0}: process ids start at 1")]
    InvalidProcessId(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
