pub mod allocation;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod segmentation;
pub mod usage;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use allocation::{AllocationReport, CommitMode, ReleaseReport, allocate, release};
pub use config::SimulatorConfig;
pub use constants::*;
pub use error::{AllocError, Error, Result};
pub use memory::{Frame, FrameTable, ProcessId, Tier};
pub use segmentation::{Segment, TailPagination, paginate, segment_lines};
pub use usage::MemoryUsage;
pub use vm_manager::MemoryManager;
