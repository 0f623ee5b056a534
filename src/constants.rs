// size of one frame in memory units, shared by every usage computation
pub const FRAME_SIZE: u64 = 4096;
// largest frame size a config may ask for (1 MiB)
pub const MAX_FRAME_SIZE: u64 = 1 << 20;

// characters carved into each page
pub const DEFAULT_PAGE_SIZE: usize = 50;

// a source is split into this many segments (segment size = ceil(lines / fan-out))
pub const DEFAULT_SEGMENT_FAN_OUT: usize = 3;

pub const DEFAULT_RAM_FRAMES: usize = 16;
pub const DEFAULT_SWAP_FRAMES: usize = 64;

/// Process id stored in a frame record that nobody owns.
pub const UNOWNED_PROCESS: u32 = 0;
