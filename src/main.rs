//! Segmented memory simulator - command line driver
//!
//! Usage: segmented-memory [OPTIONS] <COMMAND>
//!
//! Commands:
//!   init     - Create fresh RAM and Swap frame tables
//!   load     - Segment a text file and place its pages for a process
//!   release  - Free every frame owned by a process
//!   usage    - Report free and used memory

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};

use segmented_memory::constants::{DEFAULT_RAM_FRAMES, DEFAULT_SWAP_FRAMES};
use segmented_memory::usage::TierUsage;
use segmented_memory::{CommitMode, MemoryManager, ProcessId, SimulatorConfig};

#[derive(Parser)]
#[command(name = "segmented-memory")]
#[command(about = "Segmented and paged memory simulator over RAM and Swap frame tables")]
struct Cli {
    /// RAM frame table file
    #[arg(long, default_value = "RAM.json", global = true)]
    ram: PathBuf,

    /// Swap frame table file
    #[arg(long, default_value = "Swap.json", global = true)]
    swap: PathBuf,

    /// JSON file with simulator settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print every placed and released frame
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create fresh frame tables with every frame free
    Init {
        #[arg(long, default_value_t = DEFAULT_RAM_FRAMES)]
        ram_frames: usize,
        #[arg(long, default_value_t = DEFAULT_SWAP_FRAMES)]
        swap_frames: usize,
    },
    /// Segment a text file and place its pages
    Load {
        /// Source text file
        source: PathBuf,
        /// Owning process id (1 or greater)
        #[arg(short, long)]
        pid: u32,
        /// Characters per page
        #[arg(long)]
        page_size: Option<usize>,
        /// Number of segments the source is split into
        #[arg(long)]
        fan_out: Option<usize>,
        /// Leave the tables untouched if the program does not fit
        #[arg(long)]
        atomic: bool,
    },
    /// Free every frame owned by a process
    Release {
        #[arg(short, long)]
        pid: u32,
    },
    /// Report free memory, and optionally the memory held by one process
    Usage {
        #[arg(short, long)]
        pid: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulatorConfig::default(),
    };

    if let Command::Load { page_size, fan_out, atomic, .. } = &cli.command {
        if let Some(size) = page_size {
            config.page_size = *size;
        }
        if let Some(fan_out) = fan_out {
            config.segment_fan_out = *fan_out;
        }
        if *atomic {
            config.commit = CommitMode::Atomic;
        }
    }

    let manager = MemoryManager::new(config, &cli.ram, &cli.swap)?;

    match cli.command {
        Command::Init { ram_frames, swap_frames } => {
            manager.init_tables(ram_frames, swap_frames).context("creating frame tables")?;
        }
        Command::Load { source, pid, .. } => {
            let process_id = ProcessId::new(pid)?;
            let report = manager
                .load_program(&source, process_id)
                .with_context(|| format!("loading {} for process {}", source.display(), process_id))?;
            println!(
                "Process {}: {} pages placed and tables updated",
                process_id,
                report.placed.len()
            );
        }
        Command::Release { pid } => {
            let process_id = ProcessId::new(pid)?;
            let report = manager.release_process(process_id)?;
            println!(
                "Process {}: released {} RAM frames and {} swap frames",
                process_id,
                report.ram_frames.len(),
                report.swap_frames.len()
            );
        }
        Command::Usage { pid } => {
            let process_id = pid.map(ProcessId::new).transpose()?;
            let report = manager.usage(process_id)?;
            print_tier(&report.ram);
            print_tier(&report.swap);
            println!("Available memory: {}", report.available_bytes);
            if let Some((process_id, bytes)) = report.process_bytes {
                println!("Memory used by process {}: {}", process_id, bytes);
            }
        }
    }

    Ok(())
}

fn print_tier(usage: &TierUsage) {
    println!(
        "{}: {} frames, {} free, {} occupied ({} available, {} used)",
        usage.tier, usage.capacity, usage.free, usage.occupied, usage.available_bytes, usage.used_bytes
    );
    for (process_id, frames) in &usage.per_process {
        println!("  process {}: {} frames", process_id, frames);
    }
}
