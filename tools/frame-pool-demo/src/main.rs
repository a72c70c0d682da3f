//! Brings up the frame pools of the demo machine on the host and runs a
//! recursive allocate/verify/release workload against them.
//!
//! Usage: `frame-pool-demo [depth]`, log level from `FRAME_POOL_LOG`.

mod exercise;

use core::fmt;
use kernel_console::ConsoleLogger;
use kernel_frames::{
    ContFramePool, InfoFrame, MAX_POOL_FRAMES, PhysicalMemory, PoolError, PoolId, PoolRegistry,
};
use kernel_info::memory::{
    KERNEL_POOL_SIZE, KERNEL_POOL_START, MEM_HOLE_SIZE, MEM_HOLE_START, PROCESS_POOL_SIZE,
    PROCESS_POOL_START, TOTAL_FRAMES,
};
use kernel_memory_addresses::{FRAME_SIZE, PhysicalFrame};
use log::{LevelFilter, info};
use std::io::Write;
use std::process::ExitCode;
use std::{env, io};

const DEFAULT_DEPTH: u32 = 32;

const _: () = {
    assert!(KERNEL_POOL_SIZE <= MAX_POOL_FRAMES);
    assert!(PROCESS_POOL_SIZE <= MAX_POOL_FRAMES);
};

#[allow(clippy::cast_possible_truncation)]
const RAM_BYTES: usize = (TOTAL_FRAMES * FRAME_SIZE) as usize;

static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Trace, write_stderr);

fn write_stderr(args: fmt::Arguments<'_>) {
    let _ = io::stderr().write_fmt(args);
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("frame {frame} is not backed by simulated memory")]
    Unmapped { frame: PhysicalFrame },
    #[error("frame {frame} corrupted: expected {expected:#04x}, found {found:#04x}")]
    Corrupted {
        frame: PhysicalFrame,
        expected: u8,
        found: u8,
    },
    #[error("{pool} has {free} free frames after the exercise, expected {expected}")]
    Leaked { pool: PoolId, free: u64, expected: u64 },
    #[error("invalid depth {0:?}, expected a non-negative integer")]
    InvalidDepth(String),
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("frame-pool-demo: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let level = env::var("FRAME_POOL_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::Info);

    if LOGGER.init().is_ok() {
        log::set_max_level(level);
    }
}

fn run() -> Result<(), DemoError> {
    let depth: u32 = match env::args().nth(1) {
        Some(arg) => arg.parse().map_err(|_| DemoError::InvalidDepth(arg))?,
        None => DEFAULT_DEPTH,
    };

    let mut ram = vec![0u8; RAM_BYTES];
    let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
    info!(
        "Simulating {} frames of physical memory ({} KiB)",
        memory.frame_count(),
        RAM_BYTES / 1024
    );

    let mut registry = PoolRegistry::new();
    let kernel = registry.create_pool(
        &memory,
        KERNEL_POOL_START,
        KERNEL_POOL_SIZE,
        InfoFrame::SelfHosted,
    )?;

    let info_frames = ContFramePool::needed_info_frames(PROCESS_POOL_SIZE);
    let info_frame = registry.get_frames(kernel, info_frames)?;
    let process = registry.create_pool(
        &memory,
        PROCESS_POOL_START,
        PROCESS_POOL_SIZE,
        InfoFrame::External(info_frame),
    )?;

    registry
        .pool_mut(process)
        .ok_or(PoolError::UnknownPool {
            index: process.index(),
        })?
        .mark_inaccessible(MEM_HOLE_START, MEM_HOLE_SIZE)?;
    info!("Frame pools initialized");

    for id in [kernel, process] {
        let expected = free_count(&registry, id)?;
        info!("Exercising {id} with depth {depth}");
        exercise::run(&mut registry, &memory, id, depth)?;

        let free = free_count(&registry, id)?;
        if free != expected {
            return Err(DemoError::Leaked {
                pool: id,
                free,
                expected,
            });
        }
    }

    let mut report = String::new();
    registry.print_pool_info(&mut report);
    print!("{report}");

    info!("Memory exercise passed");
    Ok(())
}

fn free_count(registry: &PoolRegistry<'_>, id: PoolId) -> Result<u64, PoolError> {
    registry
        .pool(id)
        .map(ContFramePool::free_count)
        .ok_or(PoolError::UnknownPool { index: id.index() })
}
