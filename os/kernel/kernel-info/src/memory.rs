//! # Memory Layout

use kernel_memory_addresses::{FRAME_SIZE, PhysicalFrame};

const MIB: u64 = 1024 * 1024;

/// First frame of the kernel pool (2 MiB).
pub const KERNEL_POOL_START: PhysicalFrame = PhysicalFrame::new((2 * MIB) / FRAME_SIZE);

/// Frames in the kernel pool (2 MiB).
pub const KERNEL_POOL_SIZE: u64 = (2 * MIB) / FRAME_SIZE;

/// First frame of the process pool (4 MiB).
pub const PROCESS_POOL_START: PhysicalFrame = PhysicalFrame::new((4 * MIB) / FRAME_SIZE);

/// Frames in the process pool (28 MiB).
pub const PROCESS_POOL_SIZE: u64 = (28 * MIB) / FRAME_SIZE;

/// First frame of the memory hole (15 MiB), inside the process pool.
pub const MEM_HOLE_START: PhysicalFrame = PhysicalFrame::new((15 * MIB) / FRAME_SIZE);

/// Frames in the memory hole (1 MiB).
pub const MEM_HOLE_SIZE: u64 = MIB / FRAME_SIZE;

/// Total physical memory of the machine in frames (32 MiB).
pub const TOTAL_FRAMES: u64 = (32 * MIB) / FRAME_SIZE;

const _: () = {
    assert!(KERNEL_POOL_START.number() + KERNEL_POOL_SIZE <= PROCESS_POOL_START.number());
    assert!(MEM_HOLE_START.number() >= PROCESS_POOL_START.number());
    assert!(
        MEM_HOLE_START.number() + MEM_HOLE_SIZE
            <= PROCESS_POOL_START.number() + PROCESS_POOL_SIZE
    );
    assert!(PROCESS_POOL_START.number() + PROCESS_POOL_SIZE <= TOTAL_FRAMES);
};
