use crate::FrameState;
use kernel_memory_addresses::PhysicalFrame;

/// Errors reported by frame pools and the pool registry.
///
/// Every failed operation leaves all frame states and counters unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("pool of {count} frames exceeds the bitmap capacity of {max} frames")]
    CapacityExceeded { count: u64, max: u64 },
    #[error("pool must contain at least one frame")]
    EmptyPool,
    #[error("info frame {frame} is not covered by the physical memory mapping")]
    UnmappedInfoFrame { frame: PhysicalFrame },
    #[error("info frame {frame} is not allocated in any registered pool")]
    InfoFrameNotAllocated { frame: PhysicalFrame },
    #[error("info frame {frame} already holds the bitmap of a registered pool")]
    InfoFrameInUse { frame: PhysicalFrame },
    #[error("requested {requested} frames, but only {free} are free")]
    InsufficientFreeFrames { requested: u64, free: u64 },
    #[error("requested zero frames")]
    EmptyRequest,
    #[error("no contiguous region of {requested} free frames")]
    NoContiguousRegion { requested: u64 },
    #[error("frame {frame} lies outside the pool")]
    OutOfRange { frame: PhysicalFrame },
    #[error("cannot reserve frame {frame}: it is not free")]
    InvalidReservationTarget { frame: PhysicalFrame },
    #[error("frame {frame} is not owned by any registered pool")]
    UnknownFrame { frame: PhysicalFrame },
    #[error("frame {frame} is {state}, not the head of an allocated sequence")]
    NotHeadOfSequence {
        frame: PhysicalFrame,
        state: FrameState,
    },
    #[error("bitmap entry of frame {frame} holds an invalid state code")]
    InvalidState { frame: PhysicalFrame },
    #[error("pool of {count} frames at {base} overlaps a registered pool")]
    OverlappingPool { base: PhysicalFrame, count: u64 },
    #[error("pool registry is full")]
    RegistryFull,
    #[error("no pool with index {index} is registered")]
    UnknownPool { index: usize },
}
