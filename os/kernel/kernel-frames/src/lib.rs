//! # Contiguous Physical Frame Allocation
//!
//! This crate manages physical memory in units of 4 KiB frames and hands out
//! runs of *physically contiguous* frames, as needed for DMA buffers, page
//! table arrays or kernel stacks that must not be scattered.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Pool Registry                      │
//! │    • Pools in arrival order, disjoint ranges        │
//! │    • Owner lookup for pool-agnostic release         │
//! │    • Diagnostics for every pool                     │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │             Contiguous Frame Pool                   │
//! │    • First-fit search for runs of n frames          │
//! │    • Exact-range reservation of holes               │
//! │    • Head-of-sequence tracking for release          │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │        Frame Bitmap in Physical Memory              │
//! │    • Two bits per frame, four frames per byte       │
//! │    • Stored inside the pool's info frame(s)         │
//! │    • Reached through a bounds-checked window        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Frame Pools ([`pool`])
//!
//! A [`ContFramePool`] owns `[base, base + count)`. Its bitmap needs one
//! info frame per [`FRAMES_PER_INFO_FRAME`] frames and either lives in the
//! pool itself ([`InfoFrame::SelfHosted`]) or in a frame reserved elsewhere
//! ([`InfoFrame::External`]). A self-hosted pool can be brought up before
//! any other allocator exists.
//!
//! ### Registry ([`registry`])
//!
//! The [`PoolRegistry`] owns all pools and resolves which one a frame belongs
//! to, so a run can be released given nothing but its first frame.
//!
//! ### Physical Memory Window ([`phys_mapper`])
//!
//! [`PhysicalMemory`] maps frame numbers to the bytes backing them. In the
//! kernel it wraps a direct map; on the host it wraps a plain buffer.
//!
//! ## Usage
//! ```rust
//! use kernel_frames::{ContFramePool, FrameState, InfoFrame, PhysicalMemory, PoolRegistry};
//! use kernel_memory_addresses::{FRAME_SIZE, PhysicalFrame};
//!
//! let mut ram = vec![0u8; 1024 * FRAME_SIZE as usize];
//! let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
//! let mut registry = PoolRegistry::new();
//!
//! // Bootstrap pool keeping its bitmap in frame 0.
//! let kernel = registry
//!     .create_pool(&memory, PhysicalFrame::new(0), 256, InfoFrame::SelfHosted)
//!     .unwrap();
//!
//! // Second pool whose bitmap lives in a frame taken from the first.
//! let needed = ContFramePool::needed_info_frames(768);
//! let info = registry.get_frames(kernel, needed).unwrap();
//! let process = registry
//!     .create_pool(&memory, PhysicalFrame::new(256), 768, InfoFrame::External(info))
//!     .unwrap();
//!
//! let run = registry.get_frames(process, 8).unwrap();
//! assert_eq!(registry.frame_state(run).unwrap(), FrameState::HeadOfSequence);
//! assert_eq!(registry.release_frames(run).unwrap(), 8);
//! ```
//!
//! ## Concurrency
//!
//! Pools and the registry are single-threaded: the bitmap is reached
//! through [`Cell`](core::cell::Cell)s, so none of these types is `Sync`.
//! Callers sharing them across CPUs wrap the registry in a lock.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod bitmap;
mod error;
mod frame_state;
mod info;
pub mod phys_mapper;
pub mod pool;
pub mod registry;

pub use error::PoolError;
pub use frame_state::FrameState;
pub use info::PoolInfo;
pub use phys_mapper::PhysicalMemory;
pub use pool::{AllocatedRuns, ContFramePool, FrameRun, InfoFrame};
pub use registry::{PoolId, PoolRegistry};

use kernel_memory_addresses::FRAME_SIZE;

/// Frames whose states fit into a single info frame.
pub const FRAMES_PER_INFO_FRAME: u64 = FRAME_SIZE * bitmap::FrameBitmap::FRAMES_PER_BYTE;

/// Largest pool a [`ContFramePool`] manages.
///
/// Bounded to what one info frame describes (16384 frames, 64 MiB).
pub const MAX_POOL_FRAMES: u64 = FRAMES_PER_INFO_FRAME;

/// Number of pools a [`PoolRegistry`] holds.
pub const MAX_POOLS: usize = 8;

const _: () = assert!(FRAMES_PER_INFO_FRAME == 16_384);
const _: () = assert!(MAX_POOL_FRAMES <= FRAMES_PER_INFO_FRAME);
