//! # Machine Memory Layout
//!
//! This crate is the single source of truth for the physical memory layout the
//! frame pools are brought up with. The boot entry (or the host demo standing
//! in for it) reads these constants to decide which frame ranges become pools,
//! where their management information lives, and which ranges must never be
//! handed out.
//!
//! ## Physical Memory Layout
//!
//! ```text
//! Physical Address Space (frames of 4 KiB):
//!
//! 0x0000_0000 ┌─────────────────────────────────┐ frame 0
//!             │  Firmware, BIOS, kernel image   │
//! 0x0020_0000 ├─────────────────────────────────┤ KERNEL_POOL_START (frame 512)
//!             │  Kernel frame pool (2 MiB)      │
//!             │  bitmap self-hosted in frame 512│
//! 0x0040_0000 ├─────────────────────────────────┤ PROCESS_POOL_START (frame 1024)
//!             │  Process frame pool (28 MiB)    │
//!             │  bitmap hosted by kernel pool   │
//! 0x00F0_0000 │  ┌───────────────────────────┐  │ MEM_HOLE_START (frame 3840)
//!             │  │ Memory hole (1 MiB, ISA)  │  │
//! 0x0100_0000 │  └───────────────────────────┘  │
//! 0x0200_0000 └─────────────────────────────────┘ frame 8192
//! ```
//!
//! The memory hole lies inside the process pool and is reserved with
//! `mark_inaccessible` right after the pool is created.
//!
//! ## Compile-Time Validation
//!
//! The layout is checked at compile time: pools must not overlap and the hole
//! must lie within the process pool. Whether each pool fits the bitmap
//! capacity of a frame pool is asserted where the pools are brought up,
//! against `kernel_frames::MAX_POOL_FRAMES`.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod memory;
