//! # Physical Addresses and Frame Numbers
//!
//! Strongly typed wrappers for physical byte addresses and physical frame
//! numbers used by the frame allocator.
//!
//! ## Overview
//!
//! Physical memory is managed in fixed-size frames of [`FRAME_SIZE`] bytes.
//! A frame is identified solely by its index into the physical address space;
//! the frame's first byte lives at `index × FRAME_SIZE`.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical byte address. |
//! | [`PhysicalFrame`] | A frame number; converts to and from [`PhysicalAddress`]. |
//!
//! Both types are `#[repr(transparent)]` wrappers around `u64` and implement
//! `Copy`, `Eq`, `Ord`, and `Hash`, so they can be compared, sorted and used
//! as keys without unwrapping.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x0020_0042);
//! let frame = pa.frame();
//! assert_eq!(frame.number(), 512);
//! assert_eq!(frame.start_address().as_u64(), 0x0020_0000);
//! assert_eq!((frame + 1).start_address().as_u64(), 0x0020_1000);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod physical_address;
mod physical_frame;

pub use physical_address::PhysicalAddress;
pub use physical_frame::PhysicalFrame;

/// Size of a physical frame in bytes (power of two).
pub const FRAME_SIZE: u64 = 4096;

/// `log2(FRAME_SIZE)`, i.e., the number of low address bits addressing bytes within a frame.
pub const FRAME_SHIFT: u32 = 12;

const _: () = {
    assert!(FRAME_SIZE.is_power_of_two());
    assert!(1u64 << FRAME_SHIFT == FRAME_SIZE);
};
