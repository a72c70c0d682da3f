//! # Physical Memory Window
//!
//! Frame pools keep their occupancy bitmaps *inside* physical frames. This
//! module provides the bounds-checked mapping from frame numbers to the bytes
//! backing them, so pools never turn `frame × FRAME_SIZE` into a pointer
//! themselves.
//!
//! ## Why is this needed?
//! - Rust code can only dereference virtual addresses, not physical ones.
//! - The mapping strategy differs between the kernel (direct map of physical
//!   memory at some virtual base) and host tools or tests (a plain buffer
//!   standing in for RAM).
//! - Several pools may keep bitmaps in the same window, and a pool's bitmap
//!   may live in a frame owned by another pool. Handing out byte [`Cell`]s
//!   lets them share the window without aliasing `&mut` borrows.
//!
//! ## Example
//! ```rust
//! use kernel_frames::PhysicalMemory;
//! use kernel_memory_addresses::{FRAME_SIZE, PhysicalFrame};
//!
//! let mut ram = vec![0u8; 16 * FRAME_SIZE as usize];
//! let memory = PhysicalMemory::new(PhysicalFrame::new(512), &mut ram);
//! assert_eq!(memory.frame_count(), 16);
//! assert!(memory.frames(PhysicalFrame::new(520), 2).is_some());
//! assert!(memory.frames(PhysicalFrame::new(527), 2).is_none());
//! ```

use core::cell::Cell;
use core::fmt;
use kernel_memory_addresses::{FRAME_SIZE, PhysicalFrame};

#[allow(clippy::cast_possible_truncation)]
const FRAME_BYTES: usize = FRAME_SIZE as usize;

/// A window of physical frames `[first, first + frame_count)` mapped into
/// the current address space.
///
/// The handles it returns are `!Sync`: frame pools built on top of a window
/// are confined to a single thread.
#[derive(Copy, Clone)]
pub struct PhysicalMemory<'m> {
    first: PhysicalFrame,
    bytes: &'m [Cell<u8>],
}

impl<'m> PhysicalMemory<'m> {
    /// Treat `bytes` as the physical frames starting at `first`.
    ///
    /// Trailing bytes that do not fill a whole frame are ignored.
    #[must_use]
    pub fn new(first: PhysicalFrame, bytes: &'m mut [u8]) -> Self {
        let whole = bytes.len() - bytes.len() % FRAME_BYTES;
        let (bytes, _) = bytes.split_at_mut(whole);
        Self {
            first,
            bytes: Cell::from_mut(bytes).as_slice_of_cells(),
        }
    }

    /// Map `frames` physical frames starting at `first` that are directly
    /// mapped at `virt_base`.
    ///
    /// Returns `None` if the window size does not fit the address space.
    ///
    /// # Safety
    /// - `virt_base` must point to `frames × FRAME_SIZE` bytes that are mapped,
    ///   readable and writable for `'m`, and that back exactly those frames.
    /// - Nothing else may hold a `&` or `&mut` reference into that range
    ///   during `'m`.
    #[must_use]
    pub unsafe fn from_direct_map(
        first: PhysicalFrame,
        frames: u64,
        virt_base: *mut u8,
    ) -> Option<Self> {
        let len = usize::try_from(frames).ok()?.checked_mul(FRAME_BYTES)?;
        if isize::try_from(len).is_err() {
            return None;
        }
        // SAFETY: Caller guarantees the range is mapped, exclusive and live for 'm;
        // Cell<u8> has the same layout as u8.
        let bytes = unsafe { core::slice::from_raw_parts(virt_base.cast::<Cell<u8>>(), len) };
        Some(Self { first, bytes })
    }

    /// First frame of the window.
    #[inline]
    #[must_use]
    pub const fn first_frame(&self) -> PhysicalFrame {
        self.first
    }

    /// Number of frames in the window.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        (self.bytes.len() / FRAME_BYTES) as u64
    }

    /// Whether `frame` lies inside the window.
    #[inline]
    #[must_use]
    pub const fn contains(&self, frame: PhysicalFrame) -> bool {
        match frame.checked_distance_from(self.first) {
            Some(offset) => offset < self.frame_count(),
            None => false,
        }
    }

    /// The bytes backing `count` frames starting at `first`, or `None` if any
    /// of them lies outside the window.
    #[must_use]
    pub fn frames(&self, first: PhysicalFrame, count: u64) -> Option<&'m [Cell<u8>]> {
        let start = first.checked_distance_from(self.first)?;
        let end = start.checked_add(count)?;
        if end > self.frame_count() {
            return None;
        }

        let start = usize::try_from(start).ok()?.checked_mul(FRAME_BYTES)?;
        let end = usize::try_from(end).ok()?.checked_mul(FRAME_BYTES)?;
        self.bytes.get(start..end)
    }
}

impl fmt::Debug for PhysicalMemory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicalMemory")
            .field("first", &self.first)
            .field("frames", &self.frame_count())
            .finish()
    }
}
