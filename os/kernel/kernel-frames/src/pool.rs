//! # Contiguous Frame Pool
//!
//! A [`ContFramePool`] owns the frame range `[base, base + count)` and hands
//! out physically contiguous runs of frames from it.
//!
//! ## Occupancy Tracking
//!
//! Each frame is [`Free`](FrameState::Free), the
//! [`HeadOfSequence`](FrameState::HeadOfSequence) of an allocated run, or
//! [`Used`](FrameState::Used) further into a run. Marking run heads is what
//! lets a release find the extent of a run from its first frame alone:
//!
//! ```text
//!  index   0   1   2   3   4   5   6   7   8
//!        +---+---+---+---+---+---+---+---+---+
//!        | H | U | U | F | H | H | U | F | F |
//!        +---+---+---+---+---+---+---+---+---+
//!          \_________/       |   \___/
//!           run of 3       run 1  run 2
//! ```
//!
//! ## Self-Hosting
//!
//! The bitmap describing a pool must itself live in some frame. A pool built
//! with [`InfoFrame::SelfHosted`] places it in its own first frame and then
//! allocates that frame from itself through the regular search: the freshly
//! cleared bitmap reports everything free, so the first run found starts at
//! `base`. Alternatively, [`InfoFrame::External`] keeps the bitmap in a frame
//! already allocated elsewhere, typically from another pool.

use crate::bitmap::FrameBitmap;
use crate::info::PoolInfo;
use crate::{FRAMES_PER_INFO_FRAME, FrameState, MAX_POOL_FRAMES, PhysicalMemory, PoolError};
use core::fmt;
use kernel_memory_addresses::PhysicalFrame;
use log::{debug, trace, warn};

/// Where a pool keeps its occupancy bitmap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InfoFrame {
    /// In the pool's own first frame(s), reserved from the pool itself.
    SelfHosted,
    /// Starting at the given frame, which the caller has already reserved.
    External(PhysicalFrame),
}

impl InfoFrame {
    /// Maps the numeric convention "frame `0` means self-hosted".
    #[must_use]
    pub const fn from_frame_number(number: u64) -> Self {
        if number == 0 {
            Self::SelfHosted
        } else {
            Self::External(PhysicalFrame::new(number))
        }
    }
}

/// An allocated run: a head frame and the frames following it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameRun {
    pub head: PhysicalFrame,
    pub len: u64,
}

impl FrameRun {
    /// First frame after the run.
    #[must_use]
    pub fn end(&self) -> PhysicalFrame {
        self.head + self.len
    }
}

/// Allocator for physically contiguous frame runs within one frame range.
pub struct ContFramePool<'m> {
    base: PhysicalFrame,
    count: u64,
    free_count: u64,
    info_frame: PhysicalFrame,
    bitmap: FrameBitmap<'m>,
}

impl<'m> ContFramePool<'m> {
    /// Info frames needed to describe `frames` frames.
    #[inline]
    #[must_use]
    pub const fn needed_info_frames(frames: u64) -> u64 {
        frames.div_ceil(FRAMES_PER_INFO_FRAME)
    }

    /// Creates a pool managing `[base, base + count)`.
    ///
    /// With [`InfoFrame::SelfHosted`] the bitmap occupies the pool's first
    /// frame, which is allocated as a run on return. With
    /// [`InfoFrame::External`] the bitmap is written to the given frame; if
    /// that frame lies inside the pool it is reserved as a run, otherwise it
    /// must already be reserved by its owner.
    ///
    /// # Errors
    /// - [`PoolError::EmptyPool`] / [`PoolError::CapacityExceeded`] if `count` is
    ///   zero or larger than [`MAX_POOL_FRAMES`]; no memory is touched.
    /// - [`PoolError::UnmappedInfoFrame`] if `memory` does not cover the bitmap.
    /// - [`PoolError::OutOfRange`] if `base + count` passes the last frame number
    ///   or an in-pool external bitmap runs past the pool.
    pub fn new(
        memory: &PhysicalMemory<'m>,
        base: PhysicalFrame,
        count: u64,
        info: InfoFrame,
    ) -> Result<Self, PoolError> {
        Self::check_geometry(base, count)?;

        let needed = Self::needed_info_frames(count);
        let info_frame = match info {
            InfoFrame::SelfHosted => base,
            InfoFrame::External(frame) => frame,
        };
        let bytes = memory
            .frames(info_frame, needed)
            .ok_or(PoolError::UnmappedInfoFrame { frame: info_frame })?;

        let bitmap = FrameBitmap::new(bytes);
        debug_assert!(bitmap.capacity() >= count);
        bitmap.clear(count);

        let mut pool = Self {
            base,
            count,
            free_count: count,
            info_frame,
            bitmap,
        };

        match info {
            InfoFrame::SelfHosted => {
                let head = pool.get_frames(needed)?;
                debug_assert_eq!(head, base);
            }
            InfoFrame::External(frame) if pool.contains(frame) => {
                pool.mark_inaccessible(frame, needed)?;
            }
            InfoFrame::External(_) => {}
        }

        debug!(
            "Initialized frame pool: frames {} to {} ({} frames), {} info frame(s) at {}",
            pool.base.number(),
            pool.last_frame().number(),
            pool.count,
            needed,
            pool.info_frame.number(),
        );
        Ok(pool)
    }

    /// Rejects pool shapes no bitmap can describe.
    pub(crate) const fn check_geometry(base: PhysicalFrame, count: u64) -> Result<(), PoolError> {
        if count == 0 {
            return Err(PoolError::EmptyPool);
        }
        if count > MAX_POOL_FRAMES {
            return Err(PoolError::CapacityExceeded {
                count,
                max: MAX_POOL_FRAMES,
            });
        }
        if base.number().checked_add(count).is_none() {
            return Err(PoolError::OutOfRange { frame: base });
        }
        Ok(())
    }

    /// First frame of the pool.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalFrame {
        self.base
    }

    /// Number of frames in the pool.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    #[must_use]
    pub const fn free_count(&self) -> u64 {
        self.free_count
    }

    #[inline]
    #[must_use]
    pub const fn used_count(&self) -> u64 {
        self.count - self.free_count
    }

    /// First frame holding this pool's bitmap.
    #[inline]
    #[must_use]
    pub const fn info_frame(&self) -> PhysicalFrame {
        self.info_frame
    }

    #[inline]
    #[must_use]
    pub const fn info_frame_count(&self) -> u64 {
        Self::needed_info_frames(self.count)
    }

    /// Last frame of the pool.
    #[inline]
    #[must_use]
    pub fn last_frame(&self) -> PhysicalFrame {
        self.base + (self.count - 1)
    }

    /// First frame after the pool.
    #[inline]
    #[must_use]
    pub fn end(&self) -> PhysicalFrame {
        self.base + self.count
    }

    /// Whether `frame` belongs to this pool.
    #[inline]
    #[must_use]
    pub const fn contains(&self, frame: PhysicalFrame) -> bool {
        self.index_of(frame).is_some()
    }

    /// Whether `[base, base + count)` shares a frame with this pool.
    #[must_use]
    pub const fn overlaps(&self, base: PhysicalFrame, count: u64) -> bool {
        spans_overlap(self.base, self.count, base, count)
    }

    /// Whether `[first, first + n)` shares a frame with this pool's bitmap.
    #[must_use]
    pub const fn overlaps_info_frames(&self, first: PhysicalFrame, n: u64) -> bool {
        spans_overlap(self.info_frame, self.info_frame_count(), first, n)
    }

    /// Snapshot for diagnostics.
    #[must_use]
    pub const fn info(&self) -> PoolInfo {
        PoolInfo {
            base: self.base,
            count: self.count,
            free: self.free_count,
            info_frame: self.info_frame,
            info_frames: self.info_frame_count(),
        }
    }

    /// State of `frame`.
    ///
    /// # Errors
    /// [`PoolError::OutOfRange`] if the frame is not in this pool,
    /// [`PoolError::InvalidState`] if its bitmap entry is corrupt.
    pub fn frame_state(&self, frame: PhysicalFrame) -> Result<FrameState, PoolError> {
        let index = self.index_of(frame).ok_or(PoolError::OutOfRange { frame })?;
        self.state_at(index)
    }

    /// Allocates `n` contiguous frames and returns the first one.
    ///
    /// First fit: the lowest run of `n` free frames is taken. The head frame
    /// becomes [`FrameState::HeadOfSequence`], the rest [`FrameState::Used`].
    ///
    /// # Errors
    /// - [`PoolError::EmptyRequest`] for `n == 0`.
    /// - [`PoolError::InsufficientFreeFrames`] if fewer than `n` frames are free.
    /// - [`PoolError::NoContiguousRegion`] if no free run is long enough.
    /// - [`PoolError::InvalidState`] if the scan reads a corrupt entry.
    ///
    /// Nothing is modified on error.
    pub fn get_frames(&mut self, n: u64) -> Result<PhysicalFrame, PoolError> {
        if n == 0 {
            return Err(PoolError::EmptyRequest);
        }
        if n > self.free_count || n > self.count {
            warn!(
                "Requested {n} frames from pool at {}, only {} free",
                self.base, self.free_count
            );
            return Err(PoolError::InsufficientFreeFrames {
                requested: n,
                free: self.free_count,
            });
        }

        let mut run_start = 0;
        let mut run_len = 0;
        for index in 0..self.count {
            if !self.state_at(index)?.is_free() {
                run_len = 0;
                continue;
            }

            if run_len == 0 {
                run_start = index;
            }
            run_len += 1;

            if run_len == n {
                self.mark_run(run_start, n);
                let head = self.base + run_start;
                trace!("Allocated {n} frame(s) at {head}, {} free", self.free_count);
                return Ok(head);
            }
        }

        warn!(
            "Unable to find {n} contiguous free frames in pool at {}",
            self.base
        );
        Err(PoolError::NoContiguousRegion { requested: n })
    }

    /// Reserves exactly `[first, first + n)` without searching.
    ///
    /// # Errors
    /// - [`PoolError::EmptyRequest`] for `n == 0`.
    /// - [`PoolError::OutOfRange`] if the range leaves the pool.
    /// - [`PoolError::InvalidReservationTarget`] naming the first frame that is not free.
    /// - [`PoolError::InvalidState`] if a corrupt entry is read.
    ///
    /// All frames are checked before any is marked; nothing is modified on error.
    pub fn mark_inaccessible(&mut self, first: PhysicalFrame, n: u64) -> Result<(), PoolError> {
        if n == 0 {
            return Err(PoolError::EmptyRequest);
        }
        let start = self
            .index_of(first)
            .ok_or(PoolError::OutOfRange { frame: first })?;
        let end = start
            .checked_add(n)
            .filter(|&end| end <= self.count)
            .ok_or(PoolError::OutOfRange { frame: self.end() })?;

        for index in start..end {
            if !self.state_at(index)?.is_free() {
                let frame = self.base + index;
                warn!("Cannot reserve {n} frame(s) at {first}: {frame} is not free");
                return Err(PoolError::InvalidReservationTarget { frame });
            }
        }

        self.mark_run(start, n);
        trace!(
            "Reserved {n} frame(s) at {first}, {} free",
            self.free_count
        );
        Ok(())
    }

    /// Releases the run whose head is `head` and returns its length.
    ///
    /// The run extends over every [`FrameState::Used`] frame following the
    /// head, up to the next free frame, the next head, or the pool boundary.
    ///
    /// # Errors
    /// - [`PoolError::OutOfRange`] if `head` is not in this pool.
    /// - [`PoolError::NotHeadOfSequence`] if `head` does not start a run.
    /// - [`PoolError::InvalidState`] if a corrupt entry is read.
    ///
    /// Nothing is modified on error.
    pub fn release_frames(&mut self, head: PhysicalFrame) -> Result<u64, PoolError> {
        let start = self
            .index_of(head)
            .ok_or(PoolError::OutOfRange { frame: head })?;

        let state = self.state_at(start)?;
        if state != FrameState::HeadOfSequence {
            warn!("Refusing to release {head}: frame is {state}");
            return Err(PoolError::NotHeadOfSequence { frame: head, state });
        }

        let len = self.run_length(start)?;
        for index in start..start + len {
            self.bitmap.set_state(index, FrameState::Free);
        }
        self.free_count += len;

        trace!(
            "Released {len} frame(s) at {head}, {} free",
            self.free_count
        );
        Ok(len)
    }

    /// Allocated runs in ascending frame order.
    ///
    /// Yields [`PoolError::InvalidState`] and stops if the bitmap is corrupt,
    /// including a [`FrameState::Used`] frame without a preceding head.
    pub fn allocated_runs(&self) -> AllocatedRuns<'_, 'm> {
        AllocatedRuns {
            pool: self,
            next: 0,
            failed: false,
        }
    }

    /// Pool-relative index of `frame`.
    #[inline]
    const fn index_of(&self, frame: PhysicalFrame) -> Option<u64> {
        match frame.checked_distance_from(self.base) {
            Some(index) if index < self.count => Some(index),
            _ => None,
        }
    }

    #[inline]
    fn state_at(&self, index: u64) -> Result<FrameState, PoolError> {
        self.bitmap.state(index).ok_or(PoolError::InvalidState {
            frame: self.base + index,
        })
    }

    /// Length of the run headed at `start` (head included).
    fn run_length(&self, start: u64) -> Result<u64, PoolError> {
        let mut len = 1;
        while start + len < self.count && self.state_at(start + len)? == FrameState::Used {
            len += 1;
        }
        Ok(len)
    }

    /// Marks `[start, start + n)` as one run. Frames must be free.
    fn mark_run(&mut self, start: u64, n: u64) {
        self.bitmap.set_state(start, FrameState::HeadOfSequence);
        for index in start + 1..start + n {
            self.bitmap.set_state(index, FrameState::Used);
        }
        self.free_count -= n;
    }
}

/// Whether `[a, a + a_len)` and `[b, b + b_len)` intersect, without computing
/// either end.
const fn spans_overlap(a: PhysicalFrame, a_len: u64, b: PhysicalFrame, b_len: u64) -> bool {
    a_len > 0 && b_len > 0 && starts_within(a, b, b_len) && starts_within(b, a, a_len)
}

/// Whether `frame < start + len`.
const fn starts_within(frame: PhysicalFrame, start: PhysicalFrame, len: u64) -> bool {
    match frame.checked_distance_from(start) {
        Some(distance) => distance < len,
        None => true,
    }
}

impl fmt::Debug for ContFramePool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContFramePool")
            .field("base", &self.base)
            .field("count", &self.count)
            .field("free_count", &self.free_count)
            .field("info_frame", &self.info_frame)
            .finish_non_exhaustive()
    }
}

/// Iterator over the allocated runs of a pool. See [`ContFramePool::allocated_runs`].
pub struct AllocatedRuns<'p, 'm> {
    pool: &'p ContFramePool<'m>,
    next: u64,
    failed: bool,
}

impl Iterator for AllocatedRuns<'_, '_> {
    type Item = Result<FrameRun, PoolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while self.next < self.pool.count {
            let index = self.next;
            let state = match self.pool.state_at(index) {
                Ok(state) => state,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            match state {
                FrameState::Free => self.next += 1,
                FrameState::Used => {
                    self.failed = true;
                    return Some(Err(PoolError::InvalidState {
                        frame: self.pool.base + index,
                    }));
                }
                FrameState::HeadOfSequence => {
                    let len = match self.pool.run_length(index) {
                        Ok(len) => len,
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    };
                    self.next = index + len;
                    return Some(Ok(FrameRun {
                        head: self.pool.base + index,
                        len,
                    }));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_memory_addresses::FRAME_SIZE;

    fn ram(frames: u64) -> Vec<u8> {
        vec![0; usize::try_from(frames * FRAME_SIZE).unwrap()]
    }

    fn states(pool: &ContFramePool<'_>, first: u64, n: u64) -> Vec<FrameState> {
        (first..first + n)
            .map(|f| pool.frame_state(PhysicalFrame::new(f)).unwrap())
            .collect()
    }

    #[test]
    fn info_frames_round_up() {
        assert_eq!(ContFramePool::needed_info_frames(1), 1);
        assert_eq!(ContFramePool::needed_info_frames(FRAMES_PER_INFO_FRAME), 1);
        assert_eq!(ContFramePool::needed_info_frames(FRAMES_PER_INFO_FRAME + 1), 2);
    }

    #[test]
    fn frame_number_zero_means_self_hosted() {
        assert_eq!(InfoFrame::from_frame_number(0), InfoFrame::SelfHosted);
        assert_eq!(
            InfoFrame::from_frame_number(513),
            InfoFrame::External(PhysicalFrame::new(513))
        );
    }

    #[test]
    fn self_hosted_pool_reserves_its_first_frame() {
        let mut ram = ram(64);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let pool = ContFramePool::new(&memory, PhysicalFrame::new(8), 32, InfoFrame::SelfHosted)
            .unwrap();

        assert_eq!(pool.info_frame(), PhysicalFrame::new(8));
        assert_eq!(pool.free_count(), 31);
        assert_eq!(
            pool.frame_state(PhysicalFrame::new(8)).unwrap(),
            FrameState::HeadOfSequence
        );
        assert_eq!(
            pool.frame_state(PhysicalFrame::new(9)).unwrap(),
            FrameState::Free
        );
    }

    #[test]
    fn bitmap_is_stored_in_the_info_frame() {
        let mut ram = ram(4);
        {
            let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
            let mut pool =
                ContFramePool::new(&memory, PhysicalFrame::new(0), 4, InfoFrame::SelfHosted)
                    .unwrap();
            pool.get_frames(2).unwrap();
        }
        // frame 0: head (info), frame 1: head, frame 2: used, frame 3: free
        assert_eq!(ram[0], 0b00_01_10_10);
    }

    #[test]
    fn allocation_is_first_fit() {
        let mut ram = ram(32);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 32, InfoFrame::SelfHosted).unwrap();

        let a = pool.get_frames(3).unwrap();
        let b = pool.get_frames(2).unwrap();
        assert_eq!(a, PhysicalFrame::new(1));
        assert_eq!(b, PhysicalFrame::new(4));

        assert_eq!(pool.release_frames(a).unwrap(), 3);
        // the hole left by `a` is too short for 4 frames
        assert_eq!(pool.get_frames(4).unwrap(), PhysicalFrame::new(6));
        assert_eq!(pool.get_frames(3).unwrap(), PhysicalFrame::new(1));
    }

    #[test]
    fn runs_are_head_followed_by_used() {
        let mut ram = ram(16);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 16, InfoFrame::SelfHosted).unwrap();

        let head = pool.get_frames(4).unwrap();
        assert_eq!(
            states(&pool, head.number(), 5),
            [
                FrameState::HeadOfSequence,
                FrameState::Used,
                FrameState::Used,
                FrameState::Used,
                FrameState::Free,
            ]
        );
    }

    #[test]
    fn release_stops_at_the_next_head() {
        let mut ram = ram(16);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 16, InfoFrame::SelfHosted).unwrap();

        let a = pool.get_frames(2).unwrap();
        let b = pool.get_frames(3).unwrap();
        assert_eq!(b, a + 2);

        assert_eq!(pool.release_frames(a).unwrap(), 2);
        assert_eq!(
            pool.frame_state(b).unwrap(),
            FrameState::HeadOfSequence,
            "neighbouring run must survive"
        );
        assert_eq!(pool.free_count(), 16 - 1 - 3);
    }

    #[test]
    fn release_stops_at_the_pool_boundary() {
        let mut ram = ram(8);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 8, InfoFrame::SelfHosted).unwrap();

        let head = pool.get_frames(7).unwrap();
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.release_frames(head).unwrap(), 7);
        assert_eq!(pool.free_count(), 7);
    }

    #[test]
    fn release_rejects_interior_and_free_frames() {
        let mut ram = ram(16);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 16, InfoFrame::SelfHosted).unwrap();
        let head = pool.get_frames(3).unwrap();

        assert_eq!(
            pool.release_frames(head + 1),
            Err(PoolError::NotHeadOfSequence {
                frame: head + 1,
                state: FrameState::Used
            })
        );
        assert_eq!(
            pool.release_frames(head + 5),
            Err(PoolError::NotHeadOfSequence {
                frame: head + 5,
                state: FrameState::Free
            })
        );

        pool.release_frames(head).unwrap();
        assert!(matches!(
            pool.release_frames(head),
            Err(PoolError::NotHeadOfSequence { .. })
        ));
    }

    #[test]
    fn mark_inaccessible_reserves_exact_range() {
        let mut ram = ram(32);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 32, InfoFrame::SelfHosted).unwrap();

        pool.mark_inaccessible(PhysicalFrame::new(10), 4).unwrap();
        assert_eq!(pool.free_count(), 32 - 1 - 4);
        assert_eq!(
            states(&pool, 9, 6),
            [
                FrameState::Free,
                FrameState::HeadOfSequence,
                FrameState::Used,
                FrameState::Used,
                FrameState::Used,
                FrameState::Free,
            ]
        );
    }

    #[test]
    fn failed_reservation_changes_nothing() {
        let mut ram = ram(32);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 32, InfoFrame::SelfHosted).unwrap();
        pool.mark_inaccessible(PhysicalFrame::new(12), 2).unwrap();
        let free = pool.free_count();

        assert_eq!(
            pool.mark_inaccessible(PhysicalFrame::new(10), 4),
            Err(PoolError::InvalidReservationTarget {
                frame: PhysicalFrame::new(12)
            })
        );
        assert_eq!(
            pool.mark_inaccessible(PhysicalFrame::new(30), 4),
            Err(PoolError::OutOfRange {
                frame: PhysicalFrame::new(32)
            })
        );
        assert_eq!(
            pool.mark_inaccessible(PhysicalFrame::new(40), 1),
            Err(PoolError::OutOfRange {
                frame: PhysicalFrame::new(40)
            })
        );
        assert_eq!(pool.free_count(), free);
        assert_eq!(states(&pool, 10, 2), [FrameState::Free, FrameState::Free]);
    }

    #[test]
    fn zero_length_requests_are_rejected() {
        let mut ram = ram(8);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 8, InfoFrame::SelfHosted).unwrap();
        assert_eq!(pool.get_frames(0), Err(PoolError::EmptyRequest));
        assert_eq!(
            pool.mark_inaccessible(PhysicalFrame::new(2), 0),
            Err(PoolError::EmptyRequest)
        );
    }

    #[test]
    fn capacity_and_mapping_are_checked() {
        let mut ram = ram(4);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);

        assert_eq!(
            ContFramePool::new(&memory, PhysicalFrame::new(0), 0, InfoFrame::SelfHosted).err(),
            Some(PoolError::EmptyPool)
        );
        assert_eq!(
            ContFramePool::new(
                &memory,
                PhysicalFrame::new(0),
                MAX_POOL_FRAMES + 1,
                InfoFrame::SelfHosted
            )
            .err(),
            Some(PoolError::CapacityExceeded {
                count: MAX_POOL_FRAMES + 1,
                max: MAX_POOL_FRAMES
            })
        );
        assert_eq!(
            ContFramePool::new(&memory, PhysicalFrame::new(100), 8, InfoFrame::SelfHosted).err(),
            Some(PoolError::UnmappedInfoFrame {
                frame: PhysicalFrame::new(100)
            })
        );
    }

    #[test]
    fn pools_may_not_wrap_the_frame_space() {
        let mut ram = ram(1);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let base = PhysicalFrame::new(u64::MAX - 1);

        assert_eq!(
            ContFramePool::new(&memory, base, 4, InfoFrame::External(PhysicalFrame::new(0))).err(),
            Some(PoolError::OutOfRange { frame: base })
        );
    }

    #[test]
    fn overlap_checks_do_not_overflow() {
        let mut ram = ram(8);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 8, InfoFrame::SelfHosted).unwrap();

        assert!(pool.overlaps(PhysicalFrame::new(7), u64::MAX));
        assert!(!pool.overlaps(PhysicalFrame::new(8), u64::MAX));
        assert!(!pool.overlaps(PhysicalFrame::new(u64::MAX), u64::MAX));
        assert!(pool.overlaps_info_frames(PhysicalFrame::new(0), 1));
        assert!(!pool.overlaps_info_frames(PhysicalFrame::new(1), 3));
    }

    #[test]
    fn external_info_frame_inside_the_pool_is_reserved_as_a_run() {
        let mut ram = ram(16);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let pool = ContFramePool::new(
            &memory,
            PhysicalFrame::new(0),
            16,
            InfoFrame::External(PhysicalFrame::new(5)),
        )
        .unwrap();

        assert_eq!(pool.info_frame(), PhysicalFrame::new(5));
        assert_eq!(pool.free_count(), 15);
        assert_eq!(
            pool.frame_state(PhysicalFrame::new(5)).unwrap(),
            FrameState::HeadOfSequence
        );
        assert_eq!(
            pool.frame_state(PhysicalFrame::new(0)).unwrap(),
            FrameState::Free
        );
    }

    #[test]
    fn external_info_frame_outside_the_pool_leaves_it_untouched() {
        let mut ram = ram(32);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let pool = ContFramePool::new(
            &memory,
            PhysicalFrame::new(16),
            16,
            InfoFrame::External(PhysicalFrame::new(2)),
        )
        .unwrap();

        assert_eq!(pool.free_count(), 16);
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.allocated_runs().count(), 0);
    }

    #[test]
    fn allocated_runs_lists_every_run() {
        let mut ram = ram(16);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 16, InfoFrame::SelfHosted).unwrap();
        pool.get_frames(1).unwrap();
        pool.mark_inaccessible(PhysicalFrame::new(10), 6).unwrap();

        let runs: Vec<_> = pool.allocated_runs().map(Result::unwrap).collect();
        assert_eq!(
            runs,
            [
                FrameRun {
                    head: PhysicalFrame::new(0),
                    len: 1
                },
                FrameRun {
                    head: PhysicalFrame::new(1),
                    len: 1
                },
                FrameRun {
                    head: PhysicalFrame::new(10),
                    len: 6
                },
            ]
        );
        assert_eq!(runs[2].end(), pool.end());
    }

    #[test]
    fn corrupt_entries_are_reported() {
        let mut ram = ram(4);
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut pool =
            ContFramePool::new(&memory, PhysicalFrame::new(0), 8, InfoFrame::SelfHosted).unwrap();

        // frame 2 gets the unused code 0b11
        let bitmap = memory.frames(PhysicalFrame::new(0), 1).unwrap();
        bitmap[0].set(bitmap[0].get() | 0b11 << 4);

        let invalid = PoolError::InvalidState {
            frame: PhysicalFrame::new(2),
        };
        assert_eq!(pool.frame_state(PhysicalFrame::new(2)), Err(invalid));
        assert_eq!(pool.get_frames(3), Err(invalid));
        assert_eq!(pool.free_count(), 7);
        assert_eq!(pool.allocated_runs().nth(1), Some(Err(invalid)));
    }
}
