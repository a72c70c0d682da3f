//! # Pool Registry
//!
//! Frames are released by number alone: whoever frees a run does not
//! necessarily know which pool it came from. The [`PoolRegistry`] records
//! every pool in arrival order and resolves the owner of a frame by range
//! containment, which is what makes [`PoolRegistry::release_frames`] work
//! without a pool handle.
//!
//! The registry is an explicit object owned by whoever brings up memory
//! management. It is append-only and has a fixed number of slots, so it
//! needs no heap.
//!
//! ## Example
//! ```rust
//! use kernel_frames::{InfoFrame, PhysicalMemory, PoolRegistry};
//! use kernel_memory_addresses::{FRAME_SIZE, PhysicalFrame};
//!
//! let mut ram = vec![0u8; 200 * FRAME_SIZE as usize];
//! let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
//!
//! let mut registry = PoolRegistry::new();
//! let low = registry
//!     .create_pool(&memory, PhysicalFrame::new(0), 100, InfoFrame::SelfHosted)
//!     .unwrap();
//! let high = registry
//!     .create_pool(&memory, PhysicalFrame::new(100), 100, InfoFrame::SelfHosted)
//!     .unwrap();
//!
//! let run = registry.get_frames(high, 4).unwrap();
//! assert_eq!(registry.owner_of(run), Some(high));
//! assert_eq!(registry.release_frames(run).unwrap(), 4);
//! # let _ = low;
//! ```

use crate::{ContFramePool, FrameState, InfoFrame, MAX_POOLS, PhysicalMemory, PoolError};
use core::fmt;
use kernel_console::Console;
use kernel_memory_addresses::PhysicalFrame;
use log::{debug, warn};

/// Position of a pool in its registry (arrival order, starting at 0).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(usize);

impl PoolId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool[{}]", self.0)
    }
}

/// Append-only set of frame pools with pairwise disjoint frame ranges.
pub struct PoolRegistry<'m> {
    pools: [Option<ContFramePool<'m>>; MAX_POOLS],
    len: usize,
}

impl<'m> PoolRegistry<'m> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pools: [const { None }; MAX_POOLS],
            len: 0,
        }
    }

    /// Number of registered pools.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends an already constructed pool.
    ///
    /// # Errors
    /// [`PoolError::OverlappingPool`] if the pool shares frames with a
    /// registered one, [`PoolError::RegistryFull`] if all slots are taken.
    pub fn register(&mut self, pool: ContFramePool<'m>) -> Result<PoolId, PoolError> {
        self.check_admissible(pool.base(), pool.count())?;

        let id = PoolId(self.len);
        debug!(
            "Registered {id}: frames {} to {}",
            pool.base().number(),
            pool.last_frame().number()
        );
        self.pools[self.len] = Some(pool);
        self.len += 1;
        Ok(id)
    }

    /// Constructs a pool (see [`ContFramePool::new`]) and registers it.
    ///
    /// Registration constraints are checked before the bitmap is written. The
    /// new bitmap may not share a frame with the bitmap of a registered pool,
    /// and an external info frame outside the new pool must be allocated in a
    /// registered pool, so the bitmap cannot land on frames that are still up
    /// for grabs.
    ///
    /// # Errors
    /// Everything [`register`](Self::register) and [`ContFramePool::new`]
    /// report, plus [`PoolError::InfoFrameInUse`] and
    /// [`PoolError::InfoFrameNotAllocated`].
    pub fn create_pool(
        &mut self,
        memory: &PhysicalMemory<'m>,
        base: PhysicalFrame,
        count: u64,
        info: InfoFrame,
    ) -> Result<PoolId, PoolError> {
        ContFramePool::check_geometry(base, count)?;
        self.check_admissible(base, count)?;

        let needed = ContFramePool::needed_info_frames(count);
        let info_frame = match info {
            InfoFrame::SelfHosted => base,
            InfoFrame::External(frame) => frame,
        };
        if let Some((id, _)) = self
            .iter()
            .find(|(_, pool)| pool.overlaps_info_frames(info_frame, needed))
        {
            warn!("Info frame {info_frame} for pool at {base} holds the bitmap of {id}");
            return Err(PoolError::InfoFrameInUse { frame: info_frame });
        }

        if let InfoFrame::External(frame) = info {
            let inside = frame.checked_distance_from(base).is_some_and(|i| i < count);
            if !inside
                && let Some(frame) = (0..needed)
                    .map_while(|offset| frame.number().checked_add(offset).map(PhysicalFrame::new))
                    .find(|&f| !self.frame_state(f).is_ok_and(FrameState::is_allocated))
            {
                warn!("Info frame {frame} for pool at {base} is not allocated");
                return Err(PoolError::InfoFrameNotAllocated { frame });
            }
        }

        let pool = ContFramePool::new(memory, base, count, info)?;
        self.register(pool)
    }

    /// The pool registered as `id`.
    #[must_use]
    pub fn pool(&self, id: PoolId) -> Option<&ContFramePool<'m>> {
        self.pools.get(id.0)?.as_ref()
    }

    /// The pool registered as `id`, mutably.
    #[must_use]
    pub fn pool_mut(&mut self, id: PoolId) -> Option<&mut ContFramePool<'m>> {
        self.pools.get_mut(id.0)?.as_mut()
    }

    /// Registered pools in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &ContFramePool<'m>)> {
        self.pools[..self.len]
            .iter()
            .enumerate()
            .filter_map(|(index, pool)| pool.as_ref().map(|pool| (PoolId(index), pool)))
    }

    /// The first registered pool containing `frame`.
    #[must_use]
    pub fn owner_of(&self, frame: PhysicalFrame) -> Option<PoolId> {
        self.iter()
            .find(|(_, pool)| pool.contains(frame))
            .map(|(id, _)| id)
    }

    /// State of any registered frame.
    ///
    /// # Errors
    /// [`PoolError::UnknownFrame`] if no pool owns the frame,
    /// [`PoolError::InvalidState`] if its bitmap entry is corrupt.
    pub fn frame_state(&self, frame: PhysicalFrame) -> Result<FrameState, PoolError> {
        self.owner(frame)?.frame_state(frame)
    }

    /// Allocates `n` contiguous frames from the pool `id`.
    ///
    /// # Errors
    /// [`PoolError::UnknownPool`] for a foreign id, otherwise as
    /// [`ContFramePool::get_frames`].
    pub fn get_frames(&mut self, id: PoolId, n: u64) -> Result<PhysicalFrame, PoolError> {
        self.pool_mut(id)
            .ok_or(PoolError::UnknownPool { index: id.0 })?
            .get_frames(n)
    }

    /// Releases the run headed by `first_frame` in whichever pool owns it and
    /// returns the number of frames freed.
    ///
    /// # Errors
    /// [`PoolError::UnknownFrame`] if no pool owns the frame, otherwise as
    /// [`ContFramePool::release_frames`].
    pub fn release_frames(&mut self, first_frame: PhysicalFrame) -> Result<u64, PoolError> {
        let Some(id) = self.owner_of(first_frame) else {
            warn!("Frame pool not found for frame {first_frame}");
            return Err(PoolError::UnknownFrame { frame: first_frame });
        };

        self.pool_mut(id)
            .ok_or(PoolError::UnknownFrame { frame: first_frame })?
            .release_frames(first_frame)
    }

    /// Writes a report of every registered pool to `console`.
    pub fn print_pool_info<C: Console + ?Sized>(&self, console: &mut C) {
        console.puts("\nPrinting Pool Info...\n");
        for (id, pool) in self.iter() {
            pool.info().print(id.0 + 1, console);
        }
        console.puts("\n");
    }

    fn owner(&self, frame: PhysicalFrame) -> Result<&ContFramePool<'m>, PoolError> {
        self.iter()
            .map(|(_, pool)| pool)
            .find(|pool| pool.contains(frame))
            .ok_or(PoolError::UnknownFrame { frame })
    }

    fn check_admissible(&self, base: PhysicalFrame, count: u64) -> Result<(), PoolError> {
        if self.iter().any(|(_, pool)| pool.overlaps(base, count)) {
            warn!("Pool of {count} frames at {base} overlaps a registered pool");
            return Err(PoolError::OverlappingPool { base, count });
        }
        if self.len == MAX_POOLS {
            return Err(PoolError::RegistryFull);
        }
        Ok(())
    }
}

impl Default for PoolRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, pool)| pool))
            .finish()
    }
}
