use crate::{FRAME_SHIFT, PhysicalAddress};
use core::fmt;
use core::ops::{Add, AddAssign, Sub};

/// Physical frame number.
///
/// A `PhysicalFrame` identifies the frame covering the physical byte range
/// `[n × FRAME_SIZE, (n + 1) × FRAME_SIZE)`. It carries no state of its own;
/// occupancy is tracked by the frame pools.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let frame = PhysicalFrame::new(1024);
/// assert_eq!(frame.start_address().as_u64(), 4 * 1024 * 1024);
/// assert_eq!(PhysicalFrame::containing_address(PhysicalAddress::new(0x0040_0FFF)), frame);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalFrame(u64);

impl PhysicalFrame {
    #[inline]
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// The frame number.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u64 {
        self.0
    }

    /// Frame containing `addr` (rounds down).
    #[inline]
    #[must_use]
    pub const fn containing_address(addr: PhysicalAddress) -> Self {
        Self(addr.as_u64() >> FRAME_SHIFT)
    }

    /// Physical address of the first byte of this frame.
    #[inline]
    #[must_use]
    pub const fn start_address(self) -> PhysicalAddress {
        PhysicalAddress::new(self.0 << FRAME_SHIFT)
    }

    /// Number of frames from `earlier` up to `self`, or `None` if `earlier` lies after `self`.
    #[inline]
    #[must_use]
    pub const fn checked_distance_from(self, earlier: Self) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl fmt::Debug for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalFrame({} @ {})", self.0, self.start_address())
    }
}

impl fmt::Display for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PhysicalFrame {
    #[inline]
    fn from(number: u64) -> Self {
        Self::new(number)
    }
}

impl Add<u64> for PhysicalFrame {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for PhysicalFrame {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

/// Distance in frames; panics on underflow like integer subtraction.
impl Sub for PhysicalFrame {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}
