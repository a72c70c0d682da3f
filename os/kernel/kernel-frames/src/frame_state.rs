//! Tri-state frame occupancy and its 2-bit encoding.

use core::fmt;

/// Occupancy state of a single frame.
///
/// Every allocated run is one [`HeadOfSequence`](Self::HeadOfSequence) frame
/// followed by zero or more [`Used`](Self::Used) frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Available for allocation.
    Free,
    /// Allocated, but not the first frame of its run.
    Used,
    /// First frame of an allocated run.
    HeadOfSequence,
}

impl FrameState {
    /// Bits per encoded state.
    pub(crate) const BITS: u32 = 2;

    /// Mask selecting one encoded state.
    pub(crate) const MASK: u8 = 0b11;

    /// Bitmap code; `0b11` is never produced.
    #[inline]
    #[must_use]
    pub(crate) const fn code(self) -> u8 {
        match self {
            Self::Free => 0b00,
            Self::Used => 0b01,
            Self::HeadOfSequence => 0b10,
        }
    }

    /// Decodes the low two bits of `code`. Returns `None` for the unused code `0b11`.
    #[inline]
    #[must_use]
    pub(crate) const fn from_code(code: u8) -> Option<Self> {
        match code & Self::MASK {
            0b00 => Some(Self::Free),
            0b01 => Some(Self::Used),
            0b10 => Some(Self::HeadOfSequence),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }

    #[inline]
    #[must_use]
    pub const fn is_allocated(self) -> bool {
        !self.is_free()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Used => "used",
            Self::HeadOfSequence => "head-of-sequence",
        }
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
