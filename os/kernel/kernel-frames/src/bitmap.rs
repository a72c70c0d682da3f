use crate::FrameState;
use core::cell::Cell;

/// Packed occupancy bitmap: two bits per frame, four frames per byte.
///
/// For pool-relative index `i`, the state lives in byte `i / 4` at bit
/// offset `(i % 4) * 2`:
///
/// ```text
///   bit  7 6   5 4   3 2   1 0
///      +-----+-----+-----+-----+
///      | i+3 | i+2 | i+1 |  i  |   (i a multiple of 4)
///      +-----+-----+-----+-----+
/// ```
///
/// The bytes live in physical memory (the pool's info frame) and are shared
/// through [`Cell`]s, so writing one entry never disturbs the other three
/// frames of the same byte or any other holder of the memory window.
pub(crate) struct FrameBitmap<'m> {
    bytes: &'m [Cell<u8>],
}

impl<'m> FrameBitmap<'m> {
    /// Frames described by one bitmap byte.
    pub(crate) const FRAMES_PER_BYTE: u64 = 8 / FrameState::BITS as u64;

    pub(crate) const fn new(bytes: &'m [Cell<u8>]) -> Self {
        Self { bytes }
    }

    /// Bitmap bytes needed to describe `frames` frames.
    #[inline]
    pub(crate) const fn bytes_for(frames: u64) -> u64 {
        frames.div_ceil(Self::FRAMES_PER_BYTE)
    }

    /// Number of frames this bitmap can describe.
    #[inline]
    pub(crate) fn capacity(&self) -> u64 {
        self.bytes.len() as u64 * Self::FRAMES_PER_BYTE
    }

    /// Marks the first `frames` entries [`FrameState::Free`].
    ///
    /// # Panics
    /// If `frames` exceeds [`capacity`](Self::capacity).
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn clear(&self, frames: u64) {
        let len = Self::bytes_for(frames) as usize;
        for byte in &self.bytes[..len] {
            byte.set(0);
        }
    }

    /// Decodes the state of entry `index`; `None` if it holds the unused code.
    ///
    /// # Panics
    /// If `index` is not below [`capacity`](Self::capacity).
    #[inline]
    pub(crate) fn state(&self, index: u64) -> Option<FrameState> {
        let (byte, shift) = Self::locate(index);
        FrameState::from_code(self.bytes[byte].get() >> shift)
    }

    /// Overwrites entry `index`, leaving the other entries of its byte untouched.
    ///
    /// # Panics
    /// If `index` is not below [`capacity`](Self::capacity).
    #[inline]
    pub(crate) fn set_state(&self, index: u64, state: FrameState) {
        let (byte, shift) = Self::locate(index);
        let cell = &self.bytes[byte];
        let cleared = cell.get() & !(FrameState::MASK << shift);
        cell.set(cleared | (state.code() << shift));
    }

    /// Byte index and bit offset of entry `index`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    const fn locate(index: u64) -> (usize, u32) {
        let byte = (index / Self::FRAMES_PER_BYTE) as usize;
        let shift = (index % Self::FRAMES_PER_BYTE) as u32 * FrameState::BITS;
        (byte, shift)
    }
}
