//! Pool diagnostics.

use kernel_console::Console;
use kernel_memory_addresses::PhysicalFrame;

/// Point-in-time summary of a pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolInfo {
    pub base: PhysicalFrame,
    pub count: u64,
    pub free: u64,
    pub info_frame: PhysicalFrame,
    pub info_frames: u64,
}

impl PoolInfo {
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.count - self.free
    }

    #[must_use]
    pub fn last_frame(&self) -> PhysicalFrame {
        self.base + (self.count - 1)
    }

    /// Writes the report block for the pool at 1-based position `position`.
    pub fn print<C: Console + ?Sized>(&self, position: usize, console: &mut C) {
        console.puts("Pool [");
        console.puti(position as u64);
        console.puts("]:\n");

        console.puts("\tFrame numbers: ");
        console.puti(self.base.number());
        console.puts(" to ");
        console.puti(self.last_frame().number());
        console.puts("\n");

        console.puts("\t");
        console.puti(self.count);
        console.puts(" frames total, ");
        console.puti(self.free);
        console.puts(" frames Free, ");
        console.puti(self.used());
        console.puts(" frames Used.\n");

        console.puts("\t");
        console.puti(self.info_frames);
        console.puts(" info frame(s) at frame number(s): ");
        console.puti(self.info_frame.number());
        if self.info_frames > 1 {
            console.puts("-");
            console.puti(self.info_frame.number() + self.info_frames - 1);
        }
        console.puts("\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_single_info_frame() {
        let info = PoolInfo {
            base: PhysicalFrame::new(512),
            count: 512,
            free: 500,
            info_frame: PhysicalFrame::new(512),
            info_frames: 1,
        };
        let mut out = String::new();
        info.print(1, &mut out);
        assert_eq!(
            out,
            "Pool [1]:\n\
             \tFrame numbers: 512 to 1023\n\
             \t512 frames total, 500 frames Free, 12 frames Used.\n\
             \t1 info frame(s) at frame number(s): 512\n"
        );
    }

    #[test]
    fn prints_info_frame_range() {
        let info = PoolInfo {
            base: PhysicalFrame::new(0),
            count: 4,
            free: 1,
            info_frame: PhysicalFrame::new(40),
            info_frames: 3,
        };
        let mut out = String::new();
        info.print(2, &mut out);
        assert!(out.ends_with("3 info frame(s) at frame number(s): 40-42\n"));
    }
}
