//! # Diagnostic Console Output
//!
//! This crate provides the line-oriented text sink the kernel uses for
//! diagnostics, and a [`log`] backend that routes log records into such a sink.
//! Nothing here allocates, so it can be used before any heap exists.
//!
//! ## Overview
//!
//! Early kernel code has no standard I/O. What it does have is some device that
//! accepts text: a debug port, a serial line, a VGA text buffer, or, when the
//! code runs on a host, standard error. This crate abstracts over all of them
//! with two small pieces:
//!
//! ```text
//! Kernel Code                       Kernel Code
//!     ↓                                 ↓
//! log::info!(...)                   Console::puts / Console::puti
//!     ↓                                 ↓
//! ConsoleLogger (log::Log)          any core::fmt::Write
//!     ↓
//! sink: fn(fmt::Arguments)
//!     ↓
//! device (port, UART, stderr, ...)
//! ```
//!
//! ### Console ([`Console`])
//! The minimal "write string" / "write integer" interface. Both operations
//! return nothing and are assumed never to fail. Every [`core::fmt::Write`]
//! implementation is a console; write errors are dropped, since diagnostic
//! output is best effort.
//!
//! ### Logger ([`ConsoleLogger`])
//! A [`log::Log`] implementation with a `const` constructor, so it can live in
//! a `static` and be installed without allocation:
//!
//! ```rust,no_run
//! use core::fmt;
//! use kernel_console::ConsoleLogger;
//! use log::LevelFilter;
//!
//! fn write_device(args: fmt::Arguments<'_>) {
//!     // forward to a port, UART, ...
//!     # let _ = args;
//! }
//!
//! static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Debug, write_device);
//!
//! LOGGER.init().expect("logger initialization");
//! log::info!("console up");
//! ```
//!
//! Records are formatted as `"[LEVEL] target: message\n"`.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod logger;

use core::fmt;

pub use logger::{ConsoleLogger, ConsoleWriteFn};

/// Line-oriented diagnostic text sink.
pub trait Console {
    /// Write a string verbatim.
    fn puts(&mut self, s: &str);

    /// Write an unsigned integer in decimal.
    fn puti(&mut self, value: u64);
}

impl<W: fmt::Write + ?Sized> Console for W {
    #[inline]
    fn puts(&mut self, s: &str) {
        // Best-effort output.
        let _ = self.write_str(s);
    }

    #[inline]
    fn puti(&mut self, value: u64) {
        let _ = write!(self, "{value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_fmt_writer_is_a_console() {
        let mut out = String::new();
        out.puts("frames ");
        out.puti(512);
        out.puts(" to ");
        out.puti(1023);
        assert_eq!(out, "frames 512 to 1023");
    }

    #[test]
    fn console_works_through_dyn() {
        let mut out = String::new();
        let console: &mut dyn Console = &mut out;
        console.puti(u64::MAX);
        assert_eq!(out, "18446744073709551615");
    }
}
