use core::fmt;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Device sink receiving pre-formatted output.
pub type ConsoleWriteFn = fn(fmt::Arguments<'_>);

pub struct ConsoleLogger {
    max_level: LevelFilter,
    write: ConsoleWriteFn,
}

impl ConsoleLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter, write: ConsoleWriteFn) -> Self {
        Self { max_level, write }
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Call this once during early init.
    ///
    /// # Errors
    /// Fails if a logger has already been installed.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Format: "[LEVEL] target: message\n"
        (self.write)(format_args!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {}
}
