//! Kernel logger.
//!
//! Backend for the `log` facade that writes each record as one line to
//! the platform console.

use core::fmt::{self, Write};

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::arch::{self, Platform};

static LOGGER: KernelLogger = KernelLogger;

/// Install the kernel logger with the given maximum level.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct KernelLogger;

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let Some(platform) = arch::platform() else {
            return;
        };

        let mut console = Console(platform);
        let _ = write_record(&mut console, record);
    }

    fn flush(&self) {}
}

/// Format one record as `[LEVEL] message`.
fn write_record<W: Write>(out: &mut W, record: &Record) -> fmt::Result {
    writeln!(out, "[{:<5}] {}", record.level(), record.args())
}

/// `fmt::Write` adapter over the platform console.
struct Console(&'static dyn Platform);

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.console_write(s);
        Ok(())
    }
}
