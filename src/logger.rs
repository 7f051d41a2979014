//! Kernel Logger
//!
//! Implements `log::Log` on top of any `core::fmt::Write` sink. On hardware
//! the sink is the serial console; the level filter is fixed per logger.
//!
//! # Security Considerations
//! - Output goes through a spinlock, lines are never interleaved
//! - Sink errors are dropped; logging must never fail a syscall

use core::fmt::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// `log` backend writing one line per record.
pub struct KernelLogger<W> {
    sink: Mutex<W>,
    level: LevelFilter,
}

impl<W> KernelLogger<W> {
    /// Create a logger over `sink` showing records up to `level`.
    pub const fn new(sink: W, level: LevelFilter) -> Self {
        Self {
            sink: Mutex::new(sink),
            level,
        }
    }

    /// Run `f` with exclusive access to the sink.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.sink.lock())
    }
}

impl<W: Write + Send> Log for KernelLogger<W> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut sink = self.sink.lock();
            let _ = writeln!(sink, "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install `logger` as the global `log` backend.
///
/// Fails if a logger is already installed.
pub fn init<W: Write + Send>(logger: &'static KernelLogger<W>) -> Result<(), SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    log::info!("[BOOT] Logger initialized with level: {}", logger.level);
    Ok(())
}
