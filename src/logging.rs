//! Logging facility
//!
//! The chain layer only emits records through the `log` crate. A host
//! without its own logger can install [`LOGGER`], which hands every enabled
//! record to a sink function (a serial port writer in a kernel).

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Receives each enabled log record
pub type LogSink = fn(&Record);

/// Global logger instance
pub static LOGGER: Logger = Logger::new();

/// Thread-safe logger forwarding to a sink
pub struct Logger {
    sink: Mutex<Option<LogSink>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub const fn new() -> Logger {
        Logger {
            sink: Mutex::new(None),
        }
    }

    /// Replaces the sink; records logged before the first call are dropped
    pub fn set_sink(&self, sink: LogSink) {
        *self.sink.lock() = Some(sink);
    }
}

impl Log for Logger {
    /// Returns true if the message level is at or below the configured maximum
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let sink = self.sink.lock();
            if let Some(sink) = *sink {
                sink(record);
            }
        }
    }

    fn flush(&self) {}
}

/// Installs [`LOGGER`] with `sink` as the global logger
///
/// # Notes
/// * `level` of `None` picks `Debug` for debug builds and `Info` otherwise
/// * Fails if another logger has already been installed
pub fn init(sink: LogSink, level: Option<LevelFilter>) -> Result<(), SetLoggerError> {
    LOGGER.set_sink(sink);
    log::set_logger(&LOGGER)?;
    let default = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    log::set_max_level(level.unwrap_or(default));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesys::fat::test_util::volume;
    use std::string::String;
    use std::vec::Vec;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn capture(record: &Record) {
        CAPTURED
            .lock()
            .push(alloc::format!("[{}] {}", record.level(), record.args()));
    }

    #[test]
    fn test_records_reach_sink() {
        init(capture, Some(LevelFilter::Trace)).unwrap();
        assert!(init(capture, None).is_err());

        let mut vol = volume(2);
        vol.allocate_new_cluster(0).unwrap();
        vol.allocate_new_cluster(0).unwrap();
        assert!(vol.allocate_new_cluster(0).is_err());

        let captured = CAPTURED.lock();
        assert!(captured
            .iter()
            .any(|line| line.starts_with("[TRACE]") && line.contains("claimed 0x2")));
        assert!(captured
            .iter()
            .any(|line| line.starts_with("[WARN]") && line.contains("no free cluster")));
    }
}
