//! Sink trait for log delivery targets

use super::{error::SinkError, log_level::LogLevel, log_record::LogRecord};
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::fmt;

/// Outcome of a successful [`Sink::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The line reached the underlying file or connection
    Written,
    /// The record was below the sink threshold and intentionally dropped
    Filtered,
}

impl Delivery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delivery::Written => "written",
            Delivery::Filtered => "filtered",
        }
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery target with its own threshold and handle lifecycle
///
/// Implementations guard their handle with an internal lock, so every method takes
/// `&self` and a sink can be shared behind an `Arc` between the dispatch worker and
/// whoever adjusts its level.
pub trait Sink: Send + Sync {
    /// Deliver one record stamped with the current local time
    fn write(&self, record: &LogRecord) -> Result<Delivery, SinkError> {
        self.write_at(record, &Local::now())
    }

    /// Deliver one record stamped with `at`
    ///
    /// Records below [`level`](Sink::level) return `Ok(Delivery::Filtered)` without
    /// touching the handle. The dispatcher passes the same instant it uses for the
    /// history entry.
    fn write_at(&self, record: &LogRecord, at: &DateTime<Local>) -> Result<Delivery, SinkError>;

    /// Change the minimum level for subsequent writes
    fn set_level(&self, level: LogLevel);

    fn level(&self) -> LogLevel;

    /// Static identifier used in diagnostics ("file" or "network")
    fn type_tag(&self) -> &'static str;

    /// Path or address this sink delivers to
    fn target(&self) -> String;

    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Minimum level shared by every sink implementation
#[derive(Debug)]
pub struct LevelThreshold {
    level: RwLock<LogLevel>,
}

impl LevelThreshold {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: RwLock::new(level),
        }
    }

    pub fn get(&self) -> LogLevel {
        *self.level.read()
    }

    pub fn set(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    /// True when a record at `level` should reach the handle
    #[inline]
    pub fn accepts(&self, level: LogLevel) -> bool {
        level >= self.get()
    }
}

impl Default for LevelThreshold {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}
