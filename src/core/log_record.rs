//! Log record structure

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// One leveled message awaiting delivery
///
/// Records are immutable once built. Line breaks in the message are escaped so a
/// record always formats to exactly one line, which keeps file output and the
/// newline-framed network stream unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct LogRecord {
    message: String,
    level: LogLevel,
}

/// Wire shape of a record; converted through [`LogRecord::new`] so decoded
/// messages are escaped like constructed ones
#[derive(Deserialize)]
struct RawRecord {
    message: String,
    level: LogLevel,
}

impl From<RawRecord> for LogRecord {
    fn from(raw: RawRecord) -> Self {
        LogRecord::new(raw.message, raw.level)
    }
}

impl LogRecord {
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        let message = message.into();
        let message = if message.contains(['\n', '\r', '\t']) {
            Self::sanitize_message(&message)
        } else {
            message
        };
        Self { message, level }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Debug)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Error)
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }
}
