//! Line formatting
//!
//! Every sink and the dispatch history share one text layout:
//!
//! ```text
//! [2025-01-08 10:30:45] [INFO] message
//! ```
//!
//! The timestamp is local time, taken when the line is formatted (dispatch time),
//! not when the record was submitted.

use super::log_record::LogRecord;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// strftime layout of the bracketed timestamp
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a record with the current local time, without a line terminator
#[must_use]
pub fn format_line(record: &LogRecord) -> String {
    format_line_at(record, &Local::now())
}

/// Format a record with an explicit timestamp, without a line terminator
#[must_use]
pub fn format_line_at<Tz>(record: &LogRecord, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "[{}] [{}] {}",
        at.format(LINE_TIMESTAMP_FORMAT),
        record.level().to_str(),
        record.message()
    )
}
