//! File sink implementation

use crate::core::timestamp::format_line_at;
use crate::core::{Delivery, LevelThreshold, LogLevel, LogRecord, Sink, SinkError};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends formatted lines to a local file
///
/// The file is opened in append mode on the first accepted write, so building a
/// `FileSink` never fails. An open failure leaves the sink closed and the next write
/// tries again. Each line is flushed before `write` returns.
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatcher::sinks::FileSink;
/// use rust_log_dispatcher::{LogLevel, LogRecord, Sink};
///
/// let sink = FileSink::new("app.txt").with_level(LogLevel::Debug);
/// sink.write(&LogRecord::info("service started")).unwrap();
/// ```
pub struct FileSink {
    path: PathBuf,
    threshold: LevelThreshold,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            threshold: LevelThreshold::default(),
            writer: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.threshold.set(level);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.writer.lock().is_some()
    }

    /// Flush and release the handle; the next accepted write reopens the file
    pub fn close(&self) -> Result<(), SinkError> {
        let writer = self.writer.lock().take();
        if let Some(mut writer) = writer {
            writer
                .flush()
                .map_err(|e| SinkError::write_failed(self.target(), e))?;
        }
        Ok(())
    }

    fn open(&self) -> Result<BufWriter<File>, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::open_failed(self.target(), e))?;
        tracing::debug!(sink = "file", path = %self.path.display(), "opened log file");
        Ok(BufWriter::new(file))
    }
}

impl Sink for FileSink {
    fn write_at(&self, record: &LogRecord, at: &DateTime<Local>) -> Result<Delivery, SinkError> {
        if !self.threshold.accepts(record.level()) {
            return Ok(Delivery::Filtered);
        }

        let mut line = format_line_at(record, at);
        line.push('\n');

        let mut guard = self.writer.lock();
        let mut writer = match guard.take() {
            Some(writer) => writer,
            None => self.open()?,
        };

        let result = writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush());

        match result {
            Ok(()) => {
                *guard = Some(writer);
                Ok(Delivery::Written)
            }
            Err(e) => {
                // Keep the handle, drop the unflushed bytes: a failed line must not
                // reach the file with a later write
                let (file, _unflushed) = writer.into_parts();
                *guard = Some(BufWriter::new(file));
                Err(SinkError::write_failed(self.target(), e))
            }
        }
    }

    fn set_level(&self, level: LogLevel) {
        self.threshold.set(level);
    }

    fn level(&self) -> LogLevel {
        self.threshold.get()
    }

    fn type_tag(&self) -> &'static str {
        "file"
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }

    fn flush(&self) -> Result<(), SinkError> {
        if let Some(ref mut writer) = *self.writer.lock() {
            writer
                .flush()
                .map_err(|e| SinkError::write_failed(self.target(), e))?;
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(ref mut writer) = *self.writer.get_mut() {
            let _: io::Result<()> = writer.flush();
        }
    }
}
