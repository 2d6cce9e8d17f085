//! Core pipeline types and traits

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod metrics;
pub mod queue;
pub mod sink;
pub mod timestamp;

pub use config::{SinkConfig, SinkKind};
pub use dispatcher::{DeliveryFailure, Dispatcher, DispatcherBuilder, FAILURE_BACKLOG};
pub use error::{DispatchError, Result, SinkError};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use metrics::DispatchMetrics;
pub use queue::LogQueue;
pub use sink::{Delivery, LevelThreshold, Sink};
pub use timestamp::{format_line, format_line_at, LINE_TIMESTAMP_FORMAT};
