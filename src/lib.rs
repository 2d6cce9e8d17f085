//! # Rust Log Dispatcher
//!
//! An asynchronous log dispatch pipeline: producers submit leveled records from any
//! thread, and a single background worker forwards them in order to a file or
//! network sink.
//!
//! ## Features
//!
//! - **Non-blocking submission**: an unbounded queue never blocks producers
//! - **Ordered delivery**: one worker, records leave in the order they were queued
//! - **Lazy sinks**: files open and connections establish on the first accepted write
//! - **Failure recovery**: a dead network connection gets one reconnect per write
//! - **Audit history**: every dispatched record is kept, including filtered ones

pub mod console;
pub mod core;
pub mod sinks;
pub mod validation;

pub mod prelude {
    pub use crate::core::{
        Delivery, DeliveryFailure, DispatchError, DispatchMetrics, Dispatcher,
        DispatcherBuilder, LogLevel, LogRecord, Result, Sink, SinkConfig, SinkError, SinkKind,
    };
    pub use crate::sinks::{create_sink, FileSink, NetworkSink};
}

pub use crate::core::{
    Delivery, DeliveryFailure, DispatchError, DispatchMetrics, Dispatcher, DispatcherBuilder,
    LogLevel, LogQueue, LogRecord, Result, Sink, SinkConfig, SinkError, SinkKind,
};
pub use sinks::{create_sink, ConnectionState, FileSink, NetworkSink};
