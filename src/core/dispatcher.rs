//! Dispatcher: queue, worker thread and sink

use super::{
    config::SinkConfig,
    error::{DispatchError, Result, SinkError},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::DispatchMetrics,
    queue::LogQueue,
    sink::{Delivery, Sink},
    timestamp::format_line_at,
};
use chrono::Local;
use crate::sinks::create_sink;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Capacity of the failure report channel; reports beyond it are dropped and counted
pub const FAILURE_BACKLOG: usize = 1024;

/// A record the sink could not deliver, with the reason
#[derive(Debug)]
pub struct DeliveryFailure {
    pub record: LogRecord,
    pub error: SinkError,
}

/// State moved into the worker thread
struct Worker {
    sink: Arc<dyn Sink>,
    queue: Arc<LogQueue<LogRecord>>,
    history: Arc<RwLock<Vec<String>>>,
    metrics: Arc<DispatchMetrics>,
    failures: Sender<DeliveryFailure>,
}

impl Worker {
    fn run(&self) {
        tracing::debug!(sink = self.sink.type_tag(), "dispatch worker started");

        while let Some(record) = self.queue.pop_blocking() {
            self.dispatch(record);
        }

        // Stopped and empty; pick up anything pushed while we were returning
        while let Some(record) = self.queue.pop_nonblocking() {
            self.dispatch(record);
        }

        if let Err(e) = self.sink.flush() {
            tracing::warn!(sink = self.sink.type_tag(), error = %e, "final flush failed");
        }
        tracing::debug!(sink = self.sink.type_tag(), "dispatch worker stopped");
    }

    /// Forward one record and record its outcome
    ///
    /// A panicking sink is contained here so one bad record cannot take the
    /// worker down with the rest of the queue.
    fn dispatch(&self, record: LogRecord) {
        let at = Local::now();
        let line = format_line_at(&record, &at);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.sink.write_at(&record, &at)
        }));

        let status = match &outcome {
            Ok(Ok(delivery)) => delivery.as_str().to_string(),
            Ok(Err(e)) => format!("failed: {}", e.kind()),
            Err(_) => "failed: panic".to_string(),
        };
        self.history.write().push(format!("{} ({})", line, status));

        match outcome {
            Ok(Ok(Delivery::Written)) => {
                self.metrics.record_delivered();
            }
            Ok(Ok(Delivery::Filtered)) => {
                self.metrics.record_filtered();
            }
            Ok(Err(error)) => {
                self.metrics.record_failed();
                tracing::warn!(
                    sink = self.sink.type_tag(),
                    level = %record.level(),
                    error = %error,
                    "delivery failed"
                );
                if let Err(TrySendError::Full(_)) =
                    self.failures.try_send(DeliveryFailure { record, error })
                {
                    self.metrics.record_failure_report_dropped();
                }
            }
            Err(panic_info) => {
                self.metrics.record_failed();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::error!(
                    sink = self.sink.type_tag(),
                    panic = %panic_msg,
                    "sink panicked, dispatch continues"
                );
            }
        }
    }
}

/// Moves records from producers to a sink on one background thread
///
/// Producers call [`submit`](Dispatcher::submit) from any thread; the worker started
/// by [`start`](Dispatcher::start) forwards records to the sink in submission order
/// and appends one history entry per record, including records the sink filtered
/// out and records it failed to deliver. Sink failures never stop the worker.
///
/// Call [`stop`](Dispatcher::stop) before discarding the dispatcher; it drains the
/// queue and joins the worker. `Drop` calls it as a fallback.
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatcher::prelude::*;
/// use std::sync::Arc;
///
/// let mut dispatcher = Dispatcher::new(Arc::new(FileSink::new("app.txt")));
/// dispatcher.start().unwrap();
///
/// dispatcher.submit("service started", LogLevel::Info);
/// dispatcher.submit("cache warmed", LogLevel::Debug);
///
/// dispatcher.stop();
/// assert_eq!(dispatcher.history_count(), 2);
/// ```
pub struct Dispatcher {
    sink: Option<Arc<dyn Sink>>,
    queue: Arc<LogQueue<LogRecord>>,
    history: Arc<RwLock<Vec<String>>>,
    running: AtomicBool,
    worker: Option<thread::JoinHandle<()>>,
    metrics: Arc<DispatchMetrics>,
    failure_tx: Sender<DeliveryFailure>,
    failure_rx: Receiver<DeliveryFailure>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        let mut dispatcher = Self::without_sink();
        dispatcher.sink = Some(sink);
        dispatcher
    }

    fn without_sink() -> Self {
        let (failure_tx, failure_rx) = bounded(FAILURE_BACKLOG);
        Self {
            sink: None,
            queue: Arc::new(LogQueue::new()),
            history: Arc::new(RwLock::new(Vec::new())),
            running: AtomicBool::new(false),
            worker: None,
            metrics: Arc::new(DispatchMetrics::new()),
            failure_tx,
            failure_rx,
        }
    }

    /// Create a builder for Dispatcher
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Replace the sink; only allowed before `start()`
    pub fn set_sink(&mut self, sink: Arc<dyn Sink>) -> Result<()> {
        if self.worker.is_some() {
            return Err(DispatchError::AlreadyStarted);
        }
        self.sink = Some(sink);
        Ok(())
    }

    pub fn sink(&self) -> Option<&Arc<dyn Sink>> {
        self.sink.as_ref()
    }

    fn worker_state(&self, sink: Arc<dyn Sink>) -> Worker {
        Worker {
            sink,
            queue: Arc::clone(&self.queue),
            history: Arc::clone(&self.history),
            metrics: Arc::clone(&self.metrics),
            failures: self.failure_tx.clone(),
        }
    }

    /// Spawn the worker thread
    ///
    /// # Errors
    ///
    /// [`DispatchError::NoSink`] without a sink, [`DispatchError::AlreadyStarted`] when
    /// the worker is running and [`DispatchError::Stopped`] after `stop()`.
    pub fn start(&mut self) -> Result<()> {
        let sink = self.sink.clone().ok_or(DispatchError::NoSink)?;
        if self.worker.is_some() {
            return Err(DispatchError::AlreadyStarted);
        }
        if self.queue.is_stopped() {
            return Err(DispatchError::Stopped);
        }

        let worker = self.worker_state(sink);
        self.running.store(true, Ordering::Release);
        let handle = thread::Builder::new()
            .name("log-dispatch".to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                DispatchError::Spawn(e)
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Stop accepting new waits, drain the queue and join the worker
    ///
    /// Safe to call more than once. A dispatcher that was never started but has a
    /// sink drains its queue on the calling thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.queue.stop();

        if let Some(handle) = self.worker.take() {
            if let Err(e) = handle.join() {
                tracing::error!("dispatch worker panicked during shutdown: {:?}", e);
            }
        } else if let Some(sink) = self.sink.clone() {
            if !self.queue.is_empty() {
                self.worker_state(sink).run();
            }
        }
    }

    /// Queue a record; never blocks and is accepted in any state
    pub fn submit(&self, message: impl Into<String>, level: LogLevel) {
        self.submit_record(LogRecord::new(message, level));
    }

    pub fn submit_record(&self, record: LogRecord) {
        self.metrics.record_submitted();
        self.queue.push(record);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.submit(message, LogLevel::Debug);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.submit(message, LogLevel::Info);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.submit(message, LogLevel::Error);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.worker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Records waiting for the worker
    pub fn queue_depth(&self) -> usize {
        self.queue.size()
    }

    pub fn history_count(&self) -> usize {
        self.history.read().len()
    }

    /// Copy of the history, in dispatch order
    ///
    /// Each entry is the formatted line followed by its outcome in parentheses:
    /// `written`, `filtered` or `failed: <kind>`.
    pub fn history_snapshot(&self) -> Vec<String> {
        self.history.read().clone()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Failures reported by the worker, oldest first
    pub fn failures(&self) -> &Receiver<DeliveryFailure> {
        &self.failure_rx
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builder for constructing a Dispatcher with a fluent API
///
/// # Example
/// ```no_run
/// use rust_log_dispatcher::prelude::*;
///
/// let mut dispatcher = Dispatcher::builder()
///     .sink_config(SinkConfig::file("app.txt").with_level(LogLevel::Debug))
///     .build()
///     .unwrap();
/// dispatcher.start().unwrap();
/// ```
pub struct DispatcherBuilder {
    sink: Option<Arc<dyn Sink>>,
    sink_config: Option<SinkConfig>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            sink: None,
            sink_config: None,
        }
    }

    /// Use an already constructed sink
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the sink from configuration when `build()` runs
    ///
    /// Ignored when [`sink`](DispatcherBuilder::sink) was also given.
    #[must_use = "builder methods return a new value"]
    pub fn sink_config(mut self, config: SinkConfig) -> Self {
        self.sink_config = Some(config);
        self
    }

    /// Build the Dispatcher
    ///
    /// # Errors
    ///
    /// Propagates factory errors, including an unreachable network endpoint.
    pub fn build(self) -> Result<Dispatcher> {
        let sink = match (self.sink, self.sink_config) {
            (Some(sink), _) => Some(sink),
            (None, Some(config)) => Some(create_sink(&config)?),
            (None, None) => None,
        };

        let mut dispatcher = Dispatcher::without_sink();
        dispatcher.sink = sink;
        Ok(dispatcher)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
