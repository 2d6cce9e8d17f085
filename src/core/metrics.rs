//! Dispatch metrics for observability
//!
//! Counters describing what the worker did with each record: delivered,
//! filtered by the sink threshold, or failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for dispatcher observability
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_submitted();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.submitted(), 1);
/// assert_eq!(metrics.delivered(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Records handed to `submit`
    submitted: AtomicU64,

    /// Records the sink wrote
    delivered: AtomicU64,

    /// Records below the sink threshold
    filtered: AtomicU64,

    /// Records the sink failed to deliver
    failed: AtomicU64,

    /// Failure reports dropped because the report channel was full
    failure_reports_dropped: AtomicU64,
}

impl DispatchMetrics {
    pub const fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            failure_reports_dropped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failure_reports_dropped(&self) -> u64 {
        self.failure_reports_dropped.load(Ordering::Relaxed)
    }

    /// Records the worker has finished with, whatever the outcome
    pub fn processed(&self) -> u64 {
        self.delivered() + self.filtered() + self.failed()
    }

    #[inline]
    pub fn record_submitted(&self) -> u64 {
        self.submitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failure_report_dropped(&self) -> u64 {
        self.failure_reports_dropped.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of processed records that failed, as a percentage (0.0 - 100.0)
    ///
    /// Filtered records count as handled. Returns 0.0 before anything is processed.
    pub fn failure_rate(&self) -> f64 {
        let processed = self.processed() as f64;
        if processed == 0.0 {
            0.0
        } else {
            (self.failed() as f64 / processed) * 100.0
        }
    }

    pub fn reset(&self) {
        self.submitted.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.failure_reports_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Create a snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            submitted: AtomicU64::new(self.submitted()),
            delivered: AtomicU64::new(self.delivered()),
            filtered: AtomicU64::new(self.filtered()),
            failed: AtomicU64::new(self.failed()),
            failure_reports_dropped: AtomicU64::new(self.failure_reports_dropped()),
        }
    }
}
