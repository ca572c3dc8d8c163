//! Logger metrics for observability
//!
//! Counters for the queue and the dispatcher: how many entries were
//! dispatched, how often producers had to wait, and what went wrong while
//! rendering or writing.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use fanout_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_dispatched();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.dispatched(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries rendered and handed to their outputs
    dispatched: AtomicU64,

    /// Individual output writes that failed or panicked
    sink_failures: AtomicU64,

    /// Entries rendered with a template arity mismatch
    format_mismatches: AtomicU64,

    /// Entries that could not be rendered at all
    render_failures: AtomicU64,

    /// Number of times a push found the queue full
    queue_full_events: AtomicU64,

    /// Number of times a producer blocked waiting for queue space
    block_events: AtomicU64,

    /// Entries discarded by an opt-in overflow policy
    dropped_count: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            format_mismatches: AtomicU64::new(0),
            render_failures: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Acquire)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_mismatches(&self) -> u64 {
        self.format_mismatches.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn render_failures(&self) -> u64 {
        self.render_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Record a dispatched entry, returning the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Release)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_format_mismatch(&self) -> u64 {
        self.format_mismatches.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_render_failure(&self) -> u64 {
        self.render_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped entry, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been dispatched or dropped.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.dispatched() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            format_mismatches: AtomicU64::new(self.format_mismatches()),
            render_failures: AtomicU64::new(self.render_failures()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
            block_events: AtomicU64::new(self.block_events()),
            dropped_count: AtomicU64::new(self.dropped_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(metrics.format_mismatches(), 0);
        assert_eq!(metrics.render_failures(), 0);
        assert_eq!(metrics.queue_full_events(), 0);
        assert_eq!(metrics.block_events(), 0);
        assert_eq!(metrics.dropped_count(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_dropped(), 0);
        assert_eq!(metrics.record_dropped(), 1);
        assert_eq!(metrics.dropped_count(), 2);
    }

    #[test]
    fn test_metrics_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_dispatched();
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }

        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "Drop rate was {}", rate);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_block();

        let snapshot = metrics.clone();
        metrics.record_dispatched();

        assert_eq!(snapshot.dispatched(), 1);
        assert_eq!(snapshot.block_events(), 1);
        assert_eq!(metrics.dispatched(), 2);
    }
}
