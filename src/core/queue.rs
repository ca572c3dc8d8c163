//! FIFO queue between producer threads and the dispatcher

use super::diagnostics::Diagnostics;
use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::metrics::LoggerMetrics;
use super::overflow_policy::{OverflowCallback, OverflowPolicy};
use crossbeam_channel::{bounded, unbounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default slot count of a bound queue
pub const DEFAULT_CAPACITY: usize = 1024;

/// Largest slot count of a bound queue; every slot is allocated up front
pub const MAX_CAPACITY: usize = 1 << 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueScheme {
    /// Fixed slot count; full pushes follow the overflow policy
    #[default]
    Bound,
    /// Grows without limit; pushes never wait
    Unbound,
}

/// Producer side of a logger's queue
///
/// Pushes hold a read lock on the sender for their whole duration, including
/// a blocking wait for a free slot. [`Queue::close`] takes the write lock, so
/// once it returns no push is in flight and every later push fails.
pub(crate) struct Queue {
    scheme: QueueScheme,
    capacity: Option<usize>,
    sender: RwLock<Option<Sender<Entry>>>,
    receiver: Receiver<Entry>,
    policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<LoggerMetrics>,
    diagnostics: Diagnostics,
}

impl Queue {
    /// Create a queue and the receiver its dispatcher drains
    pub fn new(
        scheme: QueueScheme,
        capacity: usize,
        policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
        metrics: Arc<LoggerMetrics>,
        diagnostics: Diagnostics,
    ) -> Result<(Self, Receiver<Entry>)> {
        let (sender, receiver, capacity) = match scheme {
            QueueScheme::Bound if capacity == 0 => {
                return Err(LoggerError::config(
                    "Queue",
                    "bound queue capacity must be at least 1",
                ));
            }
            QueueScheme::Bound if capacity > MAX_CAPACITY => {
                return Err(LoggerError::config(
                    "Queue",
                    format!(
                        "bound queue capacity {} exceeds {}; use an unbound queue instead",
                        capacity, MAX_CAPACITY
                    ),
                ));
            }
            QueueScheme::Bound => {
                let (tx, rx) = bounded(capacity);
                (tx, rx, Some(capacity))
            }
            QueueScheme::Unbound => {
                let (tx, rx) = unbounded();
                (tx, rx, None)
            }
        };

        let queue = Self {
            scheme,
            capacity,
            sender: RwLock::new(Some(sender)),
            receiver: receiver.clone(),
            policy,
            on_overflow,
            metrics,
            diagnostics,
        };
        Ok((queue, receiver))
    }

    pub fn scheme(&self) -> QueueScheme {
        self.scheme
    }

    /// Slot count of a bound queue
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn policy(&self) -> &OverflowPolicy {
        &self.policy
    }

    /// Entries waiting for the dispatcher
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Append an entry, applying the overflow policy if the queue is full
    pub fn push(&self, entry: Entry) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(LoggerError::LoggerStopped)?;

        match sender.try_send(entry) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(entry)) => {
                self.metrics.record_queue_full();
                self.overflow(sender, entry)
            }
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::LoggerStopped),
        }
    }

    /// Stop accepting entries; queued ones stay for the dispatcher
    ///
    /// Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        self.sender.write().take().is_some()
    }

    fn overflow(&self, sender: &Sender<Entry>, entry: Entry) -> Result<()> {
        match &self.policy {
            OverflowPolicy::Block => {
                self.metrics.record_block();
                sender.send(entry).map_err(|_| LoggerError::LoggerStopped)
            }
            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match sender.send_timeout(entry, *timeout) {
                    Ok(()) => Ok(()),
                    Err(SendTimeoutError::Timeout(_)) => Err(self.drop_entry()),
                    Err(SendTimeoutError::Disconnected(_)) => Err(LoggerError::LoggerStopped),
                }
            }
            OverflowPolicy::DropNewest => Err(self.drop_entry()),
            OverflowPolicy::DropOldest => self.evict_and_push(sender, entry),
        }
    }

    /// Make room by discarding the head of the queue
    ///
    /// The dispatcher may pop concurrently, so eviction and the retried push
    /// loop until the push succeeds.
    fn evict_and_push(&self, sender: &Sender<Entry>, mut entry: Entry) -> Result<()> {
        loop {
            if self.receiver.try_recv().is_ok() {
                self.drop_entry();
            }
            match sender.try_send(entry) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => entry = returned,
                Err(TrySendError::Disconnected(_)) => return Err(LoggerError::LoggerStopped),
            }
        }
    }

    /// Count a dropped entry and alert on the first drop and every 1000th
    fn drop_entry(&self) -> LoggerError {
        let total = self.metrics.record_dropped() + 1;

        if total == 1 || total % 1000 == 0 {
            self.diagnostics.warn(format_args!(
                "Queue full ({} policy), {} entries dropped. \
                 Consider a larger capacity or the Block policy.",
                self.policy, total
            ));
            if let Some(ref callback) = self.on_overflow {
                callback(total);
            }
        }

        LoggerError::queue_overflow(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Payload;
    use crate::core::severity::Severity;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn queue(
        scheme: QueueScheme,
        capacity: usize,
        policy: OverflowPolicy,
    ) -> (Queue, Receiver<Entry>, Arc<LoggerMetrics>) {
        let metrics = Arc::new(LoggerMetrics::new());
        let (queue, rx) = Queue::new(
            scheme,
            capacity,
            policy,
            None,
            Arc::clone(&metrics),
            Diagnostics::new(Arc::from("queue-test"), Some(Arc::new(|_| {}))),
        )
        .expect("queue");
        (queue, rx, metrics)
    }

    fn entry(text: &str) -> Entry {
        Entry::new(Severity::Info, Payload::message(text))
    }

    fn text_of(entry: Entry) -> String {
        entry.payload.render().0
    }

    #[test]
    fn test_zero_capacity_bound_is_rejected() {
        let metrics = Arc::new(LoggerMetrics::new());
        let result = Queue::new(
            QueueScheme::Bound,
            0,
            OverflowPolicy::Block,
            None,
            metrics,
            Diagnostics::new(Arc::from("q"), None),
        );
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_oversized_bound_is_rejected() {
        for capacity in [MAX_CAPACITY + 1, usize::MAX] {
            let result = Queue::new(
                QueueScheme::Bound,
                capacity,
                OverflowPolicy::Block,
                None,
                Arc::new(LoggerMetrics::new()),
                Diagnostics::new(Arc::from("q"), None),
            );
            assert!(matches!(
                result,
                Err(LoggerError::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_fifo_order() {
        let (queue, rx, _) = queue(QueueScheme::Bound, 16, OverflowPolicy::Block);
        for i in 0..10 {
            queue.push(entry(&format!("m{}", i))).expect("push");
        }
        let received: Vec<String> = rx.try_iter().map(text_of).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn test_unbound_never_reports_full() {
        let (queue, _rx, metrics) = queue(QueueScheme::Unbound, 1, OverflowPolicy::Block);
        for _ in 0..10_000 {
            queue.push(entry("x")).expect("push");
        }
        assert_eq!(queue.len(), 10_000);
        assert_eq!(queue.capacity(), None);
        assert_eq!(metrics.queue_full_events(), 0);
    }

    #[test]
    fn test_closed_queue_rejects_push() {
        let (queue, rx, _) = queue(QueueScheme::Bound, 4, OverflowPolicy::Block);
        queue.push(entry("before")).expect("push");
        assert!(queue.close());
        assert!(!queue.close());
        assert!(matches!(queue.push(entry("after")), Err(LoggerError::LoggerStopped)));

        // Entries queued before closing are still delivered
        assert_eq!(rx.recv().map(text_of).ok(), Some("before".to_string()));
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_drop_newest() {
        let (queue, rx, metrics) = queue(QueueScheme::Bound, 2, OverflowPolicy::DropNewest);
        queue.push(entry("a")).expect("push");
        queue.push(entry("b")).expect("push");
        assert!(matches!(
            queue.push(entry("c")),
            Err(LoggerError::QueueOverflow { dropped_count: 1 })
        ));
        assert_eq!(metrics.dropped_count(), 1);
        let received: Vec<String> = rx.try_iter().map(text_of).collect();
        assert_eq!(received, vec!["a", "b"]);
    }

    #[test]
    fn test_drop_oldest() {
        let (queue, rx, metrics) = queue(QueueScheme::Bound, 2, OverflowPolicy::DropOldest);
        for name in ["a", "b", "c", "d"] {
            queue.push(entry(name)).expect("push");
        }
        assert_eq!(metrics.dropped_count(), 2);
        let received: Vec<String> = rx.try_iter().map(text_of).collect();
        assert_eq!(received, vec!["c", "d"]);
    }

    #[test]
    fn test_block_with_timeout_drops_after_waiting() {
        let (queue, _rx, metrics) = queue(
            QueueScheme::Bound,
            1,
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(20)),
        );
        queue.push(entry("a")).expect("push");
        assert!(queue.push(entry("b")).is_err());
        assert_eq!(metrics.block_events(), 1);
        assert_eq!(metrics.dropped_count(), 1);
    }

    #[test]
    fn test_overflow_callback_on_first_drop() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&calls);
        let metrics = Arc::new(LoggerMetrics::new());
        let (queue, _rx) = Queue::new(
            QueueScheme::Bound,
            1,
            OverflowPolicy::DropNewest,
            Some(Arc::new(move |total| {
                seen.store(total, Ordering::SeqCst);
            })),
            metrics,
            Diagnostics::new(Arc::from("q"), Some(Arc::new(|_| {}))),
        )
        .expect("queue");

        queue.push(entry("kept")).expect("push");
        let _ = queue.push(entry("dropped"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
