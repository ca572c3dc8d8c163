//! Overflow policies for bound queues
//!
//! A bound queue applies backpressure by default: a producer waits until
//! the dispatcher frees a slot. The other policies trade guaranteed
//! delivery for producer latency and must be chosen explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What a push does when a bound queue is full
///
/// # Example
///
/// ```
/// use fanout_logger::OverflowPolicy;
/// use std::time::Duration;
///
/// assert_eq!(OverflowPolicy::default(), OverflowPolicy::Block);
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Wait until a slot frees up
    #[default]
    Block,

    /// Wait up to the given duration, then drop the new entry
    BlockWithTimeout(Duration),

    /// Drop the new entry immediately
    DropNewest,

    /// Evict the oldest queued entry to make room
    DropOldest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when entries are dropped by an overflow policy.
/// The parameter is the total count of dropped entries so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
