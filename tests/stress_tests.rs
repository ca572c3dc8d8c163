//! Stress tests for queueing and live reconfiguration
//!
//! These tests verify:
//! - Bound queues apply backpressure instead of dropping
//! - Unbound queues never block producers
//! - Every rendered entry sees exactly one configuration version
//! - Per-producer ordering under concurrent load

mod common;

use common::{message_only, CaptureOutput, GateOutput};
use fanout_logger::outputs;
use fanout_logger::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Capacity 1 and two producers racing: both entries arrive exactly once
#[test]
fn test_capacity_one_two_producers() {
    for _ in 0..50 {
        let capture = CaptureOutput::new();
        let logger = Logger::builder()
            .queue(QueueScheme::Bound, 1)
            .output(Severity::Info, capture.clone())
            .build()
            .expect("logger");
        message_only(&logger);

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|id| {
                let logger = Arc::clone(&logger);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    logger.info(("producer {}", id));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("producer panicked");
        }
        logger.shutdown();

        let mut lines = capture.lines();
        lines.sort();
        assert_eq!(lines, vec!["INFO producer 0\n", "INFO producer 1\n"]);
        assert_eq!(logger.metrics().dropped_count(), 0);
    }
}

/// With the dispatcher stuck in a write, the (C+1)th queued push waits
#[test]
fn test_bound_queue_backpressure() {
    const CAPACITY: usize = 2;
    let gate = GateOutput::closed();
    let logger = Logger::builder()
        .queue(QueueScheme::Bound, CAPACITY)
        .output(Severity::Info, gate.clone())
        .build()
        .expect("logger");

    let done = Arc::new(AtomicBool::new(false));
    let pushed = Arc::new(AtomicUsize::new(0));
    let producer = {
        let logger = Arc::clone(&logger);
        let done = Arc::clone(&done);
        let pushed = Arc::clone(&pushed);
        thread::spawn(move || {
            // One entry held by the dispatcher plus a full queue, then one more
            for i in 0..CAPACITY + 2 {
                logger.info(("entry {}", i));
                pushed.fetch_add(1, Ordering::SeqCst);
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!done.load(Ordering::SeqCst), "producer should be blocked");
    assert!(pushed.load(Ordering::SeqCst) <= CAPACITY + 1);
    assert!(logger.metrics().block_events() >= 1);

    gate.open();
    producer.join().expect("producer panicked");
    logger.shutdown();

    assert_eq!(gate.inner.len(), CAPACITY + 2);
    assert_eq!(logger.metrics().dropped_count(), 0);
}

/// An unbound queue accepts everything even while the dispatcher is stuck
#[test]
fn test_unbound_queue_never_blocks() {
    const COUNT: usize = 20_000;
    let gate = GateOutput::closed();
    let logger = Logger::builder()
        .queue(QueueScheme::Unbound, 0)
        .output(Severity::Info, gate.clone())
        .build()
        .expect("logger");

    let start = Instant::now();
    for i in 0..COUNT {
        logger.info(("entry {}", i));
    }
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(logger.queue_len() >= COUNT - 1);
    assert_eq!(logger.metrics().block_events(), 0);

    gate.open();
    logger.shutdown();
    assert_eq!(gate.inner.len(), COUNT);
}

/// Each rendered line matches exactly one of two configurations
///
/// Version A: type label shown, routed to `with_type`.
/// Version B: type label hidden, routed to `without_type`.
#[test]
fn test_snapshot_atomicity_under_reconfiguration() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 2_000;

    let with_type = CaptureOutput::new();
    let without_type = CaptureOutput::new();
    let logger = Logger::builder()
        .queue(QueueScheme::Bound, 64)
        .build()
        .expect("logger");
    message_only(&logger);
    let channel = logger.channel(Severity::Info).expect("info");
    channel.set_outputs(outputs![with_type]);

    let stop = Arc::new(AtomicBool::new(false));
    let flipper = {
        let logger = Arc::clone(&logger);
        let stop = Arc::clone(&stop);
        let with_type = Arc::clone(&with_type);
        let without_type = Arc::clone(&without_type);
        thread::spawn(move || {
            let channel = logger.channel(Severity::Info).expect("info");
            let mut show = false;
            while !stop.load(Ordering::Relaxed) {
                let target = if show {
                    with_type.clone() as SharedOutput
                } else {
                    without_type.clone() as SharedOutput
                };
                channel.configure(|config| {
                    config.field_mut(FieldKind::Type).enabled = show;
                    config.set_outputs([target]);
                });
                show = !show;
                thread::yield_now();
            }
        })
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    logger.info(("p{} {}", id, seq));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }
    stop.store(true, Ordering::Relaxed);
    flipper.join().expect("flipper panicked");
    logger.shutdown();

    let typed = with_type.lines();
    let untyped = without_type.lines();
    assert_eq!(typed.len() + untyped.len(), PRODUCERS * PER_PRODUCER);
    assert!(typed.iter().all(|line| line.starts_with("INFO p")), "torn render in typed output");
    assert!(untyped.iter().all(|line| line.starts_with('p')), "torn render in untyped output");
}

/// Entries of one producer keep their order, whatever the interleaving
#[test]
fn test_per_producer_fifo() {
    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 1_000;

    let capture = CaptureOutput::new();
    let logger = Logger::builder()
        .queue(QueueScheme::Bound, 32)
        .output(Severity::Warning, capture.clone())
        .build()
        .expect("logger");
    message_only(&logger);
    logger
        .channel(Severity::Warning)
        .expect("warning")
        .field(FieldKind::Type)
        .disable();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    logger.warning(("{} {}", id, seq));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }
    logger.shutdown();

    let mut next: HashMap<usize, usize> = HashMap::new();
    for line in capture.lines() {
        let mut parts = line.trim_end().split(' ');
        let id: usize = parts.next().and_then(|p| p.parse().ok()).expect("id");
        let seq: usize = parts.next().and_then(|p| p.parse().ok()).expect("seq");
        let expected = next.entry(id).or_insert(0);
        assert_eq!(seq, *expected, "producer {} out of order", id);
        *expected += 1;
    }
    assert_eq!(next.len(), PRODUCERS);
    assert!(next.values().all(|&n| n == PER_PRODUCER));
}

/// Opt-in drop policies lose entries but never block
#[test]
fn test_drop_newest_under_load() {
    let gate = GateOutput::closed();
    let overflow_total = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&overflow_total);
    let logger = Logger::builder()
        .queue(QueueScheme::Bound, 4)
        .overflow_policy(OverflowPolicy::DropNewest)
        .on_overflow(Arc::new(move |total| {
            seen.store(total as usize, Ordering::SeqCst);
        }))
        .on_diagnostic(Arc::new(|_: &LoggerError| {}))
        .output(Severity::Info, gate.clone())
        .build()
        .expect("logger");

    let mut rejected = 0;
    for i in 0..100 {
        if let Err(LoggerError::QueueOverflow { .. }) =
            logger.emit(Severity::Info, Payload::message(("entry {}", i)))
        {
            rejected += 1;
        }
    }
    assert!(rejected >= 100 - 5);
    assert_eq!(overflow_total.load(Ordering::SeqCst), 1);

    gate.open();
    logger.shutdown();
    assert_eq!(gate.inner.len() + rejected, 100);
    assert_eq!(logger.metrics().dropped_count() as usize, rejected);
}
