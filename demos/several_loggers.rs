//! Several loggers sharing outputs
//!
//! Two loggers with their own queues and dispatcher threads write to the
//! same file. One of them is built from a JSON configuration; the other
//! drops entries instead of blocking and counts them through a custom output.
//!
//! Run with: cargo run --example several_loggers

use fanout_logger::outputs;
use fanout_logger::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NETWORK_CONFIG: &str = r#"{
    "name": "network",
    "queue": { "scheme": "Bound", "capacity": 64 },
    "severities": ["Info", "Warning", "Error"],
    "channels": [
        { "severity": "Error", "fields": { "Type": { "style_enabled": true } } }
    ]
}"#;

fn main() -> Result<()> {
    println!("=== Fanout Logger - Several Loggers Example ===\n");

    let file = FileOutput::create(
        FileConfig::new("several_loggers.log").open_mode(OpenMode::TRUNCATE),
    )?;
    let debug = DebugOutput::create();

    let network = LoggerConfig::from_json_str(NETWORK_CONFIG)?
        .builder()?
        .output_all(file.clone())
        .output(Severity::Error, debug.clone())
        .build()?;

    let counted = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counted);
    let counter = CustomOutput::create("counter", move |_, _| {
        seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });

    let storage = Logger::builder()
        .name("storage")
        .queue(QueueScheme::Bound, 8)
        .overflow_policy(OverflowPolicy::DropOldest)
        .build()?;
    for severity in Severity::ALL {
        storage.channel(severity)?.set_outputs(outputs![file, counter]);
    }

    // Unsupported severities are rejected, not silently dropped
    if let Err(e) = network.emit(Severity::Success, Payload::message("never routed")) {
        println!("network logger: {}", e);
    }

    let workers: Vec<_> = (0..2)
        .map(|id| {
            let network = Arc::clone(&network);
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                for request in 0..25 {
                    network.info(("worker {} request {}", id, request));
                    storage.success(("worker {} stored block {}", id, request));
                }
                network.warning(("worker {} done", id));
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }
    network.error("connection reset by peer");

    network.shutdown();
    storage.shutdown();

    println!(
        "storage: {} entries written, {} dropped",
        counted.load(Ordering::Relaxed),
        storage.metrics().dropped_count()
    );
    println!("\n=== Example completed successfully! ===");
    println!("Check '{}' for the interleaved output", file.path().display());

    Ok(())
}
