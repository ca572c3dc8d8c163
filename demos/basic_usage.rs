//! Basic logger usage example
//!
//! Demonstrates a console output on every severity, field styling and the
//! extra entry kinds.
//!
//! Run with: cargo run --example basic_usage

use fanout_logger::prelude::*;
use fanout_logger::{error, info, outputs, success, trace, warning};

fn main() -> Result<()> {
    println!("=== Fanout Logger - Basic Usage Example ===\n");

    let logger = Logger::create("MiniLogger", QueueScheme::Bound, 128)?;
    let console = ConsoleOutput::create(ConsoleConfig {
        title: "basic_usage".to_string(),
        ..ConsoleConfig::default()
    })?;

    for severity in Severity::ALL {
        let channel = logger.channel(severity)?;
        channel.set_outputs(outputs![console]);
        channel.field(FieldKind::Type).style().enable();
    }

    // Severities
    logger.info("This is an info message");
    logger.success("This is a success message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");

    // Deferred formatting
    info!(logger, "Server listening on port {}", 8080);
    success!(logger, "{} of {} checks passed", 12, 12);
    warning!(logger, "Disk usage at {}%", 91.5);
    error!(logger, "User {} failed action: {}", 42, "login");

    // Layout changes apply to the next entry
    let error_channel = logger.channel(Severity::Error)?;
    error_channel.field(FieldKind::TimePoint).disable();
    error_channel
        .field(FieldKind::Message)
        .style()
        .set(VtStyle {
            effect: Some(Effect::Bold),
            ..VtStyle::fg(Rgb::new(255, 80, 80))
        });
    error_channel.field(FieldKind::Message).style().enable();
    logger.error("No timestamp, bold red message");

    // Extras
    logger.lines(1);
    logger.sequence(40, '=');
    logger.lines(1);
    logger.bytes_with("Frame header:", &[0x15, 0xCD, 0x5B, 0x07, 0x00, 0x41, 0x42]);
    logger.value(&3.25f64);
    trace!(logger, "reached the end\n");

    logger.shutdown();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
