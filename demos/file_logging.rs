//! File logging example
//!
//! Demonstrates a file output configured from the command line next to a
//! console output. Errors go to both, everything else only to the file.
//!
//! Run with:
//! cargo run --example file_logging -- --app.path=application.log --app.flushSize=4

use fanout_logger::outputs;
use fanout_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Fanout Logger - File Logging Example ===\n");

    let config = match FileConfig::from_env_args("app") {
        Ok(config) => config,
        Err(_) => FileConfig::new("application.log").flush_size(4),
    };
    let file = FileOutput::create(config)?;
    let console = ConsoleOutput::create(ConsoleConfig::default())?;

    let logger = Logger::builder()
        .name("app")
        .queue(QueueScheme::Bound, 256)
        .output_all(file.clone())
        .output(Severity::Error, console.clone())
        .build()?;

    logger
        .channel(Severity::Info)?
        .set_timestamp_format(TimestampFormat::Iso8601)?;

    println!("1. Performing some operations:");
    for i in 1..=5 {
        logger.info(("Processing item {}/5", i));
        if i == 3 {
            logger.warning("Item 3 took longer than expected");
        }
    }
    logger.bytes_with("Checksum:", &0xDEAD_BEEFu32.to_le_bytes());
    logger.error("Failed to load optional plugin");
    logger.success("All operations completed");

    // Wait for the queue to drain, then flush every output
    logger.shutdown();
    logger.flush()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check '{}' for the full log output", file.path().display());

    Ok(())
}
