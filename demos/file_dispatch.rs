//! File dispatch example
//!
//! Demonstrates queueing records from several threads into a single file sink,
//! then reading back the dispatch history.
//!
//! Run with: cargo run --example file_dispatch

use rust_log_dispatcher::prelude::*;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Log Dispatcher - File Dispatch Example ===\n");

    // Lines below INFO are recorded in history but never reach the file
    let mut dispatcher = Dispatcher::builder()
        .sink_config(SinkConfig::file("application.txt").with_level(LogLevel::Info))
        .build()?;
    dispatcher.start()?;

    println!("1. Submitting from the main thread:");
    dispatcher.info("Application started");
    dispatcher.debug("Loading configuration...");
    dispatcher.info("Configuration loaded successfully");
    dispatcher.error("Failed to load optional plugin");

    println!("2. Submitting from worker threads:");
    thread::scope(|scope| {
        for worker in 1..=3 {
            let dispatcher = &dispatcher;
            scope.spawn(move || {
                for item in 1..=3 {
                    dispatcher.info(format!("Worker {} processed item {}/3", worker, item));
                }
            });
        }
    });

    dispatcher.info("All operations completed");

    // Drains the queue and joins the worker
    dispatcher.stop();

    println!("\n3. Dispatch history:");
    for entry in dispatcher.history_snapshot() {
        println!("   {}", entry);
    }

    let metrics = dispatcher.metrics();
    println!(
        "\n{} submitted, {} written, {} filtered, {} failed",
        metrics.submitted(),
        metrics.delivered(),
        metrics.filtered(),
        metrics.failed()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.txt' for the written lines");

    Ok(())
}
