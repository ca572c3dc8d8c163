//! The background worker that renders entries and fans them out to outputs

use super::channel::Channel;
use super::diagnostics::Diagnostics;
use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::logger::LoggerState;
use super::metrics::LoggerMetrics;
use super::output::SharedOutput;
use super::severity::Severity;
use crossbeam_channel::Receiver;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Channels of a logger, indexed by [`Severity::index`]
pub type ChannelTable = [Option<Channel>; Severity::COUNT];

pub(crate) struct Dispatcher {
    logger_name: Arc<str>,
    channels: Arc<ChannelTable>,
    receiver: Receiver<Entry>,
    metrics: Arc<LoggerMetrics>,
    diagnostics: Diagnostics,
    state: Arc<AtomicU8>,
}

impl Dispatcher {
    pub(crate) fn new(
        logger_name: Arc<str>,
        channels: Arc<ChannelTable>,
        receiver: Receiver<Entry>,
        metrics: Arc<LoggerMetrics>,
        diagnostics: Diagnostics,
        state: Arc<AtomicU8>,
    ) -> Self {
        Self {
            logger_name,
            channels,
            receiver,
            metrics,
            diagnostics,
            state,
        }
    }

    /// Start the worker thread
    pub(crate) fn spawn(self) -> Result<JoinHandle<()>> {
        let name = self.logger_name.clone();
        thread::Builder::new()
            .name(format!("{}-dispatcher", name))
            .spawn(move || self.run())
            .map_err(|e| {
                LoggerError::initialization(
                    format!("Failed to start the dispatcher thread of logger '{}'", name),
                    Some(&e),
                )
            })
    }

    /// Drain until every sender is gone and the queue is empty
    fn run(self) {
        while let Ok(entry) = self.receiver.recv() {
            self.dispatch(&entry);
        }
        flush_outputs(&self.channels, |error| {
            self.metrics.record_sink_failure();
            self.diagnostics.report(&error);
        });
        self.state
            .store(LoggerState::Stopped as u8, Ordering::Release);
    }

    fn dispatch(&self, entry: &Entry) {
        let Some(channel) = self.channels[entry.severity.index()].as_ref() else {
            self.diagnostics
                .report(&LoggerError::UnsupportedSeverity(entry.severity));
            return;
        };

        let config = channel.snapshot();
        let rendered = match panic::catch_unwind(AssertUnwindSafe(|| {
            config.render(&self.logger_name, entry)
        })) {
            Ok(rendered) => rendered,
            Err(panic) => {
                self.metrics.record_render_failure();
                self.diagnostics.report(&LoggerError::RenderPanicked {
                    severity: entry.severity,
                    message: panic_message(panic.as_ref()),
                });
                return;
            }
        };

        match rendered.error {
            Some(ref error @ LoggerError::FormatArityMismatch { .. }) => {
                self.metrics.record_format_mismatch();
                self.diagnostics.report(error);
            }
            // Nothing usable was produced
            Some(ref error) => {
                self.metrics.record_render_failure();
                self.diagnostics.report(error);
                return;
            }
            None => {}
        }

        let raw = entry.payload.raw_bytes();
        for output in config.outputs() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                output.write(rendered.for_output(output.supports_style()), raw)
            }));
            if let Some(error) = sink_error(output, result) {
                self.metrics.record_sink_failure();
                self.diagnostics.report(&error);
            }
        }

        self.metrics.record_dispatched();
    }
}

/// Flush each distinct output of every channel once
pub(crate) fn flush_outputs(channels: &ChannelTable, mut on_error: impl FnMut(LoggerError)) {
    let mut seen: Vec<SharedOutput> = Vec::new();
    for channel in channels.iter().flatten() {
        for output in channel.snapshot().outputs() {
            if seen.iter().any(|known| same_output(known, output)) {
                continue;
            }
            seen.push(Arc::clone(output));

            let result = panic::catch_unwind(AssertUnwindSafe(|| output.flush()));
            if let Some(error) = sink_error(output, result) {
                on_error(error);
            }
        }
    }
}

fn same_output(a: &SharedOutput, b: &SharedOutput) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn sink_error(
    output: &SharedOutput,
    result: std::thread::Result<Result<()>>,
) -> Option<LoggerError> {
    match result {
        Ok(Ok(())) => None,
        Ok(Err(error @ LoggerError::SinkWriteFailure { .. })) => Some(error),
        Ok(Err(error)) => Some(LoggerError::sink_write(output.name(), error.to_string())),
        Err(panic) => Some(LoggerError::SinkPanicked {
            sink: output.name().to_string(),
            message: panic_message(panic.as_ref()),
        }),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
