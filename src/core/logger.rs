//! Main logger implementation

use super::{
    callsite::CallSite,
    channel::Channel,
    diagnostics::{DiagnosticCallback, Diagnostics},
    dispatcher::{flush_outputs, ChannelTable, Dispatcher},
    entry::{Entry, Payload},
    error::{LoggerError, Result},
    format::Message,
    metrics::LoggerMetrics,
    output::SharedOutput,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    queue::{Queue, QueueScheme, DEFAULT_CAPACITY},
    severity::Severity,
    value::{LogValue, TypedValue},
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    /// Accepting entries; the dispatcher is draining
    Running,
    /// Shutdown requested; queued entries are still being dispatched
    Draining,
    /// Queue empty, dispatcher joined
    Stopped,
}

impl LoggerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => LoggerState::Running,
            1 => LoggerState::Draining,
            _ => LoggerState::Stopped,
        }
    }
}

/// A named logger: a queue, one channel per supported severity and a dispatcher thread
///
/// Producers on any thread emit through a shared `Arc<Logger>`. Dropping the
/// last handle drains the queue before returning.
///
/// # Example
///
/// ```
/// use fanout_logger::prelude::*;
///
/// let logger = Logger::create("app", QueueScheme::Bound, 256).expect("logger");
/// logger.info("started");
/// logger.info(("listening on port {}", 8080));
/// logger.shutdown();
/// ```
pub struct Logger {
    name: Arc<str>,
    channels: Arc<ChannelTable>,
    queue: Queue,
    extras: Severity,
    state: Arc<AtomicU8>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
    diagnostics: Diagnostics,
}

impl Logger {
    /// Create a logger supporting every severity, with no outputs attached
    ///
    /// `capacity` is ignored for [`QueueScheme::Unbound`].
    pub fn create(
        name: impl Into<String>,
        scheme: QueueScheme,
        capacity: usize,
    ) -> Result<Arc<Self>> {
        Self::builder().name(name).queue(scheme, capacity).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn queue_scheme(&self) -> QueueScheme {
        self.queue.scheme()
    }

    /// Slot count of a bound queue
    pub fn capacity(&self) -> Option<usize> {
        self.queue.capacity()
    }

    /// Entries waiting for the dispatcher
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn overflow_policy(&self) -> &OverflowPolicy {
        self.queue.policy()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Severity whose channel renders `lines`, `sequence`, `trace`, `bytes` and `value`
    pub fn extras_severity(&self) -> Severity {
        self.extras
    }

    pub fn supports(&self, severity: Severity) -> bool {
        self.channels[severity.index()].is_some()
    }

    /// Configuration handle for one severity
    pub fn channel(&self, severity: Severity) -> Result<&Channel> {
        self.channels[severity.index()]
            .as_ref()
            .ok_or(LoggerError::UnsupportedSeverity(severity))
    }

    /// Queue an entry
    ///
    /// Fails for an undeclared severity, after shutdown began, and when an
    /// opt-in overflow policy drops the entry. Rendering problems are not
    /// reported here; they surface on the diagnostic channel.
    pub fn emit(&self, severity: Severity, payload: Payload) -> Result<()> {
        if !self.supports(severity) {
            return Err(LoggerError::UnsupportedSeverity(severity));
        }
        if self.state() != LoggerState::Running {
            return Err(LoggerError::LoggerStopped);
        }
        self.queue.push(Entry::new(severity, payload))
    }

    /// Emit, sending failures to the diagnostic channel
    fn submit(&self, severity: Severity, payload: Payload) {
        match self.emit(severity, payload) {
            Ok(()) => {}
            // Already counted and alerted by the queue
            Err(LoggerError::QueueOverflow { .. }) => {}
            Err(e) => self.diagnostics.report(&e),
        }
    }

    pub fn log(&self, severity: Severity, message: impl Into<Message>) {
        self.submit(severity, Payload::message(message));
    }

    #[inline]
    pub fn info(&self, message: impl Into<Message>) {
        self.log(Severity::Info, message);
    }

    #[inline]
    pub fn success(&self, message: impl Into<Message>) {
        self.log(Severity::Success, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<Message>) {
        self.log(Severity::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<Message>) {
        self.log(Severity::Error, message);
    }

    /// Write `count` blank lines verbatim
    pub fn lines(&self, count: usize) {
        self.submit(self.extras, Payload::Spacer(count));
    }

    /// Write `pattern` repeated `count` times verbatim
    ///
    /// ```
    /// # use fanout_logger::prelude::*;
    /// # let logger = Logger::create("doc", QueueScheme::Unbound, 0).expect("logger");
    /// logger.sequence(40, '-');
    /// logger.sequence(3, "=>");
    /// ```
    pub fn sequence(&self, count: usize, pattern: impl Into<Message>) {
        self.submit(
            self.extras,
            Payload::Sequence {
                count,
                pattern: pattern.into(),
            },
        );
    }

    /// Record the caller's location
    #[track_caller]
    pub fn trace(&self) {
        self.trace_at(CallSite::capture(), None);
    }

    /// Record the caller's location with a message
    #[track_caller]
    pub fn trace_with(&self, message: impl Into<Message>) {
        self.trace_at(CallSite::capture(), Some(message.into()));
    }

    /// Record an already captured location; used by [`trace!`](crate::trace)
    pub fn trace_at(&self, site: CallSite, message: Option<Message>) {
        self.submit(self.extras, Payload::Trace { message, site });
    }

    /// Hex dump of a copy of `data`
    pub fn bytes(&self, data: &[u8]) {
        self.submit(
            self.extras,
            Payload::Bytes {
                message: None,
                data: data.to_vec(),
            },
        );
    }

    /// Hex dump of a copy of `data`, preceded by a message
    pub fn bytes_with(&self, message: impl Into<Message>, data: &[u8]) {
        self.submit(
            self.extras,
            Payload::Bytes {
                message: Some(message.into()),
                data: data.to_vec(),
            },
        );
    }

    /// Structured rendering of a copy of a primitive value
    pub fn value<T: LogValue>(&self, value: &T) {
        self.submit(self.extras, Payload::Value(TypedValue::capture(value)));
    }

    /// Flush every output referenced by any channel
    ///
    /// Entries still queued are not waited for; use [`Logger::shutdown`] for that.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        flush_outputs(&self.channels, |e| {
            first_error.get_or_insert(e);
        });
        first_error.map_or(Ok(()), Err)
    }

    /// Stop accepting entries and wait until everything queued is dispatched
    ///
    /// There is no timeout. Calling it again, or from the dispatcher thread
    /// itself, returns without waiting.
    pub fn shutdown(&self) {
        let _ = self.state.compare_exchange(
            LoggerState::Running as u8,
            LoggerState::Draining as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.queue.close();

        let Some(handle) = self.dispatcher.lock().take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            // A sink released the last handle; the loop marks Stopped once drained
            return;
        }

        if handle.join().is_err() {
            eprintln!(
                "[LOGGER ERROR] {}: dispatcher thread panicked during shutdown",
                self.name
            );
        }
        self.state
            .store(LoggerState::Stopped as u8, Ordering::Release);

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            self.diagnostics.warn(format_args!(
                "Logger stopped with {} dropped entries (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            ));
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("queue_scheme", &self.queue.scheme())
            .field("capacity", &self.queue.capacity())
            .field("extras", &self.extras)
            .finish()
    }
}

/// Builder for constructing a [`Logger`]
///
/// # Example
/// ```
/// use fanout_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .name("worker")
///     .queue(QueueScheme::Bound, 100)
///     .severities([Severity::Info, Severity::Error])
///     .overflow_policy(OverflowPolicy::DropNewest)
///     .on_overflow(Arc::new(|count| eprintln!("{} entries dropped", count)))
///     .build()
///     .expect("logger");
///
/// assert!(logger.channel(Severity::Warning).is_err());
/// ```
pub struct LoggerBuilder {
    name: String,
    scheme: QueueScheme,
    capacity: usize,
    severities: Vec<Severity>,
    extras: Severity,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    on_diagnostic: Option<DiagnosticCallback>,
    outputs: Vec<(Severity, SharedOutput)>,
    shared_outputs: Vec<SharedOutput>,
    configure: Vec<(Severity, ChannelSetup)>,
}

type ChannelSetup = Box<dyn FnOnce(&Channel) -> Result<()> + Send>;

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            name: "logger".to_string(),
            scheme: QueueScheme::Bound,
            capacity: DEFAULT_CAPACITY,
            severities: Severity::ALL.to_vec(),
            extras: Severity::Info,
            overflow_policy: OverflowPolicy::Block,
            on_overflow: None,
            on_diagnostic: None,
            outputs: Vec::new(),
            shared_outputs: Vec::new(),
            configure: Vec::new(),
        }
    }

    /// Name rendered by the LoggerName field
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// A bound capacity must lie in `1..=MAX_CAPACITY`
    #[must_use = "builder methods return a new value"]
    pub fn queue(mut self, scheme: QueueScheme, capacity: usize) -> Self {
        self.scheme = scheme;
        self.capacity = capacity;
        self
    }

    /// Severities this logger has channels for; defaults to all
    #[must_use = "builder methods return a new value"]
    pub fn severities(mut self, severities: impl IntoIterator<Item = Severity>) -> Self {
        self.severities = severities.into_iter().collect();
        self
    }

    /// Channel used by severity-independent entries
    #[must_use = "builder methods return a new value"]
    pub fn extras_severity(mut self, severity: Severity) -> Self {
        self.extras = severity;
        self
    }

    /// What a push does when a bound queue is full; default [`OverflowPolicy::Block`]
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Called with the running total whenever a drop is alerted
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Receives rendering and output failures instead of stderr
    #[must_use = "builder methods return a new value"]
    pub fn on_diagnostic(mut self, callback: DiagnosticCallback) -> Self {
        self.on_diagnostic = Some(callback);
        self
    }

    /// Append an output to one severity's channel
    #[must_use = "builder methods return a new value"]
    pub fn output(mut self, severity: Severity, output: SharedOutput) -> Self {
        self.outputs.push((severity, output));
        self
    }

    /// Append an output to every supported severity's channel
    #[must_use = "builder methods return a new value"]
    pub fn output_all(mut self, output: SharedOutput) -> Self {
        self.shared_outputs.push(output);
        self
    }

    /// Adjust one severity's channel before the dispatcher starts
    ///
    /// An error returned by `configure` fails [`LoggerBuilder::build`].
    #[must_use = "builder methods return a new value"]
    pub fn configure_channel<F>(mut self, severity: Severity, configure: F) -> Self
    where
        F: FnOnce(&Channel) -> Result<()> + Send + 'static,
    {
        self.configure.push((severity, Box::new(configure)));
        self
    }

    pub fn build(self) -> Result<Arc<Logger>> {
        if self.name.is_empty() {
            return Err(LoggerError::config("Logger", "name must not be empty"));
        }
        if self.severities.is_empty() {
            return Err(LoggerError::config(
                "Logger",
                "at least one severity must be supported",
            ));
        }
        if !self.severities.contains(&self.extras) {
            return Err(LoggerError::config(
                "Logger",
                format!("extras severity {} is not a supported severity", self.extras),
            ));
        }

        let channels: ChannelTable = Severity::ALL.map(|severity| {
            self.severities
                .contains(&severity)
                .then(|| Channel::new(severity))
        });

        for (severity, output) in self.outputs {
            match channels[severity.index()] {
                Some(ref channel) => channel.configure(|config| {
                    let mut outputs = config.outputs().to_vec();
                    outputs.push(output);
                    config.set_outputs(outputs);
                }),
                None => {
                    return Err(LoggerError::config(
                        "Logger",
                        format!("output routed to unsupported severity {}", severity),
                    ));
                }
            }
        }
        for output in self.shared_outputs {
            for channel in channels.iter().flatten() {
                let output = Arc::clone(&output);
                channel.configure(|config| {
                    let mut outputs = config.outputs().to_vec();
                    outputs.push(output);
                    config.set_outputs(outputs);
                });
            }
        }
        for (severity, configure) in self.configure {
            match channels[severity.index()] {
                Some(ref channel) => configure(channel)?,
                None => return Err(LoggerError::UnsupportedSeverity(severity)),
            }
        }

        let name: Arc<str> = Arc::from(self.name);
        let channels = Arc::new(channels);
        let metrics = Arc::new(LoggerMetrics::new());
        let diagnostics = Diagnostics::new(Arc::clone(&name), self.on_diagnostic);

        let (queue, receiver) = Queue::new(
            self.scheme,
            self.capacity,
            self.overflow_policy,
            self.on_overflow,
            Arc::clone(&metrics),
            diagnostics.clone(),
        )?;

        let state = Arc::new(AtomicU8::new(LoggerState::Running as u8));
        let handle = Dispatcher::new(
            Arc::clone(&name),
            Arc::clone(&channels),
            receiver,
            Arc::clone(&metrics),
            diagnostics.clone(),
            Arc::clone(&state),
        )
        .spawn()?;

        Ok(Arc::new(Logger {
            name,
            channels,
            queue,
            extras: self.extras,
            state,
            dispatcher: Mutex::new(Some(handle)),
            metrics,
            diagnostics,
        }))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
