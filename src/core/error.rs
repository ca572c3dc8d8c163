//! Error types for the logger system

use super::report::ErrorReport;
use super::severity::Severity;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A logger or sink could not be brought up
    #[error("{0}")]
    Initialization(Box<ErrorReport>),

    /// Template placeholders and arguments disagree
    #[error("Format arity mismatch: {placeholders} placeholder(s), {arguments} argument(s)")]
    FormatArityMismatch { placeholders: usize, arguments: usize },

    /// An entry could not be turned into text
    #[error("Failed to render entry: {0}")]
    RenderFailure(String),

    /// Rendering an entry panicked; the entry was skipped
    #[error("Rendering a {severity} entry panicked: {message}")]
    RenderPanicked { severity: Severity, message: String },

    /// An output failed to accept a rendered entry
    #[error("Output '{sink}' failed to write: {message}")]
    SinkWriteFailure { sink: String, message: String },

    /// An output panicked while writing or flushing
    #[error("Output '{sink}' panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// The logger was not declared with this severity
    #[error("Severity {0} is not supported by this logger")]
    UnsupportedSeverity(Severity),

    /// Entries dropped by an opt-in overflow policy
    #[error("Log queue overflow: dropped {dropped_count} entries")]
    QueueOverflow { dropped_count: u64 },

    /// Logger is draining or stopped
    #[error("Logger already stopped")]
    LoggerStopped,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an initialization error carrying a full diagnostic report
    #[track_caller]
    pub fn initialization(message: impl Into<String>, source: Option<&std::io::Error>) -> Self {
        LoggerError::Initialization(Box::new(ErrorReport::capture(message, source)))
    }

    /// Create a format arity error
    pub fn format_arity(placeholders: usize, arguments: usize) -> Self {
        LoggerError::FormatArityMismatch {
            placeholders,
            arguments,
        }
    }

    /// Create a render failure
    pub fn render(message: impl Into<String>) -> Self {
        LoggerError::RenderFailure(message.into())
    }

    /// Create a sink write failure
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkWriteFailure {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a queue overflow error
    pub fn queue_overflow(dropped_count: u64) -> Self {
        LoggerError::QueueOverflow { dropped_count }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// The diagnostic report, for initialization failures
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            LoggerError::Initialization(report) => Some(report),
            _ => None,
        }
    }
}
