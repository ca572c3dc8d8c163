//! Core logger types and traits

pub mod callsite;
pub mod channel;
pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod field;
pub mod format;
pub mod logger;
pub mod metrics;
pub mod output;
pub mod overflow_policy;
pub mod queue;
pub mod report;
pub mod severity;
pub mod timestamp;
pub mod value;

pub use callsite::{CallSite, Frame};
pub use channel::{Channel, ChannelConfig, FieldHandle, Rendered, StyleHandle};
pub use config::{ChannelSettings, FieldSettings, LoggerConfig, QueueSettings};
pub use diagnostics::DiagnosticCallback;
pub use entry::{hex_dump, Entry, Payload};
pub use error::{LoggerError, Result};
pub use field::{Effect, FieldKind, FieldState, Padding, Rgb, StyleState, VtStyle};
pub use format::{FormatArg, Message, Template, MISSING_ARG_MARKER};
pub use logger::{Logger, LoggerBuilder, LoggerState};
pub use metrics::LoggerMetrics;
pub use output::{Output, SharedOutput};
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use queue::{QueueScheme, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use report::{ErrorReport, OsError};
pub use severity::Severity;
pub use timestamp::TimestampFormat;
pub use value::{LogValue, TypedValue, ValueKind};
