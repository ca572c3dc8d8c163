//! # Fanout Logger
//!
//! An embeddable logging engine. Each [`Logger`] owns a queue, one channel
//! per supported severity and a dispatcher thread that renders entries and
//! fans them out to outputs.
//!
//! ## Features
//!
//! - **Backpressure**: bound queues block producers instead of dropping
//! - **Per-severity pipelines**: timestamp, name, severity and message fields
//!   with their own padding and VT styles
//! - **Live reconfiguration**: copy-on-write channel snapshots, never torn
//! - **Fan-out**: file, console, debug and custom outputs, shareable between loggers
//!
//! ```
//! use fanout_logger::prelude::*;
//! use fanout_logger::outputs;
//!
//! let logger = Logger::create("MiniLogger", QueueScheme::Bound, 128).expect("logger");
//! let console = ConsoleOutput::create(ConsoleConfig::default()).expect("console");
//!
//! logger
//!     .channel(Severity::Info)
//!     .expect("info channel")
//!     .set_outputs(outputs![console]);
//! logger.info(("value {}", 42));
//! ```

pub mod core;
pub mod macros;
pub mod outputs;

pub mod prelude {
    pub use crate::core::{
        CallSite, Channel, Effect, FieldKind, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, LoggerState, Message, Output, OverflowCallback, OverflowPolicy, Padding,
        Payload, QueueScheme, Result, Rgb, Severity, SharedOutput, Template, TimestampFormat,
        VtStyle,
    };
    pub use crate::outputs::{
        ConsoleConfig, ConsoleOutput, CustomOutput, DebugOutput, FileConfig, FileOutput, OpenMode,
        PathType,
    };
}

pub use crate::core::{
    CallSite, Channel, DiagnosticCallback, Effect, Entry, ErrorReport, FieldKind, FieldState,
    FormatArg, LogValue, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    LoggerState, Message, Output, OverflowCallback, OverflowPolicy, Padding, Payload, QueueScheme,
    Result, Rgb, Severity, SharedOutput, Template, TimestampFormat, VtStyle,
};
