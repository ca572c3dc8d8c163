//! Logging macros with deferred formatting.
//!
//! The format string and its arguments are captured as a [`Template`](crate::Template)
//! and substituted on the dispatcher thread, so emitting costs a copy of the
//! arguments rather than a `format!`. Placeholders are positional `{}`;
//! `{{` and `}}` produce literal braces.
//!
//! # Examples
//!
//! ```
//! use fanout_logger::prelude::*;
//! use fanout_logger::{info, error};
//!
//! let logger = Logger::create("app", QueueScheme::Bound, 64).expect("logger");
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! error!(logger, "User {} failed action: {}", 42, "login");
//! ```

/// Log a deferred-format message at a given severity.
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::create("doc", QueueScheme::Unbound, 0).expect("logger");
/// use fanout_logger::log;
/// log!(logger, Severity::Success, "Simple message");
/// log!(logger, Severity::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $logger.log(
            $severity,
            $crate::Template::new($fmt)$(.arg($arg))*,
        )
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a success message.
#[macro_export]
macro_rules! success {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Success, $($arg)+)
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warning, $($arg)+)
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Build an output list for [`Channel::set_outputs`](crate::Channel::set_outputs)
/// from shared outputs of any type. An output may appear more than once.
///
/// ```
/// # use fanout_logger::prelude::*;
/// use fanout_logger::outputs;
///
/// let debug = DebugOutput::create();
/// let custom = CustomOutput::create("null", |_, _| Ok(()));
/// let list = outputs![debug, custom, debug];
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! outputs {
    ($($output:expr),* $(,)?) => {
        ::std::vec![$(
            ::std::sync::Arc::clone(&$output) as $crate::SharedOutput
        ),*]
    };
}

/// Path of the enclosing function, e.g. `my_crate::net::connect`.
///
/// ```
/// fn connect() -> &'static str {
///     fanout_logger::function_name!()
/// }
/// assert!(connect().ends_with("connect"));
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Record the current location, with the enclosing function and an optional message.
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::create("doc", QueueScheme::Unbound, 0).expect("logger");
/// use fanout_logger::trace;
/// trace!(logger);
/// trace!(logger, "retrying after {} ms\n", 250);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr) => {
        $logger.trace_at(
            $crate::CallSite::capture().with_function($crate::function_name!()),
            None,
        )
    };
    ($logger:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $logger.trace_at(
            $crate::CallSite::capture().with_function($crate::function_name!()),
            Some($crate::Message::from($crate::Template::new($fmt)$(.arg($arg))*)),
        )
    };
}
