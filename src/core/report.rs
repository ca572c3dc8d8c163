//! Diagnostic reports for unrecoverable setup failures
//!
//! A report is assembled at the point of failure: the OS error is taken from
//! the `io::Error` that caused it rather than queried from process state
//! afterwards.

use super::callsite::CallSite;
use std::fmt;
use std::path::Path;

const RULE: &str = "-----------------------------------------------";

/// Platform error code and its description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsError {
    pub code: i32,
    pub description: String,
}

impl OsError {
    pub fn from_io(error: &std::io::Error) -> Option<Self> {
        error.raw_os_error().map(|code| Self {
            code,
            description: std::io::Error::from_raw_os_error(code).to_string(),
        })
    }
}

/// Human-readable failure report
#[derive(Debug, Clone)]
pub struct ErrorReport {
    message: String,
    os_error: Option<OsError>,
    location: CallSite,
    stack: Option<String>,
}

impl ErrorReport {
    /// Capture a report at the caller's location
    #[track_caller]
    pub fn capture(message: impl Into<String>, source: Option<&std::io::Error>) -> Self {
        Self {
            message: message.into(),
            os_error: source.and_then(OsError::from_io),
            location: CallSite::here(),
            stack: capture_stack(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn os_error(&self) -> Option<&OsError> {
        self.os_error.as_ref()
    }

    pub fn location(&self) -> &CallSite {
        &self.location
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// Write the report to a file, replacing any previous content
    pub fn persist(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_string())
    }
}

#[cfg(all(feature = "stacktrace", debug_assertions))]
fn capture_stack() -> Option<String> {
    Some(format!("{:?}", backtrace::Backtrace::new()))
}

#[cfg(not(all(feature = "stacktrace", debug_assertions)))]
fn capture_stack() -> Option<String> {
    None
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# Exception\n\n*Message:*\n`{}`", self.message)?;

        match &self.os_error {
            Some(os) => write!(
                f,
                "\n\n*Last Error Code:*\n- Value: {}\n- Description: `{}`",
                os.code, os.description
            )?,
            None => write!(f, "\n\n*Last Error Code:*\n- Value: none")?,
        }

        let file = if cfg!(debug_assertions) {
            self.location.file
        } else {
            self.location.file_name()
        };
        write!(
            f,
            "\n\n*Location:*\n- File: `{}`\n- Line: {}\n- Column: {}",
            file, self.location.line, self.location.column
        )?;
        if let Some(function) = &self.location.function {
            write!(f, "\n- Function: `{}`", function)?;
        }

        write!(f, "\n\n*StackTrace:*\n{}", RULE)?;
        match &self.stack {
            Some(stack) => write!(f, "\n{}", stack.trim_end())?,
            None => write!(f, "\n`StackTrace not captured in this build.`")?,
        }
        write!(f, "\n{}", RULE)
    }
}
