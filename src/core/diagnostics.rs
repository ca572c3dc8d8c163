//! Diagnostic channel for failures that must not reach producers
//!
//! Rendering and output failures happen on the dispatcher thread, where
//! there is no caller to return an error to. They are handed to a
//! user-supplied callback, or printed to stderr when none is installed.

use super::error::LoggerError;
use std::fmt;
use std::sync::Arc;

/// Receives every error the dispatcher recovers from
pub type DiagnosticCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

#[derive(Clone)]
pub struct Diagnostics {
    logger_name: Arc<str>,
    callback: Option<DiagnosticCallback>,
}

impl Diagnostics {
    pub fn new(logger_name: Arc<str>, callback: Option<DiagnosticCallback>) -> Self {
        Self {
            logger_name,
            callback,
        }
    }

    pub fn report(&self, error: &LoggerError) {
        match &self.callback {
            Some(callback) => callback(error),
            None => eprintln!("[LOGGER ERROR] {}: {}", self.logger_name, error),
        }
    }

    /// Conditions worth surfacing that are not errors of a single entry
    pub fn warn(&self, message: impl fmt::Display) {
        if self.callback.is_none() {
            eprintln!("[LOGGER WARNING] {}: {}", self.logger_name, message);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("logger_name", &self.logger_name)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
