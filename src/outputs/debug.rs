//! Debug stream output
//!
//! Forwards rendered text to the process's diagnostic stream (stderr).
//! Failures are swallowed: a debug stream is best effort.

use crate::core::{Output, Result};
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct DebugOutput;

impl DebugOutput {
    pub fn new() -> Self {
        Self
    }

    pub fn create() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl Output for DebugOutput {
    fn write(&self, text: &str, _raw: Option<&[u8]>) -> Result<()> {
        let _ = io::stderr().lock().write_all(text.as_bytes());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _ = io::stderr().flush();
        Ok(())
    }

    fn name(&self) -> &str {
        "debug"
    }
}
