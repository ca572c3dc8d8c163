//! Console output

use crate::core::{LoggerError, Output, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Presentation of the console, fixed when the output is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Window title; empty leaves the title alone
    pub title: String,
    /// Preferred font, kept for terminals that can be told about it
    pub font: String,
    /// Pass VT escape sequences through to the terminal
    pub vt_enabled: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            font: String::new(),
            vt_enabled: true,
        }
    }
}

/// Writes rendered entries to standard output
pub struct ConsoleOutput {
    config: ConsoleConfig,
    target: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleOutput {
    pub fn new(config: ConsoleConfig) -> Result<Self> {
        Self::with_writer(config, Box::new(io::stdout()))
    }

    pub fn create(config: ConsoleConfig) -> Result<Arc<Self>> {
        Self::new(config).map(Arc::new)
    }

    /// Console output over an arbitrary writer
    pub fn with_writer(config: ConsoleConfig, mut target: Box<dyn Write + Send>) -> Result<Self> {
        if config.vt_enabled && !config.title.is_empty() {
            write!(target, "\x1b]0;{}\x07", config.title)
                .and_then(|()| target.flush())
                .map_err(|e| {
                    LoggerError::io_operation("set console title", "Failed to write title", e)
                })?;
        }
        Ok(Self {
            config,
            target: Mutex::new(target),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

impl Output for ConsoleOutput {
    fn write(&self, text: &str, _raw: Option<&[u8]>) -> Result<()> {
        let mut target = self.target.lock();
        target
            .write_all(text.as_bytes())
            .and_then(|()| target.flush())
            .map_err(|e| LoggerError::sink_write("console", e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        self.target.lock().flush()?;
        Ok(())
    }

    fn supports_style(&self) -> bool {
        self.config.vt_enabled
    }

    fn name(&self) -> &str {
        "console"
    }
}

impl fmt::Debug for ConsoleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleOutput")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    #[test]
    fn test_title_is_set_with_vt() {
        let buffer = Shared::default();
        let config = ConsoleConfig {
            title: "Demo".to_string(),
            font: "Consolas".to_string(),
            vt_enabled: true,
        };
        let console = ConsoleOutput::with_writer(config, Box::new(buffer.clone())).expect("console");

        assert!(console.supports_style());
        assert_eq!(buffer.text(), "\x1b]0;Demo\x07");
        console.write("line\n", None).expect("write");
        assert_eq!(buffer.text(), "\x1b]0;Demo\x07line\n");
        assert_eq!(console.config().font, "Consolas");
    }

    #[test]
    fn test_no_sequences_without_vt() {
        let buffer = Shared::default();
        let config = ConsoleConfig {
            title: "Ignored".to_string(),
            vt_enabled: false,
            ..ConsoleConfig::default()
        };
        let console = ConsoleOutput::with_writer(config, Box::new(buffer.clone())).expect("console");

        assert!(!console.supports_style());
        assert_eq!(buffer.text(), "");
    }
}
