//! Shared helpers for integration tests

#![allow(dead_code)]

use fanout_logger::prelude::*;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Output that records everything it receives
#[derive(Default)]
pub struct CaptureOutput {
    entries: Mutex<Vec<(String, Option<Vec<u8>>)>>,
    styled: bool,
}

impl CaptureOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn styled() -> Arc<Self> {
        Arc::new(Self {
            styled: true,
            ..Self::default()
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(text, _)| text.clone()).collect()
    }

    pub fn raw(&self) -> Vec<Option<Vec<u8>>> {
        self.entries.lock().iter().map(|(_, raw)| raw.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Wait until at least `count` entries arrived
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.len() < count {
            if start.elapsed() > timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        true
    }
}

impl Output for CaptureOutput {
    fn write(&self, text: &str, raw: Option<&[u8]>) -> Result<()> {
        self.entries
            .lock()
            .push((text.to_string(), raw.map(<[u8]>::to_vec)));
        Ok(())
    }

    fn supports_style(&self) -> bool {
        self.styled
    }

    fn name(&self) -> &str {
        "capture"
    }
}

/// Output that blocks every write until opened
pub struct GateOutput {
    open: Mutex<bool>,
    opened: Condvar,
    pub inner: Arc<CaptureOutput>,
}

impl GateOutput {
    pub fn closed() -> Arc<Self> {
        Arc::new(Self {
            open: Mutex::new(false),
            opened: Condvar::new(),
            inner: CaptureOutput::new(),
        })
    }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }
}

impl Output for GateOutput {
    fn write(&self, text: &str, raw: Option<&[u8]>) -> Result<()> {
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
        drop(open);
        self.inner.write(text, raw)
    }

    fn name(&self) -> &str {
        "gate"
    }
}

/// Disable the timestamp and logger name on every channel
pub fn message_only(logger: &Logger) {
    for severity in Severity::ALL {
        if let Ok(channel) = logger.channel(severity) {
            channel.configure(|config| {
                config.field_mut(FieldKind::TimePoint).enabled = false;
                config.field_mut(FieldKind::LoggerName).enabled = false;
            });
        }
    }
}
