//! Output backed by a user callback

use crate::core::{Output, Result};
use std::fmt;
use std::sync::Arc;

/// Receives the rendered text and the raw bytes of byte and value entries
pub type OutputCallback = Box<dyn Fn(&str, Option<&[u8]>) -> Result<()> + Send + Sync>;

/// Hands every rendered entry to a closure
///
/// ```
/// use fanout_logger::outputs::CustomOutput;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let seen = Arc::clone(&count);
/// let output = CustomOutput::create("counter", move |_text, _raw| {
///     seen.fetch_add(1, Ordering::Relaxed);
///     Ok(())
/// });
/// ```
pub struct CustomOutput {
    name: String,
    styled: bool,
    callback: OutputCallback,
}

impl CustomOutput {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str, Option<&[u8]>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            styled: false,
            callback: Box::new(callback),
        }
    }

    pub fn create<F>(name: impl Into<String>, callback: F) -> Arc<Self>
    where
        F: Fn(&str, Option<&[u8]>) -> Result<()> + Send + Sync + 'static,
    {
        Arc::new(Self::new(name, callback))
    }

    /// Receive text with VT sequences for styled fields
    #[must_use]
    pub fn with_style(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }
}

impl Output for CustomOutput {
    fn write(&self, text: &str, raw: Option<&[u8]>) -> Result<()> {
        (self.callback)(text, raw)
    }

    fn supports_style(&self) -> bool {
        self.styled
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomOutput")
            .field("name", &self.name)
            .field("styled", &self.styled)
            .finish()
    }
}
