//! Call-site capture for trace entries and error reports
//!
//! The immediate caller (file, line, column) is always available through
//! `#[track_caller]`. With the `stacktrace` feature a capture also keeps the
//! return addresses of a few frames; they are turned into the enclosing
//! function name and one caller frame when the entry is rendered, on the
//! dispatcher thread.

use serde::Serialize;
use std::fmt;
use std::panic::Location;
#[cfg(feature = "stacktrace")]
use std::path::Path;

/// One resolved stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{} ({}:{})", function, self.file, self.line),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// Source location of a log call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
    pub function: Option<String>,
    pub caller: Option<Frame>,
    /// Unresolved return addresses, innermost first
    #[serde(skip)]
    pub(crate) frames: Vec<usize>,
}

impl CallSite {
    /// The location of the caller, without walking the stack
    #[track_caller]
    #[must_use]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
            function: None,
            caller: None,
            frames: Vec::new(),
        }
    }

    /// The location of the caller, plus what a later [`CallSite::resolved`] needs
    ///
    /// With the `stacktrace` feature this walks at most [`MAX_FRAMES`] frames
    /// and records their addresses. No symbols are looked up here.
    #[track_caller]
    #[must_use]
    pub fn capture() -> Self {
        #[allow(unused_mut)]
        let mut site = Self::here();
        #[cfg(feature = "stacktrace")]
        {
            site.frames = unresolved_frames();
        }
        site
    }

    /// A copy with the enclosing function and caller looked up from debug symbols
    #[must_use]
    pub fn resolved(&self) -> Self {
        let mut site = self.clone();
        if !site.frames.is_empty() {
            #[cfg(feature = "stacktrace")]
            site.resolve();
            site.frames.clear();
        }
        site
    }

    /// Attach a function name known at compile time
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// File name without its directories
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }

    #[cfg(feature = "stacktrace")]
    fn resolve(&mut self) {
        let mut matched = false;

        for &ip in &self.frames {
            for frame in symbols_at(ip) {
                if !matched {
                    if frame.line == self.line && Path::new(&frame.file).ends_with(self.file) {
                        if self.function.is_none() {
                            self.function = frame.function;
                        }
                        matched = true;
                    }
                    continue;
                }

                self.caller = Some(frame);
                return;
            }
        }
    }
}

/// Frames walked by [`CallSite::capture`]
pub const MAX_FRAMES: usize = 24;

#[cfg(feature = "stacktrace")]
fn unresolved_frames() -> Vec<usize> {
    let mut frames = Vec::with_capacity(MAX_FRAMES);
    backtrace::trace(|frame| {
        frames.push(frame.ip() as usize);
        frames.len() < MAX_FRAMES
    });
    frames
}

/// Source frames at one return address, innermost inlined frame first
#[cfg(feature = "stacktrace")]
fn symbols_at(ip: usize) -> Vec<Frame> {
    let mut frames = Vec::new();
    // A return address points past the call instruction
    let address = ip.saturating_sub(1) as *mut std::ffi::c_void;
    backtrace::resolve(address, |symbol| {
        if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
            frames.push(Frame {
                file: file.display().to_string(),
                line,
                function: symbol.name().map(|name| format!("{:#}", name)),
            });
        }
    });
    frames
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(function) = &self.function {
            write!(f, "{} ", function)?;
        }
        write!(f, "({}:{}:{})", self.file, self.line, self.column)?;
        if let Some(caller) = &self.caller {
            write!(f, "\n  called from {}", caller)?;
        }
        Ok(())
    }
}
