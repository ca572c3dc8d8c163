//! Entry structure and payload rendering

use super::callsite::CallSite;
use super::error::LoggerError;
use super::format::Message;
use super::severity::Severity;
use super::value::TypedValue;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Bytes shown per line of a hex dump
pub const DUMP_WIDTH: usize = 16;

/// Longest text a spacer or sequence entry may expand to
pub const MAX_REPEATED_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Formatted(Message),
    Bytes {
        message: Option<Message>,
        data: Vec<u8>,
    },
    Trace {
        message: Option<Message>,
        site: CallSite,
    },
    Value(TypedValue),
    /// Blank lines, written verbatim
    Spacer(usize),
    /// `pattern` repeated `count` times, written verbatim
    Sequence { count: usize, pattern: Message },
}

impl Payload {
    pub fn message(message: impl Into<Message>) -> Self {
        match message.into() {
            Message::Text(text) => Payload::Text(text),
            formatted => Payload::Formatted(formatted),
        }
    }

    /// Raw payloads skip the field pipeline
    pub fn is_raw(&self) -> bool {
        matches!(self, Payload::Spacer(_) | Payload::Sequence { .. })
    }

    /// Captured bytes handed to outputs alongside the text
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes { data, .. } => Some(data),
            Payload::Value(value) => Some(&value.bytes),
            _ => None,
        }
    }

    /// Render the message body
    ///
    /// Formatting problems never abort rendering; they are returned next to
    /// the best-effort text.
    pub fn render(&self) -> (String, Option<LoggerError>) {
        match self {
            Payload::Text(text) => (text.clone(), None),
            Payload::Formatted(message) => message.render(),
            Payload::Bytes { message, data } => {
                let (mut text, error) = render_optional(message);
                text.push_str(&hex_dump(data));
                (text, error)
            }
            Payload::Trace { message, site } => {
                let (mut text, error) = render_optional(message);
                let _ = write!(text, "{}", site.resolved());
                (text, error)
            }
            Payload::Value(value) => (value.render(), None),
            Payload::Spacer(lines) => match repeat_bounded("\n", *lines) {
                Ok(text) => (text, None),
                Err(error) => (String::new(), Some(error)),
            },
            Payload::Sequence { count, pattern } => {
                let (unit, error) = pattern.render();
                match repeat_bounded(&unit, *count) {
                    Ok(text) => (text, error),
                    Err(error) => (String::new(), Some(error)),
                }
            }
        }
    }
}

/// `unit` repeated `count` times, refused past [`MAX_REPEATED_LEN`] bytes
fn repeat_bounded(unit: &str, count: usize) -> Result<String, LoggerError> {
    if unit.is_empty() || count == 0 {
        return Ok(String::new());
    }
    let len = unit
        .len()
        .checked_mul(count)
        .filter(|len| *len <= MAX_REPEATED_LEN)
        .ok_or_else(|| {
            LoggerError::render(format!(
                "{} repetitions of a {}-byte pattern exceed {} bytes",
                count,
                unit.len(),
                MAX_REPEATED_LEN
            ))
        })?;

    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|e| LoggerError::render(format!("cannot allocate {} bytes: {}", len, e)))?;
    for _ in 0..count {
        out.push_str(unit);
    }
    Ok(out)
}

fn render_optional(message: &Option<Message>) -> (String, Option<LoggerError>) {
    match message {
        Some(message) => message.render(),
        None => (String::new(), None),
    }
}

/// Fixed-width hex/ASCII dump, one line per [`DUMP_WIDTH`] bytes
///
/// `00000000  15 CD 5B 07 00 00 00 00  ...  |..[.....        |`
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(DUMP_WIDTH) * 80);

    for (row, chunk) in data.chunks(DUMP_WIDTH).enumerate() {
        if row > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:08X}  ", row * DUMP_WIDTH);

        for column in 0..DUMP_WIDTH {
            match chunk.get(column) {
                Some(byte) => {
                    let _ = write!(out, "{:02X} ", byte);
                }
                None => out.push_str("   "),
            }
            if column == DUMP_WIDTH / 2 - 1 {
                out.push(' ');
            }
        }

        out.push('|');
        for column in 0..DUMP_WIDTH {
            out.push(match chunk.get(column) {
                Some(byte) if byte.is_ascii_graphic() || *byte == b' ' => char::from(*byte),
                Some(_) => '.',
                None => ' ',
            });
        }
        out.push('|');
    }

    out
}

/// One log event, immutable once queued
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub payload: Payload,
}

impl Entry {
    /// Create an entry stamped with the current time
    pub fn new(severity: Severity, payload: Payload) -> Self {
        Self {
            severity,
            timestamp: Utc::now(),
            payload,
        }
    }
}
