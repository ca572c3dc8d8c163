//! Deferred message formatting
//!
//! A [`Template`] keeps its pattern and arguments apart until the dispatcher
//! renders it, so producers pay only for capturing the values. Placeholders
//! are positional `{}`; `{{` and `}}` produce literal braces.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered in place of a placeholder that has no argument
pub const MISSING_ARG_MARKER: &str = "{?}";

/// An owned argument captured at emit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormatArg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatArg::Int(v) => write!(f, "{}", v),
            FormatArg::UInt(v) => write!(f, "{}", v),
            FormatArg::Float(v) => write!(f, "{}", v),
            FormatArg::Bool(v) => write!(f, "{}", v),
            FormatArg::Char(v) => write!(f, "{}", v),
            FormatArg::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_arg {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for FormatArg {
                fn from(value: $source) -> Self {
                    FormatArg::$variant(value as $target)
                }
            }
        )+
    };
}

impl_from_arg!(Int as i64: i8, i16, i32, i64, isize);
impl_from_arg!(UInt as u64: u8, u16, u32, u64, usize);
impl_from_arg!(Float as f64: f32, f64);

impl From<bool> for FormatArg {
    fn from(value: bool) -> Self {
        FormatArg::Bool(value)
    }
}

impl From<char> for FormatArg {
    fn from(value: char) -> Self {
        FormatArg::Char(value)
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        FormatArg::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        FormatArg::Str(value)
    }
}

impl From<&String> for FormatArg {
    fn from(value: &String) -> Self {
        FormatArg::Str(value.clone())
    }
}

/// Best-effort output of a template whose arity did not match
#[derive(Debug, Clone, PartialEq)]
pub struct ArityMismatch {
    pub placeholders: usize,
    pub arguments: usize,
    pub rendered: String,
}

impl From<&ArityMismatch> for LoggerError {
    fn from(mismatch: &ArityMismatch) -> Self {
        LoggerError::format_arity(mismatch.placeholders, mismatch.arguments)
    }
}

/// A pattern with positional arguments, substituted at render time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pattern: String,
    args: Vec<FormatArg>,
}

impl Template {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<FormatArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<FormatArg>) -> Self {
        self.args = args;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn args(&self) -> &[FormatArg] {
        &self.args
    }

    /// Substitute arguments left to right
    ///
    /// On an arity mismatch the error still carries a rendered string:
    /// missing arguments show as [`MISSING_ARG_MARKER`] and surplus ones are
    /// appended as `{?+N}`.
    pub fn render(&self) -> std::result::Result<String, ArityMismatch> {
        let mut out = String::with_capacity(self.pattern.len() + self.args.len() * 8);
        let mut placeholders = 0;
        let mut chars = self.pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('{', Some('{')) => {
                    chars.next();
                    out.push('{');
                }
                ('}', Some('}')) => {
                    chars.next();
                    out.push('}');
                }
                ('{', Some('}')) => {
                    chars.next();
                    match self.args.get(placeholders) {
                        Some(arg) => {
                            use fmt::Write;
                            let _ = write!(out, "{}", arg);
                        }
                        None => out.push_str(MISSING_ARG_MARKER),
                    }
                    placeholders += 1;
                }
                _ => out.push(c),
            }
        }

        if placeholders == self.args.len() {
            return Ok(out);
        }
        if self.args.len() > placeholders {
            out.push_str(&format!(" {{?+{}}}", self.args.len() - placeholders));
        }
        Err(ArityMismatch {
            placeholders,
            arguments: self.args.len(),
            rendered: out,
        })
    }
}

/// Message text of an entry: verbatim or a deferred template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Text(String),
    Formatted(Template),
}

impl Message {
    /// Render to text, reporting an arity mismatch alongside the best-effort result
    pub fn render(&self) -> (String, Option<LoggerError>) {
        match self {
            Message::Text(text) => (text.clone(), None),
            Message::Formatted(template) => match template.render() {
                Ok(text) => (text, None),
                Err(mismatch) => {
                    let error = LoggerError::from(&mismatch);
                    (mismatch.rendered, Some(error))
                }
            },
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<char> for Message {
    fn from(c: char) -> Self {
        Message::Text(c.to_string())
    }
}

impl From<Template> for Message {
    fn from(template: Template) -> Self {
        Message::Formatted(template)
    }
}

impl<A: Into<FormatArg>> From<(&str, A)> for Message {
    fn from((pattern, arg): (&str, A)) -> Self {
        Message::Formatted(Template::new(pattern).arg(arg))
    }
}

impl<A: Into<FormatArg>, B: Into<FormatArg>> From<(&str, A, B)> for Message {
    fn from((pattern, a, b): (&str, A, B)) -> Self {
        Message::Formatted(Template::new(pattern).arg(a).arg(b))
    }
}
