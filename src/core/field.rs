//! Fields: the independently configurable parts of a rendered entry
//!
//! Every channel renders the same four fields in a fixed order. Only their
//! presence, padding and VT style can change.

use super::severity::Severity;
use colored::Color;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    TimePoint = 0,
    LoggerName = 1,
    Type = 2,
    Message = 3,
}

impl FieldKind {
    pub const COUNT: usize = 4;

    /// Render order
    pub const ALL: [FieldKind; FieldKind::COUNT] = [
        FieldKind::TimePoint,
        FieldKind::LoggerName,
        FieldKind::Type,
        FieldKind::Message,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Whitespace inserted around a field's text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub space_before: u16,
    pub break_before: u16,
    pub space_after: u16,
    pub break_after: u16,
}

impl Padding {
    pub const NONE: Padding = Padding {
        space_before: 0,
        break_before: 0,
        space_after: 0,
        break_after: 0,
    };

    pub fn space_after(count: u16) -> Self {
        Self {
            space_after: count,
            ..Self::NONE
        }
    }

    pub fn break_after(count: u16) -> Self {
        Self {
            break_after: count,
            ..Self::NONE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    fn color(self) -> Color {
        Color::TrueColor {
            r: self.red,
            g: self.green,
            b: self.blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Bold,
    Dimmed,
    Italic,
    Underline,
    Blink,
    Reversed,
    Strikethrough,
}

impl Effect {
    fn sgr_code(self) -> &'static str {
        match self {
            Effect::Bold => "1",
            Effect::Dimmed => "2",
            Effect::Italic => "3",
            Effect::Underline => "4",
            Effect::Blink => "5",
            Effect::Reversed => "7",
            Effect::Strikethrough => "9",
        }
    }
}

/// Terminal decoration of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VtStyle {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub effect: Option<Effect>,
}

impl VtStyle {
    pub fn fg(color: Rgb) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.effect.is_none()
    }

    /// Wrap `text` in SGR escape sequences
    pub fn apply(&self, text: &str) -> String {
        if self.is_plain() {
            return text.to_string();
        }

        let mut codes: Vec<Cow<'static, str>> = Vec::with_capacity(3);
        if let Some(effect) = self.effect {
            codes.push(Cow::Borrowed(effect.sgr_code()));
        }
        if let Some(fg) = self.fg {
            codes.push(fg.color().to_fg_str());
        }
        if let Some(bg) = self.bg {
            codes.push(bg.color().to_bg_str());
        }

        format!("\x1b[{}m{}\x1b[0m", codes.join(";"), text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleState {
    pub enabled: bool,
    pub style: VtStyle,
}

/// Complete state of one field in one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldState {
    pub enabled: bool,
    pub padding: Padding,
    pub style: StyleState,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            enabled: true,
            padding: Padding::NONE,
            style: StyleState::default(),
        }
    }
}

impl FieldState {
    /// Initial state of a field: one line per entry, fields separated by a space
    pub fn initial(kind: FieldKind, severity: Severity) -> Self {
        match kind {
            FieldKind::TimePoint | FieldKind::LoggerName => Self {
                padding: Padding::space_after(1),
                ..Self::default()
            },
            FieldKind::Type => Self {
                padding: Padding::space_after(1),
                style: StyleState {
                    enabled: false,
                    style: VtStyle::fg(severity.default_color()),
                },
                ..Self::default()
            },
            FieldKind::Message => Self {
                padding: Padding::break_after(1),
                ..Self::default()
            },
        }
    }

    /// Append this field's decorated text; disabled fields add nothing
    pub fn render_into(&self, out: &mut String, text: &str, styled: bool) {
        if !self.enabled {
            return;
        }
        push_repeated(out, '\n', self.padding.break_before);
        push_repeated(out, ' ', self.padding.space_before);
        if styled && self.style.enabled {
            out.push_str(&self.style.style.apply(text));
        } else {
            out.push_str(text);
        }
        push_repeated(out, ' ', self.padding.space_after);
        push_repeated(out, '\n', self.padding.break_after);
    }
}

fn push_repeated(out: &mut String, c: char, count: u16) {
    out.extend(std::iter::repeat(c).take(usize::from(count)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_around_text() {
        let field = FieldState {
            padding: Padding {
                space_before: 2,
                break_before: 1,
                space_after: 3,
                break_after: 2,
            },
            ..FieldState::default()
        };
        let mut out = String::new();
        field.render_into(&mut out, "x", false);
        assert_eq!(out, "\n  x   \n\n");
    }

    #[test]
    fn test_disabled_field_renders_nothing() {
        let field = FieldState {
            enabled: false,
            padding: Padding::break_after(4),
            ..FieldState::default()
        };
        let mut out = String::new();
        field.render_into(&mut out, "hidden", true);
        assert!(out.is_empty());
    }

    #[test]
    fn test_vt_style_sequence() {
        let style = VtStyle {
            fg: Some(Rgb::new(144, 225, 145)),
            bg: Some(Rgb::new(50, 20, 20)),
            effect: Some(Effect::Italic),
        };
        assert_eq!(
            style.apply("INFO"),
            "\x1b[3;38;2;144;225;145;48;2;50;20;20mINFO\x1b[0m"
        );
        assert_eq!(VtStyle::default().apply("INFO"), "INFO");
    }

    #[test]
    fn test_style_only_when_enabled_and_styled() {
        let mut field = FieldState::initial(FieldKind::Type, Severity::Error);
        let mut out = String::new();
        field.render_into(&mut out, "ERROR", true);
        assert_eq!(out, "ERROR ");

        field.style.enabled = true;
        out.clear();
        field.render_into(&mut out, "ERROR", false);
        assert_eq!(out, "ERROR ");

        out.clear();
        field.render_into(&mut out, "ERROR", true);
        assert!(out.starts_with("\x1b["));
        assert!(out.ends_with("ERROR\x1b[0m "));
    }

    #[test]
    fn test_padding_deserializes_partially() {
        let padding: Padding =
            serde_json::from_str(r#"{"space_after":3,"break_after":2}"#).expect("padding");
        assert_eq!(
            padding,
            Padding {
                space_after: 3,
                break_after: 2,
                ..Padding::NONE
            }
        );
    }
}
