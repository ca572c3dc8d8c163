//! Per-severity channels: field pipeline, output list and live reconfiguration
//!
//! The configuration of a channel is an immutable [`ChannelConfig`] behind an
//! `Arc`. Readers clone the `Arc` under a read lock; writers clone the
//! config, modify the copy and swap it in under the write lock. The lock is
//! never held while rendering or writing to an output, and a render always
//! works from a single version.

use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::field::{FieldKind, FieldState, Padding, VtStyle};
use super::output::SharedOutput;
use super::severity::Severity;
use super::timestamp::TimestampFormat;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// One version of a channel's configuration
#[derive(Clone)]
pub struct ChannelConfig {
    version: u64,
    fields: [FieldState; FieldKind::COUNT],
    outputs: Vec<SharedOutput>,
    timestamp_format: TimestampFormat,
}

impl ChannelConfig {
    fn initial(severity: Severity) -> Self {
        Self {
            version: 0,
            fields: FieldKind::ALL.map(|kind| FieldState::initial(kind, severity)),
            outputs: Vec::new(),
            timestamp_format: TimestampFormat::default(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn field(&self, kind: FieldKind) -> &FieldState {
        &self.fields[kind.index()]
    }

    pub fn field_mut(&mut self, kind: FieldKind) -> &mut FieldState {
        &mut self.fields[kind.index()]
    }

    pub fn outputs(&self) -> &[SharedOutput] {
        &self.outputs
    }

    /// Replace the output list; duplicates receive the entry once per occurrence
    pub fn set_outputs(&mut self, outputs: impl IntoIterator<Item = SharedOutput>) {
        self.outputs = outputs.into_iter().collect();
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    /// Fails for a custom layout chrono cannot format, leaving the current one
    pub fn set_timestamp_format(&mut self, format: TimestampFormat) -> Result<()> {
        format.validate()?;
        self.timestamp_format = format;
        Ok(())
    }

    /// Whether any output would receive a styled rendering that differs from the plain one
    pub fn needs_styled(&self) -> bool {
        self.outputs.iter().any(|output| output.supports_style())
            && self
                .fields
                .iter()
                .any(|field| field.enabled && field.style.enabled && !field.style.style.is_plain())
    }

    /// Render an entry with this configuration
    pub fn render(&self, logger_name: &str, entry: &Entry) -> Rendered {
        let (message, error) = entry.payload.render();

        if entry.payload.is_raw() {
            return Rendered {
                plain: message,
                styled: None,
                error,
            };
        }

        let texts: [String; FieldKind::COUNT] = [
            self.timestamp_format.format(&entry.timestamp),
            logger_name.to_string(),
            entry.severity.to_str().to_string(),
            message,
        ];

        let assemble = |styled: bool| {
            let mut out = String::with_capacity(texts.iter().map(String::len).sum::<usize>() + 8);
            for kind in FieldKind::ALL {
                self.field(kind)
                    .render_into(&mut out, &texts[kind.index()], styled);
            }
            out
        };

        Rendered {
            plain: assemble(false),
            styled: self.needs_styled().then(|| assemble(true)),
            error,
        }
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("version", &self.version)
            .field("fields", &self.fields)
            .field(
                "outputs",
                &self.outputs.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .field("timestamp_format", &self.timestamp_format)
            .finish()
    }
}

/// Result of rendering one entry
#[derive(Debug)]
pub struct Rendered {
    pub plain: String,
    /// Present when at least one output takes VT sequences and a field is styled
    pub styled: Option<String>,
    pub error: Option<LoggerError>,
}

impl Rendered {
    /// Text to hand to an output
    pub fn for_output(&self, supports_style: bool) -> &str {
        match (&self.styled, supports_style) {
            (Some(styled), true) => styled,
            _ => &self.plain,
        }
    }
}

/// The formatting and routing pipeline of one severity
pub struct Channel {
    severity: Severity,
    config: RwLock<Arc<ChannelConfig>>,
}

impl Channel {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            config: RwLock::new(Arc::new(ChannelConfig::initial(severity))),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The current configuration; stays valid however the channel changes afterwards
    pub fn snapshot(&self) -> Arc<ChannelConfig> {
        self.config.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.config.read().version
    }

    /// Apply several changes as one new version
    pub fn configure<F>(&self, update: F)
    where
        F: FnOnce(&mut ChannelConfig),
    {
        let mut guard = self.config.write();
        let mut next = (**guard).clone();
        update(&mut next);
        next.version = guard.version + 1;
        *guard = Arc::new(next);
    }

    /// Like [`Channel::configure`], but nothing changes when `update` fails
    pub fn try_configure<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut ChannelConfig) -> Result<()>,
    {
        let mut guard = self.config.write();
        let mut next = (**guard).clone();
        update(&mut next)?;
        next.version = guard.version + 1;
        *guard = Arc::new(next);
        Ok(())
    }

    /// Replace the output list
    pub fn set_outputs(&self, outputs: impl IntoIterator<Item = SharedOutput>) {
        let outputs: Vec<SharedOutput> = outputs.into_iter().collect();
        self.configure(move |config| config.outputs = outputs);
    }

    pub fn outputs(&self) -> Vec<SharedOutput> {
        self.snapshot().outputs.clone()
    }

    pub fn set_timestamp_format(&self, format: TimestampFormat) -> Result<()> {
        self.try_configure(move |config| config.set_timestamp_format(format))
    }

    pub fn field(&self, kind: FieldKind) -> FieldHandle<'_> {
        FieldHandle {
            channel: self,
            kind,
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("severity", &self.severity)
            .field("config", &self.snapshot())
            .finish()
    }
}

/// Configuration handle for one field of one channel
#[derive(Clone, Copy)]
pub struct FieldHandle<'a> {
    channel: &'a Channel,
    kind: FieldKind,
}

impl<'a> FieldHandle<'a> {
    fn update(&self, update: impl FnOnce(&mut FieldState)) {
        let kind = self.kind;
        self.channel
            .configure(move |config| update(config.field_mut(kind)));
    }

    pub fn state(&self) -> FieldState {
        *self.channel.snapshot().field(self.kind)
    }

    pub fn enable(&self) {
        self.update(|field| field.enabled = true);
    }

    /// Hide the field and its padding; the padding is kept for re-enabling
    pub fn disable(&self) {
        self.update(|field| field.enabled = false);
    }

    pub fn set_padding(&self, padding: Padding) {
        self.update(move |field| field.padding = padding);
    }

    pub fn style(&self) -> StyleHandle<'a> {
        StyleHandle {
            channel: self.channel,
            kind: self.kind,
        }
    }
}

/// Configuration handle for the VT style of one field
#[derive(Clone, Copy)]
pub struct StyleHandle<'a> {
    channel: &'a Channel,
    kind: FieldKind,
}

impl StyleHandle<'_> {
    fn update(&self, update: impl FnOnce(&mut FieldState)) {
        let kind = self.kind;
        self.channel
            .configure(move |config| update(config.field_mut(kind)));
    }

    pub fn enable(&self) {
        self.update(|field| field.style.enabled = true);
    }

    pub fn disable(&self) {
        self.update(|field| field.style.enabled = false);
    }

    pub fn set(&self, style: VtStyle) {
        self.update(move |field| field.style.style = style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Payload;
    use crate::core::error::Result;
    use crate::core::output::Output;
    use chrono::TimeZone;

    struct Styled;

    impl Output for Styled {
        fn write(&self, _text: &str, _raw: Option<&[u8]>) -> Result<()> {
            Ok(())
        }

        fn supports_style(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "styled"
        }
    }

    fn entry(severity: Severity, payload: Payload) -> Entry {
        Entry {
            severity,
            timestamp: chrono::Utc
                .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
                .single()
                .expect("valid datetime"),
            payload,
        }
    }

    #[test]
    fn test_default_render() {
        let channel = Channel::new(Severity::Info);
        let rendered = channel
            .snapshot()
            .render("MiniLogger", &entry(Severity::Info, Payload::message("info text 1")));
        assert_eq!(rendered.plain, "2025-01-08 10:30:45.000 MiniLogger INFO info text 1\n");
        assert!(rendered.styled.is_none());
        assert!(rendered.error.is_none());
    }

    #[test]
    fn test_disable_and_reenable_restores_padding() {
        let channel = Channel::new(Severity::Warning);
        let name = channel.field(FieldKind::LoggerName);
        name.set_padding(Padding {
            break_before: 2,
            space_after: 10,
            ..Padding::NONE
        });
        name.disable();

        let e = entry(Severity::Warning, Payload::message("w"));
        let rendered = channel.snapshot().render("L", &e);
        assert_eq!(rendered.plain, "2025-01-08 10:30:45.000 WARNING w\n");

        name.enable();
        let rendered = channel.snapshot().render("L", &e);
        assert_eq!(
            rendered.plain,
            format!("2025-01-08 10:30:45.000 \n\nL{}WARNING w\n", " ".repeat(10))
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_changes() {
        let channel = Channel::new(Severity::Info);
        let before = channel.snapshot();
        channel.field(FieldKind::Message).disable();

        assert!(before.field(FieldKind::Message).enabled);
        assert!(!channel.snapshot().field(FieldKind::Message).enabled);
        assert_eq!(channel.version(), before.version() + 1);
    }

    #[test]
    fn test_configure_is_one_version() {
        let channel = Channel::new(Severity::Success);
        channel.configure(|config| {
            config.field_mut(FieldKind::TimePoint).enabled = false;
            config.field_mut(FieldKind::Type).enabled = false;
            config.set_outputs(vec![Arc::new(Styled) as SharedOutput]);
        });
        assert_eq!(channel.version(), 1);
        assert_eq!(channel.outputs().len(), 1);
    }

    #[test]
    fn test_invalid_timestamp_layout_leaves_channel_unchanged() {
        let channel = Channel::new(Severity::Info);
        let result = channel.set_timestamp_format(TimestampFormat::Custom("%Q".to_string()));
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
        assert_eq!(channel.version(), 0);

        let result = channel.try_configure(|config| {
            config.field_mut(FieldKind::Type).enabled = false;
            config.set_timestamp_format(TimestampFormat::Custom("%H %Q".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(channel.version(), 0);
        assert!(channel.snapshot().field(FieldKind::Type).enabled);

        channel
            .set_timestamp_format(TimestampFormat::Custom("%H:%M".to_string()))
            .expect("valid layout");
        assert_eq!(channel.version(), 1);
    }

    #[test]
    fn test_styled_rendering_only_for_style_outputs() {
        let channel = Channel::new(Severity::Error);
        let e = entry(Severity::Error, Payload::message("boom"));

        channel.field(FieldKind::Type).style().enable();
        assert!(channel.snapshot().render("L", &e).styled.is_none());

        channel.set_outputs(vec![Arc::new(Styled) as SharedOutput]);
        let rendered = channel.snapshot().render("L", &e);
        let styled = rendered.styled.as_deref().expect("styled variant");
        assert!(styled.contains("\x1b["));
        assert_eq!(rendered.for_output(false), rendered.plain);
        assert_eq!(rendered.for_output(true), styled);
    }

    #[test]
    fn test_raw_payload_bypasses_fields() {
        let channel = Channel::new(Severity::Info);
        let rendered = channel.snapshot().render("L", &entry(Severity::Info, Payload::Spacer(2)));
        assert_eq!(rendered.plain, "\n\n");
    }

    #[test]
    fn test_format_mismatch_is_reported_not_fatal() {
        let channel = Channel::new(Severity::Info);
        let payload = Payload::message(crate::core::format::Template::new("{} {}").arg(1));
        let rendered = channel.snapshot().render("L", &entry(Severity::Info, payload));
        assert!(rendered.plain.ends_with("INFO 1 {?}\n"));
        assert!(matches!(
            rendered.error,
            Some(LoggerError::FormatArityMismatch { .. })
        ));
    }
}
