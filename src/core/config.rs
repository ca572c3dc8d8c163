//! Declarative logger configuration
//!
//! A [`LoggerConfig`] describes everything about a logger except its outputs,
//! which are live objects. It can be loaded from JSON and turned into a
//! [`LoggerBuilder`] to which outputs are then attached.
//!
//! ```
//! use fanout_logger::prelude::*;
//!
//! let config = LoggerConfig::from_json_str(r#"{
//!     "name": "service",
//!     "queue": { "scheme": "Unbound" },
//!     "channels": [
//!         { "severity": "Error", "fields": { "TimePoint": { "enabled": false } } }
//!     ]
//! }"#).expect("config");
//!
//! let logger = config.builder().expect("builder").build().expect("logger");
//! assert_eq!(logger.name(), "service");
//! ```

use super::channel::ChannelConfig;
use super::error::{LoggerError, Result};
use super::field::{FieldKind, Padding, VtStyle};
use super::logger::LoggerBuilder;
use super::overflow_policy::OverflowPolicy;
use super::queue::{QueueScheme, DEFAULT_CAPACITY};
use super::severity::Severity;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub scheme: QueueScheme,
    /// Ignored for unbound queues
    pub capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            scheme: QueueScheme::Bound,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Changes to one field; absent values keep the channel's current state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub enabled: Option<bool>,
    pub padding: Option<Padding>,
    pub style_enabled: Option<bool>,
    pub style: Option<VtStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub severity: Severity,
    #[serde(default)]
    pub fields: BTreeMap<FieldKind, FieldSettings>,
    #[serde(default)]
    pub timestamp_format: Option<TimestampFormat>,
}

impl ChannelSettings {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            fields: BTreeMap::new(),
            timestamp_format: None,
        }
    }

    /// Fails for a timestamp layout chrono cannot format
    pub fn validate(&self) -> Result<()> {
        match self.timestamp_format {
            Some(ref format) => format.validate(),
            None => Ok(()),
        }
    }

    /// Write these settings into a channel configuration
    ///
    /// Nothing is written when the settings do not validate.
    pub fn apply(&self, config: &mut ChannelConfig) -> Result<()> {
        self.validate()?;
        for (kind, settings) in &self.fields {
            let field = config.field_mut(*kind);
            if let Some(enabled) = settings.enabled {
                field.enabled = enabled;
            }
            if let Some(padding) = settings.padding {
                field.padding = padding;
            }
            if let Some(enabled) = settings.style_enabled {
                field.style.enabled = enabled;
            }
            if let Some(style) = settings.style {
                field.style.style = style;
            }
        }
        if let Some(ref format) = self.timestamp_format {
            config.set_timestamp_format(format.clone())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub name: String,
    pub queue: QueueSettings,
    pub severities: Vec<Severity>,
    pub extras_severity: Severity,
    pub overflow_policy: OverflowPolicy,
    pub channels: Vec<ChannelSettings>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "logger".to_string(),
            queue: QueueSettings::default(),
            severities: Severity::ALL.to_vec(),
            extras_severity: Severity::Info,
            overflow_policy: OverflowPolicy::Block,
            channels: Vec::new(),
        }
    }
}

impl LoggerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A builder carrying this configuration
    ///
    /// Channel settings for a severity missing from `severities` are rejected.
    pub fn builder(&self) -> Result<LoggerBuilder> {
        let mut builder = LoggerBuilder::new()
            .name(self.name.clone())
            .queue(self.queue.scheme, self.queue.capacity)
            .severities(self.severities.iter().copied())
            .extras_severity(self.extras_severity)
            .overflow_policy(self.overflow_policy.clone());

        for settings in &self.channels {
            if !self.severities.contains(&settings.severity) {
                return Err(LoggerError::config(
                    "LoggerConfig",
                    format!(
                        "channel settings given for unsupported severity {}",
                        settings.severity
                    ),
                ));
            }
            settings.validate()?;
            let settings = settings.clone();
            builder = builder.configure_channel(settings.severity, move |channel| {
                channel.try_configure(|config| settings.apply(config))
            });
        }

        Ok(builder)
    }
}
