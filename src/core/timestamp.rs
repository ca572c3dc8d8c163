//! Timestamp layouts for the TimePoint field

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Layout used to render an entry's capture time
///
/// # Examples
///
/// ```
/// use fanout_logger::TimestampFormat;
/// use chrono::Utc;
///
/// let text = TimestampFormat::default().format(&Utc::now());
/// assert_eq!(text.len(), "2025-01-08 10:30:45.123".len());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08 10:30:45.123`
    #[default]
    Human,

    /// `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Seconds since the epoch
    Unix,

    /// Milliseconds since the epoch
    UnixMillis,

    /// Any strftime-compatible layout
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Human => datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    return TimestampFormat::Human.format(datetime);
                }
                out
            }
        }
    }

    /// Reject custom layouts chrono cannot format
    ///
    /// ```
    /// use fanout_logger::TimestampFormat;
    ///
    /// assert!(TimestampFormat::Custom("%H:%M".into()).validate().is_ok());
    /// assert!(TimestampFormat::Custom("%Q".into()).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let TimestampFormat::Custom(format_str) = self else {
            return Ok(());
        };
        if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "TimestampFormat",
                format!("invalid strftime layout '{}'", format_str),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_human_format() {
        assert_eq!(
            TimestampFormat::Human.format(&fixed_datetime()),
            "2025-01-08 10:30:45.123"
        );
    }

    #[test]
    fn test_iso8601_formats() {
        assert_eq!(
            TimestampFormat::Iso8601.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123Z"
        );
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(&fixed_datetime()),
            "2025-01-08T10:30:45.123456Z"
        );
    }

    #[test]
    fn test_unix_formats() {
        let secs: i64 = TimestampFormat::Unix
            .format(&fixed_datetime())
            .parse()
            .expect("valid unix timestamp");
        let millis: i64 = TimestampFormat::UnixMillis
            .format(&fixed_datetime())
            .parse()
            .expect("valid unix millis timestamp");
        assert_eq!(millis / 1000, secs);
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30");
    }

    #[test]
    fn test_invalid_custom_format() {
        let format = TimestampFormat::Custom("%Y %Q".to_string());
        assert!(matches!(
            format.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert_eq!(
            format.format(&fixed_datetime()),
            TimestampFormat::Human.format(&fixed_datetime())
        );
        assert!(TimestampFormat::Human.validate().is_ok());
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat =
            serde_json::from_str("\"Human\"").expect("deserialize Human");
        assert_eq!(format, TimestampFormat::Human);

        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
