//! Severity definitions

use super::field::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub const COUNT: usize = 4;

    pub const ALL: [Severity; Severity::COUNT] = [
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::Error,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    /// Slot of this severity in a per-severity array
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Foreground colour of the Type field when its style is first enabled
    pub fn default_color(&self) -> Rgb {
        match self {
            Severity::Info => Rgb::new(97, 175, 239),
            Severity::Success => Rgb::new(152, 195, 121),
            Severity::Warning => Rgb::new(229, 192, 123),
            Severity::Error => Rgb::new(224, 108, 117),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Ok(Severity::Info),
            "SUCCESS" => Ok(Severity::Success),
            "WARN" | "WARNING" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            _ => Err(format!("Invalid severity: '{}'", s)),
        }
    }
}
