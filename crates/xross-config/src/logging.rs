//! Logging settings for applications serving xross views.
//!
//! Dispatch events are emitted under a dedicated `xross::dispatch` target.
//! [`DispatchLogLevel`] lets an application raise or silence that target
//! without rewriting its whole filter expression.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Verbosity of the dispatch target, layered over the general log filter.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DispatchLogLevel {
    /// Whatever the log filter already selects for the target.
    #[default]
    Inherit,
    /// No dispatch events.
    Off,
    /// Only errors.
    Error,
    /// Handler failures such as unknown operations or missing arguments.
    Warn,
    /// Informational events.
    Info,
    /// Operation selection and argument binding.
    Debug,
    /// Everything.
    Trace,
}

impl DispatchLogLevel {
    /// Level name for a filter directive, or `None` for
    /// [`DispatchLogLevel::Inherit`].
    #[must_use]
    pub const fn directive_level(self) -> Option<&'static str> {
        match self {
            Self::Inherit => None,
            Self::Off => Some("off"),
            Self::Error => Some("error"),
            Self::Warn => Some("warn"),
            Self::Info => Some("info"),
            Self::Debug => Some("debug"),
            Self::Trace => Some("trace"),
        }
    }
}

/// Errors encountered while parsing a [`DispatchLogLevel`] from text.
pub type DispatchLogLevelParseError = strum::ParseError;
