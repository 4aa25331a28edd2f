//! Shared configuration for the xross dispatcher.
//!
//! [`Config`] is layered by `ortho_config`: built-in defaults, then an
//! optional configuration file, then `XROSS_*` environment variables, then
//! command-line flags. Applications embedding the dispatcher usually load it
//! once at start-up and hand it to their declared views and to the telemetry
//! initialiser.

mod defaults;
mod logging;
mod method;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_dispatch_log_level, default_http_method, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{DispatchLogLevel, DispatchLogLevelParseError, LogFormat, LogFormatParseError};
pub use method::{HttpMethod, HttpMethodParseError};

/// Runtime settings for views using operation dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "XROSS")]
pub struct Config {
    /// Reveal handler failure details in client error bodies.
    #[serde(default)]
    pub debug: bool,
    /// Request data source used when a view does not override it.
    #[serde(default = "default_http_method")]
    pub http_method: HttpMethod,
    /// Answer empty operation replies with Not Found.
    #[serde(default)]
    pub legacy_empty_not_found: bool,
    /// Filter expression for the tracing subscriber.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for the tracing subscriber.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Verbosity of the `xross::dispatch` target, layered over `log_filter`.
    #[serde(default = "default_dispatch_log_level")]
    pub dispatch_log_level: DispatchLogLevel,
}

impl Config {
    /// Whether client errors carry diagnostic bodies.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Request data source consulted by default.
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// Whether empty replies map to Not Found.
    #[must_use]
    pub const fn legacy_empty_not_found(&self) -> bool {
        self.legacy_empty_not_found
    }

    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Verbosity of the dispatch target.
    #[must_use]
    pub const fn dispatch_log_level(&self) -> DispatchLogLevel {
        self.dispatch_log_level
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            http_method: default_http_method(),
            legacy_empty_not_found: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            dispatch_log_level: default_dispatch_log_level(),
        }
    }
}
