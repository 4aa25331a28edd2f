use crate::logging::{DispatchLogLevel, LogFormat};
use crate::method::HttpMethod;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default verbosity of the dispatch target.
#[must_use]
pub const fn default_dispatch_log_level() -> DispatchLogLevel {
    DispatchLogLevel::Inherit
}

/// Default request data source for dispatch.
#[must_use]
pub const fn default_http_method() -> HttpMethod {
    HttpMethod::Get
}
