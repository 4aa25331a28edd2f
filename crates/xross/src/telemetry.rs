//! Tracing subscriber set-up for applications serving xross views.
//!
//! The filter combines the configured `log_filter` expression with a
//! directive for [`DISPATCH_TARGET`] taken from the configured
//! [`DispatchLogLevel`](xross_config::DispatchLogLevel). The dispatch
//! directive is more specific than any crate-wide directive, so
//! `log_filter = "warn"` with `dispatch_log_level = "debug"` shows operation
//! selection and binding while keeping the rest of the application quiet.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::{self, MakeWriter};

use xross_config::{Config, LogFormat};

use crate::dispatch::DISPATCH_TARGET;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned once telemetry is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another global subscriber is already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

impl From<ParseError> for TelemetryError {
    fn from(error: ParseError) -> Self {
        Self::Filter(error.to_string())
    }
}

/// Installs the global tracing subscriber on first use.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the
/// global state.
///
/// # Errors
///
/// Fails when the filter is invalid or a foreign subscriber was installed
/// first.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config, io::stderr, io::stderr().is_terminal())?;
            tracing::subscriber::set_global_default(subscriber)
                .map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

/// Builds the event filter for `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `log_filter` does not parse.
pub fn build_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())?;
    let Some(level) = config.dispatch_log_level().directive_level() else {
        return Ok(filter);
    };
    let directive: Directive = format!("{DISPATCH_TARGET}={level}").parse()?;
    Ok(filter.add_directive(directive))
}

fn build_subscriber<W>(
    config: &Config,
    writer: W,
    ansi: bool,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt::Subscriber::builder()
        .with_env_filter(build_filter(config)?)
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
