//! Diagnostics for `pathwise` commands.
//!
//! Every command writes its result to stdout and its diagnostics to stderr,
//! so `pathwise path --json` can be piped while generation progress and
//! oracle disagreements stay visible. `RUST_LOG` filters events (default
//! `info`) and `PATHWISE_LOG_FORMAT` picks plain lines or JSON objects. Span
//! close events carry timings for the generate and verify runs. Records from
//! the `log` facade are forwarded into the same subscriber.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Environment variable selecting the diagnostic format.
pub const PATHWISE_LOG_FORMAT: &str = "PATHWISE_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// How diagnostics are written to stderr.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Plain text, one line per event.
    #[default]
    Human,
    /// One JSON object per event, including the enclosing span list.
    Json,
}

impl LogFormat {
    /// Reads the format from [`PATHWISE_LOG_FORMAT`], defaulting to
    /// [`LogFormat::Human`] when the variable is unset.
    ///
    /// # Errors
    /// Returns [`LoggingError::InvalidUnicode`] or
    /// [`LoggingError::UnsupportedFormat`] for unusable values.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_var(env::var(PATHWISE_LOG_FORMAT))
    }

    fn from_var(value: Result<String, env::VarError>) -> Result<Self, LoggingError> {
        match value {
            Ok(raw) => raw.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(source @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
                name: PATHWISE_LOG_FORMAT,
                source,
            }),
        }
    }

    fn layer<S>(self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    {
        let layer = tracing_subscriber::fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr);
        match self {
            Self::Human => layer.boxed(),
            Self::Json => layer
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .boxed(),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    /// Accepts `human` or `json`, ignoring case and surrounding whitespace.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::UnsupportedFormat {
                provided: normalised,
            }),
        }
    }
}

/// Failure to set up diagnostics.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The format variable is not valid UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Variable name.
        name: &'static str,
        /// Reason the value could not be read.
        #[source]
        source: env::VarError,
    },
    /// The format variable names neither `human` nor `json`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Normalised value that was rejected.
        provided: String,
    },
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Rejection reported by the registry.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Sets up stderr diagnostics for the current process.
///
/// Calling it again, or after a test harness has installed its own
/// subscriber, leaves the existing subscriber in place and succeeds.
///
/// # Errors
/// Returns [`LoggingError`] when [`PATHWISE_LOG_FORMAT`] holds an unusable
/// value.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let format = LogFormat::from_env()?;
    if let Err(err) = install(format) {
        tracing::debug!(error = %err, "keeping the existing subscriber");
    }
    INSTALLED.get_or_init(|| ());
    Ok(())
}

fn install(format: LogFormat) -> Result<(), LoggingError> {
    if LogTracer::init().is_err() {
        tracing::debug!("log records are already forwarded elsewhere");
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(format.layer())
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("HUMAN", LogFormat::Human)]
    #[case(" json ", LogFormat::Json)]
    fn supported_formats_parse(#[case] raw: &str, #[case] expected: LogFormat) {
        let format: LogFormat = raw.parse().expect("format must parse");
        assert_eq!(format, expected);
    }

    #[test]
    fn unknown_format_is_rejected_in_normalised_form() {
        let err = " XML ".parse::<LogFormat>().expect_err("xml is not supported");
        match err {
            LoggingError::UnsupportedFormat { provided } => assert_eq!(provided, "xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case::unset(Err(env::VarError::NotPresent), LogFormat::Human)]
    #[case::json(Ok("json".to_owned()), LogFormat::Json)]
    fn format_variable_selects_output(
        #[case] value: Result<String, env::VarError>,
        #[case] expected: LogFormat,
    ) {
        let format = LogFormat::from_var(value).expect("value is usable");
        assert_eq!(format, expected);
    }

    #[test]
    fn empty_format_variable_is_rejected() {
        let err = LogFormat::from_var(Ok(String::new())).expect_err("empty is not a format");
        assert!(matches!(err, LoggingError::UnsupportedFormat { .. }));
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging().expect("logging must initialise");
        init_logging().expect("subsequent calls must be no-ops");
    }
}
