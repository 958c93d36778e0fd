//! Tracing setup shared by the HTTP service and the one-shot CLI commands.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Where formatted events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Long-running service logs.
    Stdout,
    /// CLI commands print reports on stdout, so their logs stay out of the way.
    Stderr,
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}': {source}")]
    Filter { value: String, source: ParseError },
    #[error("tracing subscriber already installed: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Resolves the event filter. `RUST_LOG` wins over `APP_LOG_LEVEL`.
pub fn event_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::Filter {
        value: config.log_level.clone(),
        source,
    })
}

/// Installs the global fmt subscriber writing to `sink`.
pub fn init(config: &TelemetryConfig, sink: LogSink) -> Result<(), TelemetryError> {
    let filter = event_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false);

    let installed = match sink {
        LogSink::Stdout => builder.with_writer(std::io::stdout).try_init(),
        LogSink::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn invalid_level_reports_filter_value() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        match event_filter(&config("hr_insights=notalevel")) {
            Err(TelemetryError::Filter { value, .. }) => {
                assert_eq!(value, "hr_insights=notalevel")
            }
            other => panic!("expected filter error, got {other:?}"),
        }
    }

    #[test]
    fn configured_directives_become_the_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = event_filter(&config("hr_insights=debug,warn")).expect("valid filter");
        let rendered = filter.to_string();
        assert!(rendered.contains("hr_insights=debug"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn second_install_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let _ = init(&config("warn"), LogSink::Stderr);
        assert!(matches!(
            init(&config("warn"), LogSink::Stderr),
            Err(TelemetryError::Subscriber(_))
        ));
    }
}
