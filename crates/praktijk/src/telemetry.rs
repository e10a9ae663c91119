use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{value}' is not a valid tracing directive")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("global tracing subscriber could not be installed: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolve the active filter: `RUST_LOG` when set, otherwise the configured level.
pub fn filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::Filter {
        value: config.log_level.clone(),
        source,
    })
}

/// Install the process-wide fmt subscriber.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(config)?)
        .with_ansi(config.ansi)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Install)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: log_level.to_string(),
            ansi: false,
        }
    }

    #[test]
    fn configured_level_builds_a_filter() {
        std::env::remove_var("RUST_LOG");
        let filter = filter(&config("praktijk=debug,tower_http=info")).expect("valid filter");
        assert!(filter.to_string().contains("praktijk=debug"));
    }

    #[test]
    fn unparseable_level_is_reported_with_its_value() {
        std::env::remove_var("RUST_LOG");
        let err = filter(&config("praktijk=notalevel")).expect_err("filter should not parse");
        assert!(matches!(err, TelemetryError::Filter { .. }));
        assert!(err.to_string().contains("praktijk=notalevel"));
    }
}
