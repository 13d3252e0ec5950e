// Logger configuration and setup
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{ConfigError, TracingConfig};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid(format!(
                "tracing.format must be compact, pretty or json, got `{other}`"
            ))),
        }
    }
}

/// Parse the configured level, accepting what `tracing::Level` accepts
pub fn parse_level(s: &str) -> Result<Level, ConfigError> {
    Level::from_str(s)
        .map_err(|_| ConfigError::Invalid(format!("tracing.level `{s}` is not a log level")))
}

/// Initialize the global subscriber. `RUST_LOG` directives are layered on
/// top of the configured default level.
pub fn init_logger(format: LogFormat, level: Level) -> Result<(), ConfigError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let fmt_layer = match format {
        LogFormat::Compact => fmt::layer().with_target(false).compact().boxed(),
        LogFormat::Pretty => fmt::layer().with_target(false).pretty().boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(false)
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| ConfigError::Invalid(format!("logger already initialised: {e}")))
}

pub fn init_from_config(config: &TracingConfig) -> Result<(), ConfigError> {
    let format = config.format.parse()?;
    let level = parse_level(&config.level)?;
    init_logger(format, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!(parse_level("Debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("warn").unwrap(), Level::WARN);
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(matches!(
            "fancy".parse::<LogFormat>(),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(parse_level("loud"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_tracing_config_fails_init() {
        let config = TracingConfig {
            format: "compact".into(),
            level: "verbose".into(),
        };
        assert!(init_from_config(&config).is_err());
    }
}
