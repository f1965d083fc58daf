//! Startup configuration
//!
//! The startup delay comes from three places, later ones winning:
//! 1. the built-in default (`120s`)
//! 2. the `START_TIME` environment variable, when set
//! 3. the `-t` command-line flag, when non-empty

pub mod duration;

pub use duration::{parse_duration, DurationError, StartupDelay};

use clap::Parser;
use thiserror::Error;
use tracing::info;

/// Default startup delay when neither the flag nor the environment sets one
pub const DEFAULT_STARTUP_DELAY: &str = "120s";

/// Environment variable holding the startup delay
pub const START_TIME_ENV: &str = "START_TIME";

/// Port the probe server listens on (HTTP, no TLS)
pub const HTTP_PORT: u16 = 8080;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "flipprobe")]
#[command(about = "Liveness and readiness probes that can be flipped over HTTP", long_about = None)]
pub struct Args {
    /// Startup delay duration (e.g., '30s', '2m')
    #[arg(short = 't', value_name = "DURATION")]
    pub startup_delay: Option<String>,
}

/// The startup delay could not be parsed
#[derive(Debug, Error)]
#[error("invalid format for startup delay '{input}': {source}. Please use format like '30s', '5m', '1h'")]
pub struct ConfigError {
    pub input: String,
    #[source]
    pub source: DurationError,
}

/// Resolved process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub startup_delay: StartupDelay,
}

impl Config {
    /// Build the config from parsed arguments and the process environment
    pub fn from_env(args: &Args) -> Result<Self, ConfigError> {
        let env = std::env::var(START_TIME_ENV).ok();
        Self::from_sources(args.startup_delay.as_deref(), env.as_deref())
    }

    /// Build the config from an explicit flag and environment value
    pub fn from_sources(flag: Option<&str>, env: Option<&str>) -> Result<Self, ConfigError> {
        let input = resolve_delay_input(flag, env);
        info!(startup_delay = %input, "Parsing startup delay");

        let startup_delay = parse_duration(input).map_err(|source| ConfigError {
            input: input.to_string(),
            source,
        })?;

        Ok(Self { startup_delay })
    }
}

/// Pick the delay string to parse: flag over environment over default
///
/// An empty flag counts as unset. A set-but-empty environment variable is
/// still used, and fails to parse.
pub fn resolve_delay_input<'a>(flag: Option<&'a str>, env: Option<&'a str>) -> &'a str {
    match (flag, env) {
        (Some(flag), _) if !flag.is_empty() => flag,
        (_, Some(env)) => env,
        _ => DEFAULT_STARTUP_DELAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_delay_is_120_seconds() {
        let config = Config::from_sources(None, None).expect("default must parse");
        assert_eq!(
            config.startup_delay.sleep_duration(),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_env_overrides_default() {
        let config = Config::from_sources(None, Some("5s")).expect("env must parse");
        assert_eq!(
            config.startup_delay.sleep_duration(),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_flag_overrides_env() {
        let config = Config::from_sources(Some("10s"), Some("5s")).expect("flag must parse");
        assert_eq!(
            config.startup_delay.sleep_duration(),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_empty_flag_falls_back_to_env() {
        assert_eq!(resolve_delay_input(Some(""), Some("5s")), "5s");
        assert_eq!(resolve_delay_input(Some(""), None), DEFAULT_STARTUP_DELAY);
    }

    #[test]
    fn test_empty_env_is_used_and_rejected() {
        assert_eq!(resolve_delay_input(None, Some("")), "");
        assert!(Config::from_sources(None, Some("")).is_err());
    }

    #[test]
    fn test_malformed_delay_in_either_source_is_an_error() {
        let from_env = Config::from_sources(None, Some("abc")).expect_err("abc is not a duration");
        assert_eq!(from_env.input, "abc");
        assert!(from_env.to_string().contains("'abc'"));

        let from_flag =
            Config::from_sources(Some("abc"), Some("5s")).expect_err("abc is not a duration");
        assert_eq!(from_flag.input, "abc");
    }

    #[test]
    fn test_args_parse_short_flag() {
        let args = Args::try_parse_from(["flipprobe", "-t", "30s"]).expect("valid args");
        assert_eq!(args.startup_delay.as_deref(), Some("30s"));

        let args = Args::try_parse_from(["flipprobe"]).expect("no args is valid");
        assert_eq!(args.startup_delay, None);
    }
}
