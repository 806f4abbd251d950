//! Logging initialization.
//!
//! Structured logging via `tracing` to stderr, human-readable or JSON,
//! with verbosity from `-v` flags and an override via
//! `PRIVCHAIN_LOG_LEVEL`.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "PRIVCHAIN_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Picks the filter: a non-blank, parseable `PRIVCHAIN_LOG_LEVEL` value
/// wins, otherwise the `-v` count decides.
fn build_filter(env_directive: Option<&str>, verbosity: u8) -> EnvFilter {
    env_directive
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Initializes the global tracing subscriber.
///
/// `PRIVCHAIN_LOG_LEVEL` takes precedence over `verbosity` when set.
/// Uses `try_init()`, so repeated calls are harmless.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let env_directive = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(env_directive.as_deref(), verbosity);

    let show_target = verbosity >= 2;

    let use_ansi = match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    match format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_default_is_human() {
        assert_eq!(LogFormat::default(), LogFormat::Human);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(LogFormat::Human, 0, ColorChoice::Auto);
        init_logging(LogFormat::Json, 3, ColorChoice::Never);
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(3), "trace");
        assert_eq!(verbosity_to_directive(255), "trace");
    }

    #[test]
    fn test_env_directive_overrides_verbosity() {
        let filter = build_filter(Some("privchain_core=debug"), 0);
        assert_eq!(filter.to_string(), "privchain_core=debug");
    }

    #[test]
    fn test_blank_or_invalid_env_directive_falls_back() {
        assert_eq!(build_filter(None, 1).to_string(), "info");
        assert_eq!(build_filter(Some("   "), 2).to_string(), "debug");
        assert_eq!(
            build_filter(Some("privchain_core=loud"), 0).to_string(),
            "warn"
        );
    }
}
