//! Logging setup using `tracing` and `tracing-subscriber`
//!
//! The library crates log through the `log` facade; the subscriber installed
//! here forwards those records as tracing events.
//!
//! # Log Levels
//!
//! - `warn`: skipped values, aborted aggregations (default)
//! - `info`: command progress (`-v`)
//! - `debug`: pipeline stages (`-vv`)
//! - `trace`: every evaluated expression (`-vvv`)

use tracing::Level;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 4] = ["blackboard", "blackboard_diagnostics", "blackboard_expr", "blackboard_model"];

/// Configuration for logging behavior
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Include the module path of each record
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Map the `-v` count to a level
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            with_target: verbosity > 1,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber, writing to stderr
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init()
}

/// `RUST_LOG` wins over the configured level
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    // Other crates stay at warn
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|name| format!("{name}={level}")));
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, Level::WARN)]
    #[case(1, Level::INFO)]
    #[case(2, Level::DEBUG)]
    #[case(5, Level::TRACE)]
    fn test_verbosity_levels(#[case] verbosity: u8, #[case] expected: Level) {
        assert_eq!(LogConfig::from_verbosity(verbosity).level, expected);
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,blackboard=debug,blackboard_diagnostics=debug,blackboard_expr=debug,blackboard_model=debug"
        );
    }
}
