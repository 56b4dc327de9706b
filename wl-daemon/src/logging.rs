//! Log setup: systemd journal when available, stdout otherwise

use tracing_subscriber::EnvFilter;
use wl_core::constants::paths;

/// Environment variable holding the log filter
pub const LOG_ENV_VAR: &str = "WATERLEVEL_LOG";

/// Where log output ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Journald,
    Stdout,
}

impl LogTarget {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Journald => "systemd journal",
            Self::Stdout => "stdout",
        }
    }
}

/// Install the global subscriber and return the log level in use
pub fn init() -> (LogTarget, String) {
    let log_level = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| "info".to_string());

    if std::path::Path::new(paths::JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                use tracing_subscriber::prelude::*;
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(EnvFilter::new(&log_level))
                    .init();
                return (LogTarget::Journald, log_level);
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::new(&log_level))
        .init();
    (LogTarget::Stdout, log_level)
}
