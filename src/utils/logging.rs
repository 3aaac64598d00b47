//! Logging initialization
//!
//! Logs always go to stderr so command output on stdout stays machine readable.

use tracing_subscriber::EnvFilter;

use crate::domain::errors::DomainError;
use crate::ports::LogLevel;

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, json: bool) -> Result<(), DomainError> {
    let level = LogLevel::parse(level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| DomainError::ConfigInvalid(format!("Failed to initialize logging: {}", e)))
}
