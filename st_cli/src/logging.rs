//! Structured logging configuration.
//!
//! Log records go to stderr so command output on stdout stays pipeable.
//! The engine logs through the `log` facade; the subscriber picks those
//! records up as well.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "warn,st_cli=info,swiss_tourney=info,sqlx=warn";

/// Initialize logging with levels from the RUST_LOG env var
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log how long a command took
///
/// # Arguments
///
/// * `command` - Command name
/// * `duration_ms` - Duration in milliseconds
pub fn log_command(command: &str, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            command = command,
            duration_ms = duration_ms,
            "Slow command"
        );
    } else {
        tracing::debug!(
            command = command,
            duration_ms = duration_ms,
            "Command completed"
        );
    }
}
