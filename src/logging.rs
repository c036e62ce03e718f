//! Logger initialization.
//!
//! Sets up the global tracing subscriber from the validated server
//! configuration: log lines go to the configured log file (stdout if the
//! file cannot be opened) at the configured level. A `RUST_LOG` environment
//! variable, when set, takes precedence over the configured level.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::ServerConfig;

/// Map a configured log level onto a tracing filter directive.
///
/// The configured level set carries `warning` and `fatal`, which tracing
/// spells `warn` and (at its most severe) `error`.
fn filter_directive(log_level: &str) -> &'static str {
    match log_level {
        "debug" => "debug",
        "warning" => "warn",
        "error" | "fatal" => "error",
        _ => "info",
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, after configuration has been validated and
/// before any component that logs. Opens the configured log file in append
/// mode; if that fails, logging falls back to stdout and a diagnostic is
/// printed, so a bad log path never takes the service down.
pub fn init(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&server.log_level)));

    let writer = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&server.log_file)
    {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(err) => {
            eprintln!(
                "error opening log file {}: {err}; defaulting to stdout",
                server.log_file
            );
            BoxMakeWriter::new(io::stdout)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();
}
