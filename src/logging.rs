//! Logging setup: rolling file output with a console mirror.
//!
//! File output never uses ANSI colour. When `use_json` is set the file
//! layer emits one JSON object per line and the console mirror is
//! dropped, so log shippers see clean JSON.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

fn rotation_for(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Install the global subscriber. The returned guard must be held for
/// the lifetime of the process, or buffered log lines are lost on exit.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation_for(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // RUST_LOG overrides the config; disabling tracing silences this
    // crate while third-party crates keep the configured level.
    let fallback = if config.enable_tracing {
        EnvFilter::new(&config.log_level)
    } else {
        EnvFilter::new(format!("{},paper_exchange=off", config.log_level))
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or(fallback);

    let registry = tracing_subscriber::registry().with(filter);
    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(writer)
            .with_ansi(false);
        let console_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(console_layer).init();
    }

    guard
}
