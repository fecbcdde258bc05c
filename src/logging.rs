// ABOUTME: Structured logging setup for the replay engine — level, format, and output destination
// ABOUTME: Initialized once per process; safe to call from a CLI main() or a library embedder's own init
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, good for local development.
    Pretty,
    /// One line per event, good for piping into another tool.
    Compact,
    /// Structured JSON, good for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive string, e.g. `"info"` or
    /// `"exchange_replay=debug,warn"`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

/// Initialize the global `tracing` subscriber. Call once, near the start of
/// `main`. Panics if a global subscriber is already set (that indicates a
/// programming error, not a runtime condition to recover from).
pub fn init(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
