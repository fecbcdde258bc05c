// ABOUTME: Error taxonomy for validation, fetch-worker, decode, and configuration failures
// ABOUTME: Mirrors the categories in the replay engine's failure semantics design
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use thiserror::Error;

/// Failures raised before a replay or stream is ever started.
///
/// Every variant names the offending field and the permitted values, per the
/// "human-readable message naming the offending field and permitted values"
/// requirement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown exchange '{exchange}', valid exchanges are: {valid}")]
    UnknownExchange { exchange: String, valid: String },

    #[error("invalid value for '{field}': '{value}' ({reason})")]
    InvalidDate {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("'to' ({to}) must be strictly after 'from' ({from})")]
    RangeNotPositive { from: String, to: String },

    #[error("unknown channel '{channel}' for exchange '{exchange}', valid channels are: {valid}")]
    UnknownChannel {
        exchange: String,
        channel: String,
        valid: String,
    },

    #[error("filter symbols must be an array of strings ({reason})")]
    InvalidSymbols { reason: String },

    #[error("at least one filter is required")]
    MissingFilters,

    #[error("at least one mapper is required for normalization")]
    NoMappers,
}

/// Fatal failures surfaced to the caller while a replay or stream is running.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Option validation failed before the worker was ever spawned.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The fetch worker latched a terminal error; this is the worker's
    /// original message, surfaced verbatim at the driver's next suspension.
    #[error("fetch worker failed: {0}")]
    Worker(String),

    /// Decompression, line-framing, or JSON decode failure while reading a
    /// cached slice.
    #[error("failed to decode slice: {0}")]
    Decode(String),

    /// Missing or invalid ambient configuration (e.g. no mappers supplied).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_exchange_names_valid_set() {
        let err = ValidationError::UnknownExchange {
            exchange: "coinbash".into(),
            valid: "binance, deribit, bitfinex".into(),
        };
        let message = err.to_string();
        assert!(message.contains("coinbash"));
        assert!(message.contains("binance"));
    }

    #[test]
    fn replay_error_preserves_worker_message() {
        let err = ReplayError::Worker("connection reset by peer".into());
        assert_eq!(err.to_string(), "fetch worker failed: connection reset by peer");
    }
}
