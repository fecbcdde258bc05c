// ABOUTME: Domain value types — SliceKey, Filter, Job, ReplayMessage, RecordOrDisconnect
// ABOUTME: Pure data, no I/O; Display/FromStr on SliceKey match the on-disk wire format exactly
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The ISO-8601 UTC minute boundary identifying a slice. Always
/// minute-aligned: constructing one truncates seconds/milliseconds away.
///
/// `Display` produces the exact 24-character `YYYY-MM-DDTHH:MM:SS.mmmZ` form
/// used both as the cache key and as the on-disk timestamp prefix format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SliceKey(DateTime<Utc>);

impl SliceKey {
    /// Truncate `at` down to the start of its UTC minute.
    #[must_use]
    pub fn minute_start(at: DateTime<Utc>) -> Self {
        Self::from_aligned(at)
    }

    #[must_use]
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// The next minute boundary after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + Duration::minutes(1))
    }

    /// Construct directly from an instant, truncating seconds and
    /// sub-second precision down to the containing minute boundary.
    #[must_use]
    pub fn from_aligned(at: DateTime<Utc>) -> Self {
        let truncated = at
            .with_second(0)
            .and_then(|d| d.with_nanosecond(0))
            .unwrap_or(at);
        Self(truncated)
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid SliceKey '{0}'")]
pub struct ParseSliceKeyError(String);

impl FromStr for SliceKey {
    type Err = ParseSliceKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|_| ParseSliceKeyError(s.to_owned()))?
            .with_timezone(&Utc);
        Ok(Self::from_aligned(parsed))
    }
}

/// A `(channel, symbols?)` selector applied to a replay or stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
}

impl Filter {
    #[must_use]
    pub fn new(channel: impl Into<String>, symbols: Option<Vec<String>>) -> Self {
        Self {
            channel: channel.into(),
            symbols,
        }
    }

    /// Upper-case symbols in place; mappers assume upper-case throughout.
    pub fn uppercase_symbols(&mut self) {
        if let Some(symbols) = &mut self.symbols {
            for symbol in symbols {
                *symbol = symbol.to_uppercase();
            }
        }
    }
}

/// The immutable parameters handed to the fetch worker at construction.
#[derive(Debug, Clone)]
pub struct Job {
    pub cache_dir: PathBuf,
    pub endpoint: String,
    pub api_key: String,
    pub exchange: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub filters: Vec<Filter>,
}

/// The local-capture timestamp plus payload, in either raw or decoded form.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayMessage {
    /// `skipDecoding = true`: byte-identical slices of the cache file.
    Raw(RawMessage),
    /// `skipDecoding = false`: parsed timestamp and JSON payload.
    Decoded(DecodedMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// The 28 ASCII timestamp bytes, verbatim.
    pub local_timestamp: [u8; 28],
    pub message: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub local_timestamp: DateTime<Utc>,
    pub message: serde_json::Value,
}

/// Widens [`ReplayMessage`] with an explicit disconnect sentinel, per the
/// `returnDisconnectsAsUndefined` contract.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOrDisconnect {
    Record(ReplayMessage),
    Disconnect,
}

impl RecordOrDisconnect {
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnect)
    }
}
