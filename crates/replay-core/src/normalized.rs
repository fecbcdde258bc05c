// ABOUTME: Cross-exchange normalized record types produced by mapper chains
// ABOUTME: Every variant carries at minimum `symbol` and `local_timestamp`
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trade execution, normalized across exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrade {
    pub exchange: String,
    pub symbol: String,
    pub local_timestamp: DateTime<Utc>,
    pub price: f64,
    pub amount: f64,
    pub side: TradeSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
    Unknown,
}

/// A top-of-book or full depth update, normalized across exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBookChange {
    pub exchange: String,
    pub symbol: String,
    pub local_timestamp: DateTime<Utc>,
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

/// A best-bid/ask ticker update, normalized across exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTicker {
    pub exchange: String,
    pub symbol: String,
    pub local_timestamp: DateTime<Utc>,
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
    pub last_price: Option<f64>,
}

/// Emitted by the normalizer in place of a batch of messages when the
/// capture-side connection dropped, if the caller opted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDisconnect {
    pub exchange: String,
    pub local_timestamp: DateTime<Utc>,
}

/// The union of everything a mapper chain can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Trade(NormalizedTrade),
    BookChange(NormalizedBookChange),
    Ticker(NormalizedTicker),
    Disconnect(NormalizedDisconnect),
}

impl NormalizedRecord {
    /// The symbol this record concerns, if it has one (disconnects don't).
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Trade(t) => Some(&t.symbol),
            Self::BookChange(b) => Some(&b.symbol),
            Self::Ticker(t) => Some(&t.symbol),
            Self::Disconnect(_) => None,
        }
    }

    #[must_use]
    pub fn local_timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Trade(t) => t.local_timestamp,
            Self::BookChange(b) => b.local_timestamp,
            Self::Ticker(t) => t.local_timestamp,
            Self::Disconnect(d) => d.local_timestamp,
        }
    }
}
