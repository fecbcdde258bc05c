// ABOUTME: Mapper for Bitfinex-shaped `{type, symbol, ...}` payloads
// ABOUTME: Bitfinex and bitfinex-derivatives are the non-filterable exchanges (see catalog)
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::mapper::Mapper;
use chrono::{DateTime, Utc};
use replay_core::{Filter, NormalizedRecord, NormalizedTicker, NormalizedTrade, TradeSide};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct BitfinexMapper;

impl BitfinexMapper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn record_type(payload: &Value) -> Option<&str> {
    payload.get("type").and_then(Value::as_str)
}

impl Mapper for BitfinexMapper {
    fn can_handle(&self, payload: &Value) -> bool {
        matches!(record_type(payload), Some("te" | "ticker"))
    }

    fn map(&mut self, payload: &Value, local_timestamp: DateTime<Utc>) -> Vec<NormalizedRecord> {
        let Some(symbol) = payload.get("symbol").and_then(Value::as_str) else {
            return Vec::new();
        };
        match record_type(payload) {
            Some("te") => {
                let (Some(price), Some(amount)) = (
                    payload.get("price").and_then(Value::as_f64),
                    payload.get("amount").and_then(Value::as_f64),
                ) else {
                    return Vec::new();
                };
                vec![NormalizedRecord::Trade(NormalizedTrade {
                    exchange: "bitfinex".into(),
                    symbol: symbol.to_owned(),
                    local_timestamp,
                    price,
                    amount: amount.abs(),
                    side: if amount >= 0.0 {
                        TradeSide::Buy
                    } else {
                        TradeSide::Sell
                    },
                })]
            }
            Some("ticker") => vec![NormalizedRecord::Ticker(NormalizedTicker {
                exchange: "bitfinex".into(),
                symbol: symbol.to_owned(),
                local_timestamp,
                best_bid: payload.get("bid").and_then(Value::as_f64),
                best_ask: payload.get("ask").and_then(Value::as_f64),
                last_price: payload.get("last_price").and_then(Value::as_f64),
            })],
            _ => Vec::new(),
        }
    }

    /// Bitfinex and bitfinex-derivatives are non-filterable: the caller
    /// still gets a `Filter` back (the channel name), but the replay driver
    /// must not forward it to the fetch worker — see
    /// `ExchangeCatalog::is_non_filterable`.
    fn filters(&self, _symbols: Option<&[String]>) -> Vec<Filter> {
        vec![Filter::new("trades", None), Filter::new("ticker", None)]
    }
}
