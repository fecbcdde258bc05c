// ABOUTME: Mapper for Deribit-shaped `{channel, data}` subscription payloads
// ABOUTME: Recognizes the `channel` field's `trades.`/`book.`/`ticker.` prefix
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::mapper::Mapper;
use chrono::{DateTime, Utc};
use replay_core::{
    Filter, NormalizedBookChange, NormalizedRecord, NormalizedTicker, NormalizedTrade, TradeSide,
};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct DeribitMapper;

impl DeribitMapper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn channel(payload: &Value) -> Option<&str> {
    payload.get("channel").and_then(Value::as_str)
}

fn parse_levels(data: &Value, field: &str) -> Vec<(f64, f64)> {
    data.get(field)
        .and_then(Value::as_array)
        .map(|levels| {
            levels
                .iter()
                .filter_map(|level| {
                    let pair = level.as_array()?;
                    let price = pair.first()?.as_f64()?;
                    let amount = pair.get(1)?.as_f64()?;
                    Some((price, amount))
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Mapper for DeribitMapper {
    fn can_handle(&self, payload: &Value) -> bool {
        channel(payload).is_some_and(|c| {
            c.starts_with("trades.") || c.starts_with("book.") || c.starts_with("ticker.")
        })
    }

    fn map(&mut self, payload: &Value, local_timestamp: DateTime<Utc>) -> Vec<NormalizedRecord> {
        let Some(ch) = channel(payload) else {
            return Vec::new();
        };
        if ch.starts_with("trades.") {
            let Some(entries) = payload.get("data").and_then(Value::as_array) else {
                return Vec::new();
            };
            entries
                .iter()
                .filter_map(|entry| {
                    let symbol = entry.get("instrument_name").and_then(Value::as_str)?;
                    let price = entry.get("price").and_then(Value::as_f64)?;
                    let amount = entry.get("amount").and_then(Value::as_f64)?;
                    let side = match entry.get("direction").and_then(Value::as_str) {
                        Some("buy") => TradeSide::Buy,
                        Some("sell") => TradeSide::Sell,
                        _ => TradeSide::Unknown,
                    };
                    Some(NormalizedRecord::Trade(NormalizedTrade {
                        exchange: "deribit".into(),
                        symbol: symbol.to_owned(),
                        local_timestamp,
                        price,
                        amount,
                        side,
                    }))
                })
                .collect()
        } else if ch.starts_with("book.") {
            let Some(data) = payload.get("data") else {
                return Vec::new();
            };
            let Some(symbol) = data.get("instrument_name").and_then(Value::as_str) else {
                return Vec::new();
            };
            vec![NormalizedRecord::BookChange(NormalizedBookChange {
                exchange: "deribit".into(),
                symbol: symbol.to_owned(),
                local_timestamp,
                bids: parse_levels(data, "bids"),
                asks: parse_levels(data, "asks"),
            })]
        } else {
            let Some(data) = payload.get("data") else {
                return Vec::new();
            };
            let Some(symbol) = data.get("instrument_name").and_then(Value::as_str) else {
                return Vec::new();
            };
            vec![NormalizedRecord::Ticker(NormalizedTicker {
                exchange: "deribit".into(),
                symbol: symbol.to_owned(),
                local_timestamp,
                best_bid: data.get("best_bid_price").and_then(Value::as_f64),
                best_ask: data.get("best_ask_price").and_then(Value::as_f64),
                last_price: data.get("last_price").and_then(Value::as_f64),
            })]
        }
    }

    fn filters(&self, symbols: Option<&[String]>) -> Vec<Filter> {
        let symbols = symbols.map(<[String]>::to_vec);
        vec![
            Filter::new("trades", symbols.clone()),
            Filter::new("book", symbols.clone()),
            Filter::new("ticker", symbols),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_trade_batch() {
        let mut mapper = DeribitMapper::new();
        let payload = json!({
            "channel": "trades.BTC-PERPETUAL.raw",
            "data": [
                {"instrument_name": "BTC-PERPETUAL", "price": 50000.0, "amount": 10.0, "direction": "sell"}
            ]
        });
        let records = mapper.map(&payload, Utc::now());
        assert_eq!(records.len(), 1);
        match &records[0] {
            NormalizedRecord::Trade(t) => assert_eq!(t.side, TradeSide::Sell),
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[test]
    fn ignores_non_matching_channel() {
        let mapper = DeribitMapper::new();
        assert!(!mapper.can_handle(&json!({"channel": "instrument_state.future.BTC"})));
    }
}
