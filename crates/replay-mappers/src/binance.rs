// ABOUTME: Mapper for Binance-shaped trade/depth/ticker payloads
// ABOUTME: Recognizes the `e` event-type discriminator Binance puts on every message
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
pub struct BinanceMapper;

impl BinanceMapper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn event_type(payload: &Value) -> Option<&str> {
    payload.get("e").and_then(Value::as_str)
}

fn parse_f64(payload: &Value, field: &str) -> Option<f64> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
}

fn parse_levels(payload: &Value, field: &str) -> Vec<(f64, f64)> {
    payload
        .get(field)
        .and_then(Value::as_array)
        .map(|levels| {
            levels
                .iter()
                .filter_map(|level| {
                    let pair = level.as_array()?;
                    let price = pair.first()?.as_str()?.parse::<f64>().ok()?;
                    let qty = pair.get(1)?.as_str()?.parse::<f64>().ok()?;
                    Some((price, qty))
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Mapper for BinanceMapper {
    fn can_handle(&self, payload: &Value) -> bool {
        matches!(event_type(payload), Some("trade" | "depthUpdate" | "24hrTicker"))
    }

    fn map(&mut self, payload: &Value, local_timestamp: DateTime<Utc>) -> Vec<NormalizedRecord> {
        let Some(symbol) = payload.get("s").and_then(Value::as_str) else {
            return Vec::new();
        };
        match event_type(payload) {
            Some("trade") => {
                let (Some(price), Some(amount)) =
                    (parse_f64(payload, "p"), parse_f64(payload, "q"))
                else {
                    return Vec::new();
                };
                let buyer_is_maker = payload.get("m").and_then(Value::as_bool).unwrap_or(false);
                vec![NormalizedRecord::Trade(NormalizedTrade {
                    exchange: "binance".into(),
                    symbol: symbol.to_owned(),
                    local_timestamp,
                    price,
                    amount,
                    side: if buyer_is_maker {
                        TradeSide::Sell
                    } else {
                        TradeSide::Buy
                    },
                })]
            }
            Some("depthUpdate") => vec![NormalizedRecord::BookChange(NormalizedBookChange {
                exchange: "binance".into(),
                symbol: symbol.to_owned(),
                local_timestamp,
                bids: parse_levels(payload, "b"),
                asks: parse_levels(payload, "a"),
            })],
            Some("24hrTicker") => vec![NormalizedRecord::Ticker(NormalizedTicker {
                exchange: "binance".into(),
                symbol: symbol.to_owned(),
                local_timestamp,
                best_bid: parse_f64(payload, "b"),
                best_ask: parse_f64(payload, "a"),
                last_price: parse_f64(payload, "c"),
            })],
            _ => Vec::new(),
        }
    }

    fn filters(&self, symbols: Option<&[String]>) -> Vec<Filter> {
        let symbols = symbols.map(<[String]>::to_vec);
        vec![
            Filter::new("trade", symbols.clone()),
            Filter::new("depth", symbols.clone()),
            Filter::new("ticker", symbols),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_trade_side_from_maker_flag() {
        let mut mapper = BinanceMapper::new();
        let payload = json!({"e": "trade", "s": "BTCUSDT", "p": "50000.5", "q": "0.1", "m": true});
        let now = Utc::now();
        let records = mapper.map(&payload, now);
        assert_eq!(records.len(), 1);
        match &records[0] {
            NormalizedRecord::Trade(t) => {
                assert_eq!(t.symbol, "BTCUSDT");
                assert_eq!(t.side, TradeSide::Sell);
                assert!((t.price - 50000.5).abs() < f64::EPSILON);
            }
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[test]
    fn ignores_unrecognized_event_types() {
        let mapper = BinanceMapper::new();
        assert!(!mapper.can_handle(&json!({"e": "aggTrade"})));
    }
}
