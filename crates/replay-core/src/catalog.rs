// ABOUTME: Fixed catalog of supported exchanges and their channel vocabularies
// ABOUTME: Backs §4.8 validation and the non-filterable-exchange rule in the normalizer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// The fixed catalog of exchange ids and per-exchange channel vocabularies
/// that replay/stream validation checks against.
///
/// Real deployments would load this from the `GET /v1/exchanges/{exchange}`
/// endpoint (see `exchange_replay::external`); a compiled-in fallback keeps
/// validation usable offline and in tests.
pub struct ExchangeCatalog;

struct ExchangeEntry {
    id: &'static str,
    channels: &'static [&'static str],
}

const EXCHANGES: &[ExchangeEntry] = &[
    ExchangeEntry {
        id: "binance",
        channels: &["trade", "depth", "ticker", "kline"],
    },
    ExchangeEntry {
        id: "deribit",
        channels: &["trades", "book", "ticker", "quote"],
    },
    ExchangeEntry {
        id: "bitfinex",
        channels: &["trades", "book", "ticker", "status"],
    },
    ExchangeEntry {
        id: "bitfinex-derivatives",
        channels: &["trades", "book", "ticker", "status", "liquidations"],
    },
];

/// Exchanges whose capture stream cannot be filtered server-side: the fetch
/// worker always retains the entire channel stream for these.
const NON_FILTERABLE_EXCHANGES: &[&str] = &["bitfinex", "bitfinex-derivatives"];

impl ExchangeCatalog {
    /// All known exchange ids, in catalog order.
    #[must_use]
    pub fn exchanges() -> Vec<&'static str> {
        EXCHANGES.iter().map(|e| e.id).collect()
    }

    #[must_use]
    pub fn is_known_exchange(exchange: &str) -> bool {
        EXCHANGES.iter().any(|e| e.id == exchange)
    }

    /// Channels valid for `exchange`, or `None` if the exchange itself is
    /// unknown.
    #[must_use]
    pub fn channels_for(exchange: &str) -> Option<&'static [&'static str]> {
        EXCHANGES
            .iter()
            .find(|e| e.id == exchange)
            .map(|e| e.channels)
    }

    #[must_use]
    pub fn is_known_channel(exchange: &str, channel: &str) -> bool {
        Self::channels_for(exchange).is_some_and(|channels| channels.contains(&channel))
    }

    /// Exchanges for which the entire channel stream is retained — no
    /// per-channel/per-symbol filters are sent to the fetch worker.
    #[must_use]
    pub fn is_non_filterable(exchange: &str) -> bool {
        NON_FILTERABLE_EXCHANGES.contains(&exchange)
    }

    /// A human-readable rendering of the known exchange ids, for error
    /// messages.
    #[must_use]
    pub fn exchanges_joined() -> String {
        Self::exchanges().join(", ")
    }

    /// A human-readable rendering of `exchange`'s channels, for error
    /// messages. Empty string if the exchange is unknown.
    #[must_use]
    pub fn channels_joined(exchange: &str) -> String {
        Self::channels_for(exchange)
            .map(|channels| channels.join(", "))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knows_binance_trade_channel() {
        assert!(ExchangeCatalog::is_known_channel("binance", "trade"));
        assert!(!ExchangeCatalog::is_known_channel("binance", "sleep"));
    }

    #[test]
    fn rejects_unknown_exchange() {
        assert!(!ExchangeCatalog::is_known_exchange("coinbash"));
        assert!(ExchangeCatalog::channels_for("coinbash").is_none());
    }

    #[test]
    fn bitfinex_family_is_non_filterable() {
        assert!(ExchangeCatalog::is_non_filterable("bitfinex"));
        assert!(ExchangeCatalog::is_non_filterable("bitfinex-derivatives"));
        assert!(!ExchangeCatalog::is_non_filterable("binance"));
    }
}
