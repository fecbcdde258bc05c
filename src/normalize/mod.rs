// ABOUTME: Wraps the replay driver with a mapper chain — normalization, filtering, disconnect reset
// ABOUTME: Forces return_disconnects_as_undefined=true internally so mapper resets never get missed
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod adapter;

use crate::config::ReplayConfig;
use crate::stream::{LiveFeed, DEFAULT_IDLE_TIMEOUT};
use crate::validation::ReplayOptions;
use futures_util::Stream;
use replay_core::{ExchangeCatalog, Filter, NormalizedRecord, ReplayError, ValidationError};
use replay_mappers::MapperFactory;

pub use adapter::{normalize, run};

/// Options accepted by [`replay_normalized`], prior to filter derivation.
pub struct NormalizeOptions {
    pub exchange: String,
    pub from: String,
    pub to: String,
    pub symbols: Option<Vec<String>>,
    pub with_disconnect_messages: bool,
}

/// Replay a historical range through a mapper chain, yielding
/// [`NormalizedRecord`] values. `mapper_factories` must be non-empty.
pub fn replay_normalized(
    config: ReplayConfig,
    options: NormalizeOptions,
    mapper_factories: Vec<MapperFactory>,
) -> Result<impl Stream<Item = Result<NormalizedRecord, ReplayError>>, ValidationError> {
    if mapper_factories.is_empty() {
        return Err(ValidationError::NoMappers);
    }

    let mut symbols = options.symbols.unwrap_or_default();
    for symbol in &mut symbols {
        *symbol = symbol.to_uppercase();
    }
    let symbols = (!symbols.is_empty()).then_some(symbols);

    let filters = derive_filters(&options.exchange, symbols.as_deref(), &mapper_factories);

    let replay_options = ReplayOptions {
        exchange: options.exchange.clone(),
        from: options.from,
        to: options.to,
        filters,
        skip_decoding: false,
        return_disconnects_as_undefined: true,
    };

    adapter::run(
        config,
        replay_options,
        options.exchange,
        symbols,
        options.with_disconnect_messages,
        mapper_factories,
    )
}

/// Stream a live feed through a mapper chain, yielding [`NormalizedRecord`]
/// values. Mirrors [`replay_normalized`]'s filter derivation and disconnect
/// handling exactly — §4.7 requires the two adapters share one pipeline.
pub fn stream_normalized(
    feed: Box<dyn LiveFeed>,
    exchange: String,
    symbols: Option<Vec<String>>,
    with_disconnect_messages: bool,
    mapper_factories: Vec<MapperFactory>,
) -> Result<impl Stream<Item = Result<NormalizedRecord, ReplayError>>, ValidationError> {
    if mapper_factories.is_empty() {
        return Err(ValidationError::NoMappers);
    }
    if !ExchangeCatalog::is_known_exchange(&exchange) {
        return Err(ValidationError::UnknownExchange {
            exchange,
            valid: ExchangeCatalog::exchanges_joined(),
        });
    }

    let mut symbols = symbols.unwrap_or_default();
    for symbol in &mut symbols {
        *symbol = symbol.to_uppercase();
    }
    let symbols = (!symbols.is_empty()).then_some(symbols);

    // Filters here are system-derived from the mapper chain, not supplied
    // by the caller, so the "at least one filter" rule in
    // `validation::validate_stream` (meant for the raw `stream()` entry
    // point) does not apply: a non-filterable exchange legitimately derives
    // zero filters and still retains its whole channel.
    let filters = derive_filters(&exchange, symbols.as_deref(), &mapper_factories);

    let inner = crate::stream::live_stream(feed, filters, DEFAULT_IDLE_TIMEOUT);
    Ok(normalize(inner, exchange, symbols, with_disconnect_messages, mapper_factories))
}

/// Exchanges whose stream is never filtered upstream — the full channel is
/// always retained and filtering, if any, happens only after normalization.
fn derive_filters(exchange: &str, symbols: Option<&[String]>, factories: &[MapperFactory]) -> Vec<Filter> {
    if replay_core::ExchangeCatalog::is_non_filterable(exchange) {
        return Vec::new();
    }
    factories
        .iter()
        .flat_map(|factory| factory().filters(symbols))
        .collect()
}
