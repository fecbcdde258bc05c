// ABOUTME: Shared normalization pipeline driving both replayNormalized and streamNormalized
// ABOUTME: Rebuilds the mapper chain from its factories on every disconnect, per the reset contract
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ReplayConfig;
use crate::validation::ReplayOptions;
use async_stream::try_stream;
use chrono::{DateTime, Utc};
use futures_util::{pin_mut, Stream, StreamExt};
use replay_core::{NormalizedDisconnect, NormalizedRecord, RecordOrDisconnect, ReplayError, ReplayMessage, ValidationError};
use replay_mappers::{Mapper, MapperFactory};

/// Build the pipeline for a historical range: the replay driver's output,
/// run through the mapper chain.
pub fn run(
    config: ReplayConfig,
    replay_options: ReplayOptions,
    exchange: String,
    symbols: Option<Vec<String>>,
    with_disconnect_messages: bool,
    mapper_factories: Vec<MapperFactory>,
) -> Result<impl Stream<Item = Result<NormalizedRecord, ReplayError>>, ValidationError> {
    let inner = crate::replay::replay(config, replay_options)?;
    Ok(normalize(inner, exchange, symbols, with_disconnect_messages, mapper_factories))
}

/// Run any `RecordOrDisconnect` source — historical or live — through the
/// mapper chain. Exposed so the live stream adapter (§4.7) can reuse the
/// exact same normalization behavior its contract requires.
pub fn normalize<S>(
    source: S,
    exchange: String,
    symbols: Option<Vec<String>>,
    with_disconnect_messages: bool,
    mapper_factories: Vec<MapperFactory>,
) -> impl Stream<Item = Result<NormalizedRecord, ReplayError>>
where
    S: Stream<Item = Result<RecordOrDisconnect, ReplayError>>,
{
    try_stream! {
        let mut mappers = build_mappers(&mapper_factories);
        let mut last_seen: Option<DateTime<Utc>> = None;
        let mut messages_observed = false;

        pin_mut!(source);
        while let Some(item) = source.next().await {
            match item? {
                RecordOrDisconnect::Disconnect => {
                    mappers = build_mappers(&mapper_factories);
                    if with_disconnect_messages && messages_observed {
                        if let Some(local_timestamp) = last_seen {
                            yield NormalizedRecord::Disconnect(NormalizedDisconnect {
                                exchange: exchange.clone(),
                                local_timestamp,
                            });
                        }
                    }
                    messages_observed = false;
                }
                RecordOrDisconnect::Record(message) => {
                    let decoded = match message {
                        ReplayMessage::Decoded(decoded) => decoded,
                        ReplayMessage::Raw(_) => {
                            Err(ReplayError::Configuration(
                                "normalization requires decoded messages (skipDecoding must be false)".into(),
                            ))?;
                            unreachable!()
                        }
                    };
                    last_seen = Some(decoded.local_timestamp);
                    messages_observed = true;

                    for mapper in &mut mappers {
                        if !mapper.can_handle(&decoded.message) {
                            continue;
                        }
                        for record in mapper.map(&decoded.message, decoded.local_timestamp) {
                            if symbol_passes(&record, symbols.as_deref()) {
                                yield record;
                            }
                        }
                    }
                }
            }
        }
    }
}

fn build_mappers(factories: &[MapperFactory]) -> Vec<Box<dyn Mapper>> {
    factories.iter().map(|factory| factory()).collect()
}

fn symbol_passes(record: &NormalizedRecord, symbols: Option<&[String]>) -> bool {
    let Some(symbols) = symbols else {
        return true;
    };
    match record.symbol() {
        Some(symbol) => symbols.iter().any(|s| s == symbol),
        None => true,
    }
}
