// ABOUTME: The central orchestrator — polls the cache index minute by minute and yields records
// ABOUTME: Built as a pull-based Stream via async-stream, so cancellation is just dropping it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::CacheIndex;
use crate::config::ReplayConfig;
use crate::fetch_worker;
use crate::slice_reader::{SliceLine, SliceReader};
use crate::validation::ValidatedReplayOptions;
use async_stream::try_stream;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use replay_core::{DecodedMessage, Job, RawMessage, RecordOrDisconnect, ReplayError, ReplayMessage, SliceKey};
use std::time::Duration;
use tracing::{debug, trace};

/// How long the wait loop sleeps between cache-index polls. The spec
/// preserves the original's fixed 100 ms delay rather than upgrading to a
/// notification channel — see the design notes on the polling protocol.
const WAIT_LOOP_DELAY: Duration = Duration::from_millis(100);

pub fn run(
    config: ReplayConfig,
    options: ValidatedReplayOptions,
) -> impl Stream<Item = Result<RecordOrDisconnect, ReplayError>> {
    try_stream! {
        let job = Job {
            cache_dir: config.cache_dir.clone(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            exchange: options.exchange.clone(),
            from: options.from,
            to: options.to,
            filters: options.filters.clone(),
        };

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|err| ReplayError::Configuration(err.to_string()))?;

        let cache_index = CacheIndex::new();
        let worker = fetch_worker::spawn(job, cache_index.clone(), client, config.max_concurrent_fetches);

        let mut current = SliceKey::minute_start(options.from);
        let end = SliceKey::minute_start(options.to);
        let mut last_emitted_was_disconnect = false;

        while current < end {
            let path = loop {
                if let Some(err) = worker.latched_error() {
                    Err(err)?;
                }
                if let Some(path) = cache_index.get(&current) {
                    break path;
                }
                trace!(slice = %current, "slice not yet cached, waiting");
                tokio::time::sleep(WAIT_LOOP_DELAY).await;
            };

            debug!(slice = %current, path = %path.display(), "opening slice");
            let mut reader = SliceReader::open(&path).await?;

            while let Some(line) = reader.next_line().await? {
                match line {
                    SliceLine::Disconnect => {
                        if options.return_disconnects_as_undefined && !last_emitted_was_disconnect {
                            yield RecordOrDisconnect::Disconnect;
                            last_emitted_was_disconnect = true;
                        }
                    }
                    SliceLine::Record { timestamp, payload } => {
                        let message = decode(timestamp, payload, options.skip_decoding)?;
                        yield RecordOrDisconnect::Record(message);
                        last_emitted_was_disconnect = false;
                    }
                }
            }

            if !reader.had_any_records()
                && options.return_disconnects_as_undefined
                && !last_emitted_was_disconnect
            {
                yield RecordOrDisconnect::Disconnect;
                last_emitted_was_disconnect = true;
            }

            cache_index.remove(&current);
            current = current.next();
        }

        worker.shutdown().await;
    }
}

fn decode(timestamp: &[u8], payload: &[u8], skip_decoding: bool) -> Result<ReplayMessage, ReplayError> {
    if skip_decoding {
        let mut local_timestamp = [0u8; crate::slice_reader::TIMESTAMP_WIDTH];
        local_timestamp.copy_from_slice(timestamp);
        return Ok(ReplayMessage::Raw(RawMessage {
            local_timestamp,
            message: payload.to_vec(),
        }));
    }

    let text = std::str::from_utf8(timestamp)
        .map_err(|err| ReplayError::Decode(format!("invalid timestamp bytes: {err}")))?
        .trim_end();
    let local_timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(text)
        .map_err(|err| ReplayError::Decode(format!("invalid timestamp '{text}': {err}")))?
        .with_timezone(&Utc);
    let message = serde_json::from_slice(payload)
        .map_err(|err| ReplayError::Decode(format!("invalid JSON payload: {err}")))?;

    Ok(ReplayMessage::Decoded(DecodedMessage {
        local_timestamp,
        message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_skip_decoding_preserves_bytes_verbatim() {
        let padded = format!("{:<28}", "2020-03-01T00:00:13.123Z");
        let message = decode(padded.as_bytes(), b"{\"a\":1}", true).unwrap();
        match message {
            ReplayMessage::Raw(raw) => {
                assert_eq!(&raw.local_timestamp, padded.as_bytes());
                assert_eq!(raw.message, b"{\"a\":1}");
            }
            ReplayMessage::Decoded(_) => panic!("expected raw"),
        }
    }

    #[test]
    fn decode_parses_timestamp_and_json() {
        let padded = format!("{:<28}", "2020-03-01T00:00:13.123Z");
        let message = decode(padded.as_bytes(), b"{\"a\":1}", false).unwrap();
        match message {
            ReplayMessage::Decoded(decoded) => {
                assert_eq!(decoded.local_timestamp.to_rfc3339(), "2020-03-01T00:00:13.123+00:00");
                assert_eq!(decoded.message, serde_json::json!({"a": 1}));
            }
            ReplayMessage::Raw(_) => panic!("expected decoded"),
        }
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let padded = format!("{:<28}", "2020-03-01T00:00:13.123Z");
        let err = decode(padded.as_bytes(), b"not json", false).unwrap_err();
        assert!(matches!(err, ReplayError::Decode(_)));
    }
}
