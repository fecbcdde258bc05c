// ABOUTME: End-to-end scenarios against the replay driver, seeding a warm cache to avoid real HTTP
// ABOUTME: Exercises ordering, disconnect coalescing, worker error surfacing, and normalization
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{TimeZone, Utc};
use exchange_replay::{
    replay, slice_path, Filter, Job, NormalizeOptions, ReplayConfig, ReplayError, SliceKey,
    ValidationError,
};
use futures_util::StreamExt;
use std::io::Write;
use std::path::Path;

fn gzip_lines(lines: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    for line in lines {
        body.extend_from_slice(line.as_bytes());
        body.push(b'\n');
    }
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&body).unwrap();
    encoder.finish().unwrap()
}

fn record_line(timestamp: &str, payload: &str) -> String {
    format!("{:<28} {payload}", timestamp)
}

async fn seed_slice(job: &Job, key: SliceKey, lines: &[&str]) {
    let path = slice_path(job, key);
    tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    tokio::fs::write(&path, gzip_lines(lines)).await.unwrap();
}

fn job_for(cache_dir: &Path, exchange: &str, from: chrono::DateTime<Utc>, to: chrono::DateTime<Utc>, filters: Vec<Filter>) -> Job {
    Job {
        cache_dir: cache_dir.to_path_buf(),
        endpoint: "https://unused.example.com".into(),
        api_key: String::new(),
        exchange: exchange.into(),
        from,
        to,
        filters,
    }
}

#[tokio::test]
async fn two_minute_happy_path_yields_records_in_order() {
    let cache = tempfile::tempdir().unwrap();
    let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2020, 3, 1, 0, 2, 0).unwrap();
    let filters = vec![Filter::new("trade", None)];
    let job = job_for(cache.path(), "binance", from, to, filters.clone());

    seed_slice(
        &job,
        SliceKey::minute_start(from),
        &[
            &record_line("2020-03-01T00:00:00.100Z", "{\"a\":1}"),
            &record_line("2020-03-01T00:00:00.500Z", "{\"a\":2}"),
        ],
    )
    .await;
    seed_slice(
        &job,
        SliceKey::minute_start(from).next(),
        &[&record_line("2020-03-01T00:01:00.000Z", "{\"a\":3}")],
    )
    .await;

    let config = ReplayConfig::builder().cache_dir(cache.path()).build();
    let options = exchange_replay::validation::ReplayOptions {
        exchange: "binance".into(),
        from: "2020-03-01T00:00:00Z".into(),
        to: "2020-03-01T00:02:00Z".into(),
        filters,
        skip_decoding: false,
        return_disconnects_as_undefined: false,
    };

    let stream = replay(config, options).unwrap();
    tokio::pin!(stream);
    let mut timestamps = Vec::new();
    while let Some(item) = stream.next().await {
        let record = item.unwrap();
        match record {
            exchange_replay::RecordOrDisconnect::Record(exchange_replay::ReplayMessage::Decoded(d)) => {
                timestamps.push(d.local_timestamp.to_rfc3339());
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    assert_eq!(timestamps.len(), 3);
    assert_eq!(timestamps[0], "2020-03-01T00:00:00.100+00:00");
    assert_eq!(timestamps[1], "2020-03-01T00:00:00.500+00:00");
    assert_eq!(timestamps[2], "2020-03-01T00:01:00+00:00");
}

#[tokio::test]
async fn empty_intermediate_slice_yields_one_disconnect() {
    let cache = tempfile::tempdir().unwrap();
    let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2020, 3, 1, 0, 3, 0).unwrap();
    let filters = vec![Filter::new("trade", None)];
    let job = job_for(cache.path(), "binance", from, to, filters.clone());

    let minute0 = SliceKey::minute_start(from);
    let minute1 = minute0.next();
    let minute2 = minute1.next();
    seed_slice(&job, minute0, &[&record_line("2020-03-01T00:00:00.000Z", "{\"a\":1}")]).await;
    seed_slice(&job, minute1, &[]).await;
    seed_slice(&job, minute2, &[&record_line("2020-03-01T00:02:00.000Z", "{\"a\":2}")]).await;

    let config = ReplayConfig::builder().cache_dir(cache.path()).build();
    let options = exchange_replay::validation::ReplayOptions {
        exchange: "binance".into(),
        from: "2020-03-01T00:00:00Z".into(),
        to: "2020-03-01T00:03:00Z".into(),
        filters,
        skip_decoding: false,
        return_disconnects_as_undefined: true,
    };

    let stream = replay(config, options).unwrap();
    tokio::pin!(stream);
    let mut shape = Vec::new();
    while let Some(item) = stream.next().await {
        shape.push(item.unwrap().is_disconnect());
    }

    assert_eq!(shape, vec![false, true, false]);
}

#[tokio::test]
async fn two_empty_slices_in_a_row_coalesce_to_one_sentinel() {
    let cache = tempfile::tempdir().unwrap();
    let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2020, 3, 1, 0, 4, 0).unwrap();
    let filters = vec![Filter::new("trade", None)];
    let job = job_for(cache.path(), "binance", from, to, filters.clone());

    let minutes: Vec<SliceKey> = (0..4)
        .scan(SliceKey::minute_start(from), |key, _| {
            let current = *key;
            *key = key.next();
            Some(current)
        })
        .collect();
    seed_slice(&job, minutes[0], &[&record_line("2020-03-01T00:00:00.000Z", "{\"a\":1}")]).await;
    seed_slice(&job, minutes[1], &[]).await;
    seed_slice(&job, minutes[2], &[]).await;
    seed_slice(&job, minutes[3], &[&record_line("2020-03-01T00:03:00.000Z", "{\"a\":2}")]).await;

    let config = ReplayConfig::builder().cache_dir(cache.path()).build();
    let options = exchange_replay::validation::ReplayOptions {
        exchange: "binance".into(),
        from: "2020-03-01T00:00:00Z".into(),
        to: "2020-03-01T00:04:00Z".into(),
        filters,
        skip_decoding: false,
        return_disconnects_as_undefined: true,
    };

    let stream = replay(config, options).unwrap();
    tokio::pin!(stream);
    let mut shape = Vec::new();
    while let Some(item) = stream.next().await {
        shape.push(item.unwrap().is_disconnect());
    }

    assert_eq!(shape, vec![false, true, false]);
}

#[tokio::test]
async fn worker_error_on_second_slice_surfaces_to_the_caller() {
    let cache = tempfile::tempdir().unwrap();
    let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2020, 3, 1, 0, 2, 0).unwrap();
    let filters = vec![Filter::new("trade", None)];
    let job = job_for(cache.path(), "binance", from, to, filters.clone());

    // Only the first minute is seeded; the second is left for the worker to
    // fetch from an endpoint nothing is listening on, so it fails fast.
    seed_slice(&job, SliceKey::minute_start(from), &[&record_line("2020-03-01T00:00:00.000Z", "{\"a\":1}")]).await;

    let config = ReplayConfig::builder()
        .cache_dir(cache.path())
        .endpoint("http://127.0.0.1:1")
        .build();
    let options = exchange_replay::validation::ReplayOptions {
        exchange: "binance".into(),
        from: "2020-03-01T00:00:00Z".into(),
        to: "2020-03-01T00:02:00Z".into(),
        filters,
        skip_decoding: false,
        return_disconnects_as_undefined: false,
    };

    let stream = replay(config, options).unwrap();
    tokio::pin!(stream);

    let first = stream.next().await.unwrap().unwrap();
    assert!(!first.is_disconnect());

    let second = tokio::time::timeout(std::time::Duration::from_secs(10), stream.next())
        .await
        .expect("driver should raise the worker error without hanging")
        .unwrap();
    assert!(matches!(second, Err(ReplayError::Worker(_))));
}

#[tokio::test]
async fn normalization_filters_by_symbol() {
    let cache = tempfile::tempdir().unwrap();
    let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2020, 3, 1, 0, 1, 0).unwrap();
    let filters = vec![Filter::new("trade", None)];
    let job = job_for(cache.path(), "binance", from, to, filters);

    let line = |symbol: &str, price: f64| {
        record_line(
            "2020-03-01T00:00:00.000Z",
            &format!(r#"{{"e":"trade","s":"{symbol}","p":"{price}","q":"1","m":false}}"#),
        )
    };
    seed_slice(
        &job,
        SliceKey::minute_start(from),
        &[&line("BTC-USD", 10000.0), &line("ETH-USD", 2000.0)],
    )
    .await;

    let config = ReplayConfig::builder().cache_dir(cache.path()).build();
    let options = NormalizeOptions {
        exchange: "binance".into(),
        from: "2020-03-01T00:00:00Z".into(),
        to: "2020-03-01T00:01:00Z".into(),
        symbols: Some(vec!["btc-usd".into()]),
        with_disconnect_messages: false,
    };
    let factories: Vec<exchange_replay::MapperFactory> = vec![Box::new(|| {
        Box::new(replay_mappers::binance::BinanceMapper::new()) as Box<dyn exchange_replay::Mapper>
    })];

    let stream = exchange_replay::replay_normalized(config, options, factories).unwrap();
    tokio::pin!(stream);
    let mut symbols = Vec::new();
    while let Some(item) = stream.next().await {
        let record = item.unwrap();
        if let Some(symbol) = record.symbol() {
            symbols.push(symbol.to_owned());
        }
    }

    assert_eq!(symbols, vec!["BTC-USD".to_owned()]);
}

#[tokio::test]
async fn unknown_exchange_validation_names_the_valid_set() {
    let config = ReplayConfig::default();
    let options = exchange_replay::validation::ReplayOptions {
        exchange: "unknown".into(),
        from: "2020-03-01".into(),
        to: "2020-03-02".into(),
        filters: vec![],
        skip_decoding: false,
        return_disconnects_as_undefined: false,
    };

    let err = replay(config, options).unwrap_err();
    match err {
        ValidationError::UnknownExchange { exchange, valid } => {
            assert_eq!(exchange, "unknown");
            assert!(valid.contains("binance"));
        }
        other => panic!("expected UnknownExchange, got {other:?}"),
    }
}
