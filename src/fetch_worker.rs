// ABOUTME: Reference Fetch Worker — downloads/caches slices on a background task, contract only
// ABOUTME: Out of scope per the core design (§4.4); this implementation exists so the crate runs end-to-end
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::CacheIndex;
use futures_util::stream::{self, StreamExt};
use replay_core::{Filter, Job, ReplayError, SliceKey};
use reqwest::Client;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};
use url::Url;

/// Handle to a running fetch worker. Dropping this without calling
/// [`WorkerHandle::shutdown`] leaves the background task running —
/// cancellation is explicit and cooperative, per §5.
pub struct WorkerHandle {
    error: Arc<StdMutex<Option<String>>>,
    cancel_tx: watch::Sender<bool>,
    join_handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// The worker's latched terminal error, if any has occurred yet.
    #[must_use]
    pub fn latched_error(&self) -> Option<ReplayError> {
        self.error
            .lock()
            .expect("fetch worker error mutex poisoned")
            .clone()
            .map(ReplayError::Worker)
    }

    /// Signal the worker to stop issuing new fetches and await its exit.
    /// Cooperative: in-flight HTTP bodies are allowed to finish draining to
    /// disk so no partially-written cache file is ever observed.
    pub async fn shutdown(self) {
        let _ = self.cancel_tx.send(true);
        if let Err(err) = self.join_handle.await {
            warn!(error = %err, "fetch worker task panicked during shutdown");
        }
    }
}

impl Drop for WorkerHandle {
    /// Rust has no async `Drop`: if the driver's stream is abandoned
    /// mid-iteration instead of running to completion, this is the only
    /// cancellation signal the worker ever sees. It stops the worker from
    /// issuing new fetches; in-flight ones still finish and publish
    /// atomically, they are just never awaited here.
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Spawn the fetch worker on its own Tokio task. The worker resolves each
/// minute in `job`'s range from disk if already cached, else downloads it,
/// writes it to a temp file, and atomically renames it into place before
/// announcing it — the driver's cache index never observes a partially
/// written file.
pub fn spawn(job: Job, index: CacheIndex, client: Client, max_concurrent: usize) -> WorkerHandle {
    let error = Arc::new(StdMutex::new(None));
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let error_for_task = error.clone();
    let join_handle = tokio::spawn(run(job, index, client, max_concurrent.max(1), error_for_task, cancel_rx));

    WorkerHandle {
        error,
        cancel_tx,
        join_handle,
    }
}

async fn run(
    job: Job,
    index: CacheIndex,
    client: Client,
    max_concurrent: usize,
    error: Arc<StdMutex<Option<String>>>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let minutes = minute_range(job.from, job.to);
    let job = Arc::new(job);

    let mut fetches = stream::iter(minutes.into_iter().map(|key| {
        let job = job.clone();
        let client = client.clone();
        async move { fetch_one(&client, &job, key).await.map(|path| (key, path)) }
    }))
    .buffer_unordered(max_concurrent);

    loop {
        tokio::select! {
            biased;
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    debug!("fetch worker received cancellation, stopping");
                    break;
                }
            }
            next = fetches.next() => {
                match next {
                    Some(Ok((key, path))) => {
                        debug!(%key, path = %path.display(), "slice ready");
                        index.insert(key, path);
                    }
                    Some(Err(err)) => {
                        warn!(error = %err, "fetch worker latched a terminal error");
                        *error.lock().expect("fetch worker error mutex poisoned") = Some(err.to_string());
                        break;
                    }
                    None => {
                        info!("fetch worker exhausted job range");
                        break;
                    }
                }
            }
        }
    }
}

fn minute_range(from: chrono::DateTime<chrono::Utc>, to: chrono::DateTime<chrono::Utc>) -> Vec<SliceKey> {
    let mut keys = Vec::new();
    let mut cursor = SliceKey::minute_start(from);
    let end = SliceKey::minute_start(to);
    while cursor < end {
        keys.push(cursor);
        cursor = cursor.next();
    }
    keys
}

/// Deterministic cache path for one slice: identity is
/// `(exchange, filter-set hash, SliceKey)`.
fn slice_dir(job: &Job) -> PathBuf {
    job.cache_dir.join(&job.exchange).join(filter_set_hash(&job.filters))
}

/// The on-disk path a slice would be cached at for `job`. Exposed so tests
/// can pre-populate a warm cache without performing a real HTTP fetch — the
/// worker's idempotency check (a file already present is never
/// re-downloaded) makes this a legitimate way to seed fixtures.
#[must_use]
pub fn slice_path(job: &Job, key: SliceKey) -> PathBuf {
    slice_dir(job).join(format!("{key}.json.gz"))
}

/// Builds the download URL for one slice, treating `job.endpoint` as a
/// directory rather than string-concatenating a path onto it.
fn data_feed_url(job: &Job, key: SliceKey) -> Result<Url, ReplayError> {
    let base = format!("{}/", job.endpoint.trim_end_matches('/'));
    Url::parse(&base)
        .and_then(|base| base.join(&format!("v1/data-feeds/{}/{key}", job.exchange)))
        .map_err(|err| ReplayError::Worker(format!("invalid endpoint {}: {err}", job.endpoint)))
}

fn filter_set_hash(filters: &[Filter]) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for filter in filters {
        filter.channel.hash(&mut hasher);
        filter.symbols.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

async fn fetch_one(client: &Client, job: &Job, key: SliceKey) -> Result<PathBuf, ReplayError> {
    let dir = slice_dir(job);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|err| ReplayError::Worker(format!("creating cache dir {}: {err}", dir.display())))?;
    let path = dir.join(format!("{key}.json.gz"));

    // Idempotency: a slice already on disk is never re-downloaded.
    if tokio::fs::metadata(&path).await.is_ok() {
        return Ok(path);
    }

    let url = data_feed_url(job, key)?;
    let mut request = client.get(url.clone());
    if !job.api_key.is_empty() {
        request = request.bearer_auth(&job.api_key);
    }

    let response = request
        .send()
        .await
        .map_err(|err| ReplayError::Worker(format!("requesting {url}: {err}")))?;

    if !response.status().is_success() {
        return Err(ReplayError::Worker(format!(
            "unexpected status {} for {url}",
            response.status()
        )));
    }

    let tmp_path = dir.join(format!("{key}.json.gz.tmp"));
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(|err| ReplayError::Worker(format!("creating {}: {err}", tmp_path.display())))?;

    // StreamReader turns the chunked HTTP body into an AsyncRead so the
    // download can be piped straight to disk with tokio::io::copy instead
    // of a hand-rolled chunk loop.
    let body = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(|err| std::io::Error::new(ErrorKind::Other, err)));
    let mut body = StreamReader::new(body);
    tokio::io::copy(&mut body, &mut file)
        .await
        .map_err(|err| ReplayError::Worker(format!("streaming {url}: {err}")))?;
    file.flush().await.map_err(|err| ReplayError::Worker(err.to_string()))?;
    drop(file);

    // Atomic publish: the driver must never observe a half-written file.
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|err| ReplayError::Worker(format!("publishing {}: {err}", path.display())))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn minute_range_is_half_open() {
        let from = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 30).unwrap();
        let to = Utc.with_ymd_and_hms(2020, 3, 1, 0, 2, 0).unwrap();
        let keys = minute_range(from, to);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].to_string(), "2020-03-01T00:00:00.000Z");
        assert_eq!(keys[1].to_string(), "2020-03-01T00:01:00.000Z");
    }

    #[test]
    fn filter_set_hash_is_stable_and_order_sensitive_to_symbols() {
        let a = vec![Filter::new("trade", Some(vec!["BTC".into()]))];
        let b = vec![Filter::new("trade", Some(vec!["BTC".into()]))];
        let c = vec![Filter::new("trade", Some(vec!["ETH".into()]))];
        assert_eq!(filter_set_hash(&a), filter_set_hash(&b));
        assert_ne!(filter_set_hash(&a), filter_set_hash(&c));
    }
}
