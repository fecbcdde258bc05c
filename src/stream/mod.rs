// ABOUTME: Live Stream Adapter — mirrors the replay driver's contract over a real-time feed
// ABOUTME: Idle timeout + feed-local reconnect takes the place of the historical wait loop
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod live;
mod synthetic;

use crate::validation::{validate_stream, StreamOptions};
use async_trait::async_trait;
use futures_util::Stream;
use replay_core::{Filter, RecordOrDisconnect, ReplayError, ValidationError};
use std::time::Duration;

pub use live::run as live_stream;
pub use synthetic::SyntheticFeed;

/// The idle timeout applied when a caller does not set one explicitly,
/// matching the original's default.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// One event read off a live feed, prior to local timestamping.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Message(serde_json::Value),
    Disconnect,
}

/// A real-time source of exchange messages. Implementations own their own
/// connection (WebSocket, test harness, …); the adapter only ever calls
/// `connect`/`next_event`/`reconnect` and applies the idle-timeout policy
/// around them.
#[async_trait]
pub trait LiveFeed: Send {
    /// `0` disables the idle timeout; any other value overrides
    /// [`DEFAULT_IDLE_TIMEOUT`] for this feed.
    fn set_timeout_interval(&mut self, timeout: Option<Duration>);

    async fn connect(&mut self, filters: &[Filter]) -> Result<(), ReplayError>;

    /// `Ok(None)` signals the feed is exhausted (used by test feeds; a real
    /// WebSocket feed runs forever until cancelled).
    async fn next_event(&mut self) -> Result<Option<FeedEvent>, ReplayError>;

    /// Reconnection policy is feed-local; the default just calls `connect`
    /// again.
    async fn reconnect(&mut self, filters: &[Filter]) -> Result<(), ReplayError> {
        self.connect(filters).await
    }
}

/// Stream a live feed as an async sequence of [`RecordOrDisconnect`]
/// values. Returns synchronously with a [`ValidationError`] if `options` is
/// malformed, mirroring [`crate::replay::replay`]'s failure semantics.
pub fn stream(
    feed: Box<dyn LiveFeed>,
    options: StreamOptions,
) -> Result<impl Stream<Item = Result<RecordOrDisconnect, ReplayError>>, ValidationError> {
    validate_stream(&options)?;
    Ok(live_stream(feed, options.filters, DEFAULT_IDLE_TIMEOUT))
}
