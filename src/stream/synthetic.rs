// ABOUTME: A LiveFeed reference implementation driven from an in-memory queue, for tests
// ABOUTME: Mirrors the teacher's SyntheticProvider: no network, deterministic, test-only data
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{FeedEvent, LiveFeed};
use async_trait::async_trait;
use replay_core::{Filter, ReplayError};
use std::collections::VecDeque;
use std::time::Duration;

/// A feed whose events are fed in upfront, for exercising the adapter
/// without a real exchange connection.
#[derive(Default)]
pub struct SyntheticFeed {
    events: VecDeque<FeedEvent>,
    connect_count: usize,
    timeout: Option<Duration>,
}

impl SyntheticFeed {
    #[must_use]
    pub fn new(events: Vec<FeedEvent>) -> Self {
        Self {
            events: events.into(),
            connect_count: 0,
            timeout: None,
        }
    }

    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connect_count
    }
}

#[async_trait]
impl LiveFeed for SyntheticFeed {
    fn set_timeout_interval(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    async fn connect(&mut self, _filters: &[Filter]) -> Result<(), ReplayError> {
        self.connect_count += 1;
        Ok(())
    }

    async fn next_event(&mut self) -> Result<Option<FeedEvent>, ReplayError> {
        Ok(self.events.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reconnect_increments_connect_count() {
        let mut feed = SyntheticFeed::new(vec![]);
        feed.connect(&[]).await.unwrap();
        feed.reconnect(&[]).await.unwrap();
        assert_eq!(feed.connect_count(), 2);
    }

    #[tokio::test]
    async fn events_are_yielded_in_order_then_exhaust() {
        let mut feed = SyntheticFeed::new(vec![
            FeedEvent::Message(serde_json::json!({"a": 1})),
            FeedEvent::Disconnect,
        ]);
        assert_eq!(
            feed.next_event().await.unwrap(),
            Some(FeedEvent::Message(serde_json::json!({"a": 1})))
        );
        assert_eq!(feed.next_event().await.unwrap(), Some(FeedEvent::Disconnect));
        assert_eq!(feed.next_event().await.unwrap(), None);
    }
}
