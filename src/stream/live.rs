// ABOUTME: Drives a LiveFeed with an idle timeout, mapping silence into disconnect + reconnect
// ABOUTME: Coalesces disconnect sentinels exactly like the historical driver does
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{FeedEvent, LiveFeed};
use async_stream::try_stream;
use chrono::Utc;
use futures_util::Stream;
use replay_core::{DecodedMessage, Filter, RecordOrDisconnect, ReplayError, ReplayMessage};
use std::time::Duration;

pub fn run(
    mut feed: Box<dyn LiveFeed>,
    filters: Vec<Filter>,
    idle_timeout: Duration,
) -> impl Stream<Item = Result<RecordOrDisconnect, ReplayError>> {
    try_stream! {
        let timeout = (!idle_timeout.is_zero()).then_some(idle_timeout);
        feed.set_timeout_interval(timeout);
        feed.connect(&filters).await?;

        let mut last_emitted_was_disconnect = false;

        loop {
            let event = match timeout {
                None => feed.next_event().await?,
                Some(timeout) => match tokio::time::timeout(timeout, feed.next_event()).await {
                    Ok(result) => result?,
                    Err(_elapsed) => {
                        if !last_emitted_was_disconnect {
                            yield RecordOrDisconnect::Disconnect;
                            last_emitted_was_disconnect = true;
                        }
                        feed.reconnect(&filters).await?;
                        continue;
                    }
                },
            };

            match event {
                None => break,
                Some(FeedEvent::Disconnect) => {
                    if !last_emitted_was_disconnect {
                        yield RecordOrDisconnect::Disconnect;
                        last_emitted_was_disconnect = true;
                    }
                }
                Some(FeedEvent::Message(payload)) => {
                    let message = ReplayMessage::Decoded(DecodedMessage {
                        local_timestamp: Utc::now(),
                        message: payload,
                    });
                    yield RecordOrDisconnect::Record(message);
                    last_emitted_was_disconnect = false;
                }
            }
        }
    }
}
