// ABOUTME: Public entry point for historical replay — validates, then hands off to the driver
// ABOUTME: Validation failures return synchronously so no worker is ever spawned for a bad request
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod driver;

use crate::config::ReplayConfig;
use crate::validation::{validate_replay, ReplayOptions};
use futures_util::Stream;
use replay_core::{RecordOrDisconnect, ReplayError, ValidationError};

pub use driver::run;

/// Replay a historical range as an async sequence of [`RecordOrDisconnect`]
/// values. Returns synchronously with a [`ValidationError`] if `options` is
/// malformed — per the failure semantics in the core design, a validation
/// failure never spawns the fetch worker.
pub fn replay(
    config: ReplayConfig,
    options: ReplayOptions,
) -> Result<impl Stream<Item = Result<RecordOrDisconnect, ReplayError>>, ValidationError> {
    let validated = validate_replay(options)?;
    Ok(run(config, validated))
}
