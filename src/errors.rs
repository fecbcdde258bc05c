// ABOUTME: Application-level error wiring on top of replay-core's taxonomy
// ABOUTME: Adds the HTTP/IO-specific variants needed by external readers and the fetch worker
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use thiserror::Error;

pub use replay_core::{ReplayError, ValidationError};

/// Top-level error type for operations that reach outside the core replay
/// pipeline (HTTP reads, config wiring). The replay/stream iterators
/// themselves only ever surface [`ReplayError`], per the failure semantics
/// in the core design.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid endpoint URL {endpoint}: {source}")]
    UrlParse {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
