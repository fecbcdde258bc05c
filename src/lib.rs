// ABOUTME: Historical and live market-data replay engine — crate root and public surface
// ABOUTME: Wires together line splitting, slice caching, fetch dispatch, normalization, and streaming
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod cache;
pub mod config;
pub mod errors;
pub mod external;
pub mod fetch_worker;
pub mod line_splitter;
pub mod logging;
pub mod normalize;
pub mod replay;
pub mod slice_reader;
pub mod stream;
pub mod validation;

pub use config::ReplayConfig;
pub use errors::AppError;
pub use external::{ApiKeyEntitlement, ExchangeDetails, MetadataClient};
pub use replay_core::{
    DecodedMessage, ExchangeCatalog, Filter, Job, NormalizedRecord, RawMessage,
    RecordOrDisconnect, ReplayError, ReplayMessage, SliceKey, ValidationError,
};
pub use replay_mappers::{Mapper, MapperFactory, MapperRegistry};

pub use fetch_worker::slice_path;
pub use normalize::{replay_normalized, stream_normalized, NormalizeOptions};
pub use replay::replay;
pub use stream::{stream, FeedEvent, LiveFeed, SyntheticFeed};

/// Remove the entire on-disk slice cache. Best-effort: a missing directory
/// is not an error, and individual I/O failures are logged rather than
/// propagated since this is a maintenance operation, not part of the
/// replay/stream data path.
pub async fn clear_cache(config: &ReplayConfig) {
    match tokio::fs::remove_dir_all(&config.cache_dir).await {
        Ok(()) => tracing::info!(cache_dir = %config.cache_dir.display(), "cache cleared"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(
            cache_dir = %config.cache_dir.display(),
            error = %err,
            "failed to clear cache"
        ),
    }
}
