// ABOUTME: The Mapper contract — canHandle/map/getFilters — implemented once per exchange
// ABOUTME: Object-safe trait so mapper chains can be stored as `Vec<Box<dyn Mapper>>`
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use replay_core::{Filter, NormalizedRecord};

/// A unit that recognizes a subset of an exchange's raw payloads and emits
/// normalized domain records.
///
/// Mappers are stateful (e.g. they may track the last known order book to
/// emit deltas), so the normalizer re-instantiates a fresh set from their
/// factories on every disconnect rather than calling a `reset` method —
/// this guarantees old and new mapper instances are genuinely distinct
/// objects, matching the "mapper instances used after a disconnect marker
/// are distinct objects" testable property.
pub trait Mapper: Send {
    /// Does this mapper recognize `payload`'s shape?
    fn can_handle(&self, payload: &serde_json::Value) -> bool;

    /// Produce zero or more normalized records for `payload`, captured at
    /// `local_timestamp`.
    fn map(&mut self, payload: &serde_json::Value, local_timestamp: DateTime<Utc>) -> Vec<NormalizedRecord>;

    /// The replay/stream filters this mapper needs upstream, given the
    /// caller's requested symbols (already upper-cased, `None` = all
    /// symbols).
    fn filters(&self, symbols: Option<&[String]>) -> Vec<Filter>;
}

/// A factory that produces a fresh [`Mapper`] instance. Stored as a
/// `Vec<MapperFactory>` so the normalizer can rebuild the whole chain on
/// every disconnect.
pub type MapperFactory = Box<dyn Fn() -> Box<dyn Mapper> + Send + Sync>;
