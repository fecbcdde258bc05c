// ABOUTME: Core domain types shared by the replay driver, fetch worker, and normalizer
// ABOUTME: SliceKey, Filter, Job, ReplayMessage, the exchange catalog, and the error taxonomy
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain model for the exchange market-data replay engine.
//!
//! This crate has no I/O of its own — it is the vocabulary that the replay
//! driver, fetch worker, and normalizer all speak, so that none of them need
//! to depend on each other's internals.

pub mod catalog;
pub mod errors;
pub mod model;
pub mod normalized;

pub use catalog::ExchangeCatalog;
pub use errors::{ReplayError, ValidationError};
pub use model::{
    DecodedMessage, Filter, Job, RawMessage, RecordOrDisconnect, ReplayMessage, SliceKey,
};
pub use normalized::{
    NormalizedBookChange, NormalizedDisconnect, NormalizedRecord, NormalizedTicker,
    NormalizedTrade, TradeSide,
};
