// ABOUTME: Exchange-specific mapper implementations and the default mapper registry
// ABOUTME: Each mapper translates one exchange's raw JSON payloads into NormalizedRecord values
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod mapper;
pub mod registry;

#[cfg(feature = "mapper-binance")]
pub mod binance;
#[cfg(feature = "mapper-bitfinex")]
pub mod bitfinex;
#[cfg(feature = "mapper-deribit")]
pub mod deribit;

pub use mapper::{Mapper, MapperFactory};
pub use registry::MapperRegistry;
