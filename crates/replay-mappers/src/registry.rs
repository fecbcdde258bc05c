// ABOUTME: Registry of default mapper factories per exchange, mirroring a provider-factory registry
// ABOUTME: Callers may use this for the common case or supply their own factory list to the normalizer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::mapper::{Mapper, MapperFactory};
use std::collections::HashMap;

/// Maps exchange id to the default chain of [`MapperFactory`] values used to
/// normalize that exchange's payloads.
///
/// This is a convenience, not a requirement: `replayNormalized` /
/// `streamNormalized` accept an explicit factory list and do not require
/// going through the registry.
pub struct MapperRegistry {
    factories: HashMap<&'static str, Vec<MapperFactory>>,
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MapperRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        #[cfg(feature = "mapper-binance")]
        registry.register("binance", vec![Box::new(|| {
            Box::new(crate::binance::BinanceMapper::new()) as Box<dyn Mapper>
        })]);

        #[cfg(feature = "mapper-deribit")]
        registry.register("deribit", vec![Box::new(|| {
            Box::new(crate::deribit::DeribitMapper::new()) as Box<dyn Mapper>
        })]);

        #[cfg(feature = "mapper-bitfinex")]
        {
            registry.register(
                "bitfinex",
                vec![Box::new(|| {
                    Box::new(crate::bitfinex::BitfinexMapper::new()) as Box<dyn Mapper>
                })],
            );
            registry.register(
                "bitfinex-derivatives",
                vec![Box::new(|| {
                    Box::new(crate::bitfinex::BitfinexMapper::new()) as Box<dyn Mapper>
                })],
            );
        }

        registry
    }

    fn register(&mut self, exchange: &'static str, factories: Vec<MapperFactory>) {
        self.factories.insert(exchange, factories);
    }

    /// Instantiate a fresh mapper chain for `exchange`, or `None` if no
    /// default mappers are registered for it.
    #[must_use]
    pub fn build(&self, exchange: &str) -> Option<Vec<Box<dyn Mapper>>> {
        self.factories
            .get(exchange)
            .map(|factories| factories.iter().map(|f| f()).collect())
    }

    #[must_use]
    pub fn known_exchanges(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}
