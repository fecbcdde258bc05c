// ABOUTME: Thin HTTP readers against the replay service's metadata endpoints (§6)
// ABOUTME: Modeled on the teacher's usda_client: one reqwest::Client, JSON in, typed struct out
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ReplayConfig;
use crate::errors::AppError;
use serde::Deserialize;
use url::Url;

/// Exchange metadata returned by `GET /v1/exchanges/{exchange}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeDetails {
    pub id: String,
    pub name: String,
    pub channels: Vec<String>,
    #[serde(default)]
    pub non_filterable: bool,
}

/// One entitlement granted to the calling API key: an exchange, the date
/// range it covers, and an optional symbol restriction.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyEntitlement {
    pub exchange: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
}

/// A thin, reusable client for the replay service's metadata endpoints.
/// Holds its own [`reqwest::Client`] so connection pooling is shared across
/// calls the way the fetch worker shares its client across slice downloads.
pub struct MetadataClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl MetadataClient {
    #[must_use]
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(config.http_timeout)
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// `GET /v1/exchanges/{exchange}` — channel list and filterability for
    /// one exchange, as the service currently understands it (may diverge
    /// from [`replay_core::ExchangeCatalog`]'s built-in snapshot).
    pub async fn get_exchange_details(&self, exchange: &str) -> Result<ExchangeDetails, AppError> {
        let url = self.join(&format!("v1/exchanges/{exchange}"))?;
        self.get_json(url).await
    }

    /// `GET /v1/api-key-info` — the calling key's per-exchange entitlements.
    pub async fn get_api_key_access_info(&self) -> Result<Vec<ApiKeyEntitlement>, AppError> {
        let url = self.join("v1/api-key-info")?;
        self.get_json(url).await
    }

    /// Resolves `path` against the configured endpoint, keeping any base
    /// path segment (e.g. `/api`) intact rather than overwriting it — the
    /// endpoint is treated as a directory, `path` as relative to it.
    /// Grounded on the teacher's `url::Url` usage in its OAuth provider
    /// clients.
    fn join(&self, path: &str) -> Result<Url, AppError> {
        let base = format!("{}/", self.endpoint.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(|source| AppError::UrlParse {
                endpoint: self.endpoint.clone(),
                source,
            })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, AppError> {
        let mut request = self.http.get(url.clone());
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|source| AppError::Http { url: url.to_string(), source })?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| AppError::Http { url: url.to_string(), source })
    }
}
