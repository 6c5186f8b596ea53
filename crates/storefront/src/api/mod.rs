//! Client for the ordering backend's REST API.
//!
//! # Architecture
//!
//! - JSON over HTTP with `reqwest`, one request per call, no retries
//! - The backend is the source of truth for menu, orders and reviews
//! - Menu responses are cached in memory via `moka` (TTL from config)
//!
//! # Endpoints
//!
//! | Area    | Calls |
//! |---------|-------|
//! | Menu    | `GET /menu`, `GET /menu/{id}` |
//! | Orders  | `POST /orders`, `GET /orders?userId=`, `GET /orders/{id}` |
//! | Reviews | `GET /menu/{id}/reviews`, `POST /reviews`, `PUT`/`DELETE /reviews/{id}` |
//! | Admin   | `GET /admin/orders`, `PATCH /admin/orders/{id}` |
//!
//! # Example
//!
//! ```rust,ignore
//! use plateful_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let menu = client.list_menu(None).await?;
//! let ramen = client.get_menu_item(&menu[0].item_id).await?;
//! ```

mod admin;
mod cache;
mod menu;
mod orders;
mod reviews;
pub mod types;

pub use types::*;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::{ApiConfig, bearer};
use cache::{CacheKey, CacheValue};

/// Bodies longer than this are truncated in errors and logs.
const MAX_ERROR_BODY: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body was not what we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Client for the ordering backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the menu cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot take path segments or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("plateful/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = (!config.menu_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.menu_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// Build the URL for a path below the base URL.
    ///
    /// Segments are percent-encoded, so ids containing `/` stay one segment.
    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, bearer(token)),
            None => builder,
        }
    }

    /// Send a request and decode the JSON response.
    ///
    /// `what` names the resource for `NotFound` errors.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(request, what).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is ignored.
    async fn send_empty(&self, request: RequestBuilder, what: &str) -> Result<(), ApiError> {
        self.send_raw(request, what).await.map(drop)
    }

    async fn send_raw(&self, request: RequestBuilder, what: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("{what} not found")));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        Ok(body)
    }

    /// Drop every cached menu response.
    pub async fn invalidate_menu_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}
