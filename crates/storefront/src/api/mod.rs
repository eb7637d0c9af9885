//! REST client for the Paperclip storefront API.
//!
//! # Architecture
//!
//! - Every response is wrapped in an envelope `{ success, data, message? }`
//! - A bearer token is attached to each request when one is set
//! - A 401 outside `/auth/*` drops the token and surfaces
//!   [`ApiError::SessionExpired`]; the caller tears the session down
//! - Catalog pages and product details are cached via `moka`; the product
//!   validity check never is
//!
//! # Example
//!
//! ```rust,ignore
//! use paperclip_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let page = client.list_products(&ProductQuery::default()).await?;
//! let deleted = client.deleted_products(&cart.server_ids()).await?;
//! ```

mod admin;
mod auth;
mod cache;
mod catalog;
mod content;
mod orders;
mod upload;

pub use catalog::ProductValidation;
pub use upload::ImageUpload;

use std::sync::{Arc, PoisonError, RwLock};

use moka::future::Cache;
use paperclip_core::ValidationError;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::StorefrontConfig;
use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the bearer token on a non-auth endpoint.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// Non-2xx response.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose envelope reports `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Envelope reported success but carried no `data`.
    #[error("Response contained no data")]
    MissingData,

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input failed client-side validation; no request was made.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(String),

    /// Reading a file for upload failed.
    #[error("Upload error: {0}")]
    Upload(String),
}

impl ApiError {
    /// Whether the request never got an answer from the server.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(e) if !e.is_status() && !e.is_decode())
    }

    /// HTTP status for `Api` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Uniform response wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// A request ready to be sent, with what the interceptor needs to know.
struct Call {
    builder: RequestBuilder,
    path: String,
    auth_endpoint: bool,
}

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the HTTP pool, token and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.has_token().then_some("[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("paperclip-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.clone(),
                token: RwLock::new(None),
                cache,
            }),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace (or clear) the bearer token.
    pub fn set_token(&self, token: Option<SecretString>) {
        let mut guard = self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = token;
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn call(&self, method: Method, segments: &[&str]) -> Result<Call, ApiError> {
        self.call_with_query(method, segments, &[])
    }

    fn call_with_query(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Call, ApiError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let mut builder = self.inner.http.request(method, url);
        if let Some(token) = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            builder = builder.bearer_auth(token.expose_secret());
        }
        Ok(Call {
            builder,
            path: segments.join("/"),
            auth_endpoint: segments.first() == Some(&"auth"),
        })
    }

    #[instrument(skip_all, fields(path = %call.path))]
    async fn dispatch<T: DeserializeOwned>(&self, call: Call) -> Result<Option<T>, ApiError> {
        let response = call.builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && !call.auth_endpoint {
            warn!("API rejected session token, dropping it");
            self.set_token(None);
            return Err(ApiError::SessionExpired);
        }

        let body = response.text().await?;
        debug!(status = %status, bytes = body.len(), "API response");
        decode_envelope(status, &body)
    }

    async fn fetch<T: DeserializeOwned>(&self, call: Call) -> Result<T, ApiError> {
        self.dispatch(call).await?.ok_or(ApiError::MissingData)
    }

    async fn fetch_empty(&self, call: Call) -> Result<(), ApiError> {
        self.dispatch::<IgnoredAny>(call).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.fetch(self.call(Method::GET, segments)?).await
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut call = self.call(method, segments)?;
        call.builder = call.builder.json(body);
        self.fetch(call).await
    }

    async fn send_json_empty<B>(&self, method: Method, segments: &[&str], body: &B) -> Result<(), ApiError>
    where
        B: serde::Serialize + ?Sized,
    {
        let mut call = self.call(method, segments)?;
        call.builder = call.builder.json(body);
        self.fetch_empty(call).await
    }

    async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let mut call = self.call(method, segments)?;
        call.builder = call.builder.multipart(form);
        self.fetch(call).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.fetch_empty(self.call(Method::DELETE, segments)?).await
    }
}

/// Turn a status and body into the envelope's data.
///
/// Non-2xx statuses become [`ApiError::Api`] carrying the envelope message
/// when one is present.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Option<T>, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_str::<Envelope<IgnoredAny>>(body)
            .ok()
            .and_then(|env| env.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "Request was not successful".to_string()),
        ));
    }
    Ok(envelope.data)
}
