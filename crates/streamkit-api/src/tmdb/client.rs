//! `TmdbClient` - cached TMDB API client implementation.
#![allow(clippy::future_not_send)]

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalTmdbApi;
use super::cache::{LocalCacheStore, MemoryCache};
use super::error::{ApiError, TransportFailure, classify, redact};
use super::images::image_url;
use super::key::derive_key;
use super::namespaces::{
    Collections, Configuration, Find, Movies, People, Search, Trending, Tv,
};
use super::params::Params;
use super::rate_limiter::RateLimiter;

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default User-Agent sent upstream.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Query parameter carrying the credential.
const API_KEY_PARAM: &str = "api_key";

/// Query parameter selecting the response language.
const LANGUAGE_PARAM: &str = "language";

/// Language injected when a request does not specify one.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// TMDB API client.
///
/// Owns its cache: the built-in [`MemoryCache`] unless another
/// [`LocalCacheStore`] was supplied through [`TmdbClientBuilder::cache`].
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient<C = MemoryCache> {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests (always ends with `/`).
    base_url: Url,
    /// API key sent as the `api_key` query parameter.
    api_key: String,
    /// Response cache.
    cache: C,
    /// Pacing of upstream requests.
    rate_limiter: Mutex<RateLimiter>,
}

impl<C: fmt::Debug> fmt::Debug for TmdbClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"***")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Builder for `TmdbClient`.
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder<C = MemoryCache> {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
    cache: C,
}

impl<C: fmt::Debug> fmt::Debug for TmdbClientBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClientBuilder")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("user_agent", &self.user_agent)
            .field("min_interval", &self.min_interval)
            .field("cache", &self.cache)
            .finish()
    }
}

impl TmdbClientBuilder<MemoryCache> {
    /// Creates a new builder using the built-in cache.
    fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            min_interval: None,
            cache: MemoryCache::default(),
        }
    }

    /// Sets the time-to-live of the built-in cache (default: 300s).
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = MemoryCache::new(ttl);
        self
    }
}

impl<C> TmdbClientBuilder<C> {
    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (default: `streamkit-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum interval between upstream requests (default: 25ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Replaces the built-in cache with a caller-supplied backend.
    #[must_use]
    pub fn cache<D>(self, cache: D) -> TmdbClientBuilder<D> {
        TmdbClientBuilder {
            base_url: self.base_url,
            api_key: self.api_key,
            user_agent: self.user_agent,
            min_interval: self.min_interval,
            cache,
        }
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingCredential`] if `api_key` is unset or empty.
    /// - [`ApiError::Network`] if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<TmdbClient<C>, ApiError> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or(ApiError::MissingCredential)?;

        let mut base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL).map_err(|err| ApiError::Upstream {
                status: None,
                message: format!("invalid default base URL: {err}"),
            })?
        };
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let rate_limiter = self
            .min_interval
            .map_or_else(RateLimiter::default, RateLimiter::new);

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .map_err(|err| classify(&TransportFailure::from_reqwest(err), &api_key))?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_key,
            cache: self.cache,
            rate_limiter: Mutex::new(rate_limiter),
        })
    }
}

impl TmdbClient<MemoryCache> {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> TmdbClientBuilder<MemoryCache> {
        TmdbClientBuilder::new()
    }

    /// Creates a client with the built-in cache and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingCredential`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder().api_key(api_key).build()
    }
}

impl<C> TmdbClient<C> {
    /// Returns the cache backend.
    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds a full image URL; see [`image_url`].
    #[must_use]
    pub fn image_url(&self, path: Option<&str>, size: &str) -> Option<String> {
        image_url(path, size)
    }

    /// Classifies a transport failure with this client's credential redacted.
    fn classify(&self, failure: &TransportFailure) -> ApiError {
        classify(failure, &self.api_key)
    }

    /// Resolves an endpoint such as `/movie/550` against the base URL.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|err| ApiError::Upstream {
                status: None,
                message: format!("invalid endpoint path {endpoint}: {err}"),
            })
    }
}

impl<C: LocalCacheStore> TmdbClient<C> {
    /// Runs a request through the cache and, on a miss, the upstream API.
    ///
    /// - A missing or empty `language` becomes [`DEFAULT_LANGUAGE`].
    /// - A caller-supplied `api_key` is discarded; the configured key is
    ///   always the one sent.
    /// - A cache hit returns immediately without any upstream call.
    /// - On a miss, one GET is issued; the decoded body is cached and
    ///   returned. Nothing is cached on failure and nothing is retried.
    /// - A failed cache write is logged and does not affect the result.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] on upstream failure, or
    /// [`ApiError::Upstream`] if the cache lookup itself faults.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn execute(&self, endpoint: &str, mut params: Params) -> Result<Value, ApiError> {
        if params.remove(API_KEY_PARAM).is_some() {
            tracing::debug!("caller-supplied api_key ignored");
        }
        params.insert_default(LANGUAGE_PARAM, DEFAULT_LANGUAGE);

        let key = derive_key(endpoint, &params);

        let cached = self
            .cache
            .get(&key)
            .await
            .map_err(|err| ApiError::Upstream {
                status: None,
                message: redact(&format!("cache lookup failed: {err}"), &self.api_key),
            })?;
        if let Some(value) = cached {
            tracing::debug!(key = %key, "cache hit");
            return Ok(value);
        }
        tracing::debug!(key = %key, "cache miss");

        let value = self.fetch(endpoint, &params).await?;

        if let Err(err) = self.cache.set(&key, value.clone()).await {
            tracing::warn!(key = %key, error = %err, "failed to store response in cache");
        }

        Ok(value)
    }

    /// Sends a single GET with the credential and parameters as query.
    #[instrument(skip_all)]
    async fn fetch(&self, endpoint: &str, params: &Params) -> Result<Value, ApiError> {
        let url = self.endpoint_url(endpoint)?;

        self.rate_limiter.lock().await.wait().await;

        let mut query = params.to_query();
        query.push((String::from(API_KEY_PARAM), self.api_key.clone()));

        tracing::debug!(url = %url, params = %params.to_canonical_json(), "TMDB API request");

        let response = self
            .http_client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|err| self.classify(&TransportFailure::from_reqwest(err)))?;

        let status = response.status();

        if !status.is_success() {
            let body = body_or_empty(response.text().await);
            return Err(self.classify(&TransportFailure::Status { status, body }));
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.classify(&TransportFailure::from_reqwest(err)))?;
        serde_json::from_str(&body).map_err(|err| ApiError::Upstream {
            status: Some(status.as_u16()),
            message: format!("failed to decode JSON response: {err}"),
        })
    }

    /// Movie endpoints.
    #[must_use]
    pub const fn movies(&self) -> Movies<'_, Self> {
        Movies::new(self)
    }

    /// TV endpoints.
    #[must_use]
    pub const fn tv(&self) -> Tv<'_, Self> {
        Tv::new(self)
    }

    /// People endpoints.
    #[must_use]
    pub const fn people(&self) -> People<'_, Self> {
        People::new(self)
    }

    /// Cross-type search endpoints.
    #[must_use]
    pub const fn search(&self) -> Search<'_, Self> {
        Search::new(self)
    }

    /// Collection endpoints.
    #[must_use]
    pub const fn collections(&self) -> Collections<'_, Self> {
        Collections::new(self)
    }

    /// Lookup by external ID.
    #[must_use]
    pub const fn find(&self) -> Find<'_, Self> {
        Find::new(self)
    }

    /// API configuration endpoints.
    #[must_use]
    pub const fn configuration(&self) -> Configuration<'_, Self> {
        Configuration::new(self)
    }

    /// Mixed-media trending endpoints.
    #[must_use]
    pub const fn trending(&self) -> Trending<'_, Self> {
        Trending::new(self)
    }
}

/// Body of an error response. An unreadable body is logged and treated as
/// empty, so classification falls back to the status alone.
fn body_or_empty<E: fmt::Display>(read: Result<String, E>) -> String {
    match read {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(error = %err, "failed to read error response body");
            String::new()
        }
    }
}

impl<C: LocalCacheStore> LocalTmdbApi for TmdbClient<C> {
    async fn execute(&self, endpoint: &str, params: Params) -> Result<Value, ApiError> {
        Self::execute(self, endpoint, params).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::tmdb::cache::CacheError;
    use crate::tmdb::error::ErrorKind;
    use crate::tmdb::key::CacheKey;
    use crate::tmdb::paginate::paginate;
    use crate::tmdb::params::ExternalSource;

    const TEST_KEY: &str = "test-api-key-0123456789";

    fn client_for(server: &MockServer) -> TmdbClient {
        TmdbClient::builder()
            .base_url(format!("{}/3/", server.uri()).parse().unwrap())
            .api_key(TEST_KEY)
            .min_interval(Duration::ZERO)
            .build()
            .unwrap()
    }

    /// Cache that records every call.
    #[derive(Default)]
    struct RecordingCache {
        entries: std::sync::Mutex<HashMap<String, Value>>,
        gets: AtomicU32,
        sets: AtomicU32,
    }

    impl LocalCacheStore for RecordingCache {
        async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().get(key.as_str()).cloned())
        }

        async fn set(&self, key: &CacheKey, value: Value) -> Result<(), CacheError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(String::from(key.as_str()), value);
            Ok(())
        }
    }

    /// Cache whose operations fault on demand.
    struct FaultyCache {
        fail_get: bool,
        fail_set: bool,
    }

    impl LocalCacheStore for FaultyCache {
        async fn get(&self, _key: &CacheKey) -> Result<Option<Value>, CacheError> {
            if self.fail_get {
                return Err(CacheError::new("backend unavailable"));
            }
            Ok(None)
        }

        async fn set(&self, _key: &CacheKey, _value: Value) -> Result<(), CacheError> {
            if self.fail_set {
                return Err(CacheError::new("backend read-only"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_builder_requires_api_key() {
        // Arrange & Act
        let result = TmdbClient::builder().build();

        // Assert
        assert_eq!(result.unwrap_err(), ApiError::MissingCredential);
    }

    #[test]
    fn test_builder_rejects_empty_api_key() {
        // Arrange & Act
        let result = TmdbClient::new("");

        // Assert
        assert_eq!(result.unwrap_err().kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_builder_with_required_fields_succeeds() {
        // Arrange & Act
        let client = TmdbClient::new("key").unwrap();

        // Assert
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.cache().ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_builder_with_custom_ttl() {
        // Arrange & Act
        let client = TmdbClient::builder()
            .api_key("key")
            .cache_ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.cache().ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_builder_appends_trailing_slash() {
        // Arrange
        let custom_url = Url::parse("http://localhost:8080/3").unwrap();

        // Act
        let client = TmdbClient::builder()
            .base_url(custom_url)
            .api_key("key")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/3/");
        assert_eq!(
            client.endpoint_url("/movie/550").unwrap().as_str(),
            "http://localhost:8080/3/movie/550"
        );
    }

    #[test]
    fn test_debug_output_hides_api_key() {
        // Arrange
        let client = TmdbClient::new(TEST_KEY).unwrap();

        // Act
        let rendered = format!("{client:?}");

        // Assert
        assert!(!rendered.contains(TEST_KEY));
    }

    #[tokio::test]
    async fn test_execute_injects_default_language() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/movie_550.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .and(query_param("api_key", TEST_KEY))
            .and(query_param("language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let movie = client.execute("/movie/550", Params::new()).await.unwrap();

        // Assert
        assert_eq!(movie["id"], 550);
        let expected_key = derive_key("/movie/550", &Params::new().with("language", "en-US"));
        assert!(
            LocalCacheStore::get(client.cache(), &expected_key)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_execute_respects_caller_language() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .and(query_param("language", "ja-JP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 550})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client
            .execute("/movie/550", Params::new().with("language", "ja-JP"))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 0})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let key = derive_key("/movie/550", &Params::new().with("language", "en-US"));
        LocalCacheStore::set(client.cache(), &key, json!({"id": 550, "cached": true}))
            .await
            .unwrap();

        // Act
        let movie = client.execute("/movie/550", Params::new()).await.unwrap();

        // Assert (mock expect(0) verifies no upstream call)
        assert_eq!(movie, json!({"id": 550, "cached": true}));
    }

    #[tokio::test]
    async fn test_repeated_request_is_served_from_cache() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let first = Params::new().with("query", "heat").with("page", 1u32);
        let second = Params::new()
            .with("page", 1u32)
            .with("language", "en-US")
            .with("query", "heat");

        // Act
        let a = client.execute("/search/movie", first).await.unwrap();
        let b = client.execute("/search/movie", second).await.unwrap();

        // Assert (expect(1): differently ordered bags share one cache entry)
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_caller_cannot_override_api_key() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("api_key", TEST_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client
            .execute("/configuration", Params::new().with("api_key", "forged"))
            .await;

        // Assert
        assert!(result.is_ok());
        let requests = mock_server.received_requests().await.unwrap();
        let keys: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "api_key")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(keys, vec![String::from(TEST_KEY)]);
    }

    #[tokio::test]
    async fn test_find_external_id_cannot_escape_path() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/find/..%2Fmovie%2F550"))
            .and(query_param("external_source", "imdb_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"movie_results": []})))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/find/tt1%3Fexternal_source=tvdb_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tv_results": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        client
            .find()
            .by_id("../movie/550", ExternalSource::ImdbId, None)
            .await
            .unwrap();
        client
            .find()
            .by_id("tt1?external_source=tvdb_id", ExternalSource::ImdbId, None)
            .await
            .unwrap();

        // Assert
        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert!(request.url.path().starts_with("/3/find/"));
            let sources = request
                .url
                .query_pairs()
                .filter(|(k, _)| k == "external_source")
                .count();
            assert_eq!(sources, 1);
        }
    }

    #[test]
    fn test_unreadable_error_body_reads_as_empty() {
        // Arrange & Act & Assert
        assert_eq!(body_or_empty::<String>(Ok(String::from("{}"))), "{}");
        assert_eq!(body_or_empty(Err(String::from("connection reset"))), "");
    }

    #[tokio::test]
    async fn test_list_params_are_comma_joined() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("append_to_response", "videos,credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let params = Params::new().with("append_to_response", vec!["videos", "credits"]);

        // Act & Assert
        client.execute("/tv/1399", params).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_status_classification() {
        // Arrange
        let cases = [
            (401, ErrorKind::InvalidCredential),
            (404, ErrorKind::NotFound),
            (429, ErrorKind::RateLimited),
            (500, ErrorKind::Upstream),
        ];

        for (status, expected) in cases {
            let mock_server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_string(
                    include_str!("../../../../fixtures/tmdb/error_not_found.json"),
                ))
                .mount(&mock_server)
                .await;
            let client = client_for(&mock_server);

            // Act
            let err = client.execute("/movie/1", Params::new()).await.unwrap_err();

            // Assert
            assert_eq!(err.kind(), expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn test_invalid_key_error_body() {
        // Arrange
        let mock_server = MockServer::start().await;
        let error_body = include_str!("../../../../fixtures/tmdb/error_invalid_key.json");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let err = client.execute("/movie/1", Params::new()).await.unwrap_err();

        // Assert
        assert_eq!(err, ApiError::InvalidCredential);
        assert_eq!(err.message(), "Invalid TMDB API key");
    }

    #[tokio::test]
    async fn test_failure_is_not_cached_and_not_retried() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let first = client.execute("/movie/popular", Params::new()).await;
        let second = client.execute("/movie/popular", Params::new()).await;

        // Assert (expect(2): one upstream call per invocation, no retries)
        assert_eq!(first.unwrap_err(), ApiError::RateLimited);
        assert_eq!(second.unwrap_err(), ApiError::RateLimited);
        assert!(client.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_upstream_message_does_not_leak_key() {
        // Arrange
        let mock_server = MockServer::start().await;
        let body = format!(r#"{{"status_message":"key {TEST_KEY} is suspended"}}"#);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let err = client.execute("/movie/1", Params::new()).await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(!err.message().contains(TEST_KEY));
        assert!(err.message().contains("is suspended"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Arrange
        let client = TmdbClient::builder()
            .base_url(Url::parse("http://127.0.0.1:1/3/").unwrap())
            .api_key(TEST_KEY)
            .min_interval(Duration::ZERO)
            .build()
            .unwrap();

        // Act
        let err = client.execute("/movie/1", Params::new()).await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(!err.message().contains(TEST_KEY));
    }

    #[tokio::test]
    async fn test_invalid_json_is_upstream_error() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let err = client.execute("/movie/1", Params::new()).await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.upstream_status(), Some(200));
    }

    #[tokio::test]
    async fn test_custom_cache_is_used() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TmdbClient::builder()
            .base_url(format!("{}/3/", mock_server.uri()).parse().unwrap())
            .api_key(TEST_KEY)
            .min_interval(Duration::ZERO)
            .cache(RecordingCache::default())
            .build()
            .unwrap();

        // Act
        client.execute("/movie/1", Params::new()).await.unwrap();
        client.execute("/movie/1", Params::new()).await.unwrap();

        // Assert
        assert_eq!(client.cache().gets.load(Ordering::SeqCst), 2);
        assert_eq!(client.cache().sets.load(Ordering::SeqCst), 1);
        let entries = client.cache().entries.lock().unwrap();
        assert!(entries.contains_key(r#"/movie/1:{"language":"en-US"}"#));
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_data() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .mount(&mock_server)
            .await;

        let client = TmdbClient::builder()
            .base_url(format!("{}/3/", mock_server.uri()).parse().unwrap())
            .api_key(TEST_KEY)
            .min_interval(Duration::ZERO)
            .cache(FaultyCache {
                fail_get: false,
                fail_set: true,
            })
            .build()
            .unwrap();

        // Act
        let value = client.execute("/movie/7", Params::new()).await.unwrap();

        // Assert
        assert_eq!(value, json!({"id": 7}));
    }

    #[tokio::test]
    async fn test_cache_read_failure_propagates() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = TmdbClient::builder()
            .base_url(format!("{}/3/", mock_server.uri()).parse().unwrap())
            .api_key(TEST_KEY)
            .min_interval(Duration::ZERO)
            .cache(FaultyCache {
                fail_get: true,
                fail_set: false,
            })
            .build()
            .unwrap();

        // Act
        let err = client.execute("/movie/7", Params::new()).await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.message().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_paginate_over_client() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/popular"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(include_str!(
                "../../../../fixtures/tmdb/movie_popular_page1.json"
            )))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/popular"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(include_str!(
                "../../../../fixtures/tmdb/movie_popular_page2.json"
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let movies = client.movies();

        // Act
        let results = paginate(|page| movies.popular(page, None), 5).await.unwrap();

        // Assert
        let ids: Vec<u64> = results.iter().map(|m| m["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1_011_985, 693_134, 823_464, 359_410]);
    }

    #[tokio::test]
    async fn test_rate_limiter_paces_cache_misses() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = TmdbClient::builder()
            .base_url(format!("{}/3/", mock_server.uri()).parse().unwrap())
            .api_key(TEST_KEY)
            .min_interval(Duration::from_millis(100))
            .build()
            .unwrap();

        // Act
        let start = std::time::Instant::now();
        client.execute("/movie/1", Params::new()).await.unwrap();
        client.execute("/movie/2", Params::new()).await.unwrap();
        let elapsed = start.elapsed();

        // Assert: at least 100ms interval between two upstream requests
        assert!(elapsed >= Duration::from_millis(100));
    }
}
