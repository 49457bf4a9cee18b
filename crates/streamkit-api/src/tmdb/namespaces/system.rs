//! External ID lookup, API configuration and mixed trending.
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

use serde_json::Value;

use super::{localized, paged, path_segment};
use crate::tmdb::api::LocalTmdbApi;
use crate::tmdb::error::ApiError;
use crate::tmdb::params::{ExternalSource, Params, TimeWindow};

/// Lookup of TMDB objects by an external identifier.
#[derive(Debug)]
pub struct Find<'a, A> {
    api: &'a A,
}

impl<'a, A> Find<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Find<'_, A> {
    /// Finds movies, series, episodes and people matching `external_id`.
    ///
    /// `external_id` is percent-encoded into a single path segment.
    pub async fn by_id(
        &self,
        external_id: &str,
        source: ExternalSource,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        let segment = path_segment(external_id)?;
        let params = localized(language).with("external_source", source.as_str());
        self.api
            .execute(&format!("/find/{segment}"), params)
            .await
    }
}

/// API configuration namespace. None of these endpoints is localized.
#[derive(Debug)]
pub struct Configuration<'a, A> {
    api: &'a A,
}

impl<'a, A> Configuration<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Configuration<'_, A> {
    /// Image base URLs and sizes.
    pub async fn api_config(&self) -> Result<Value, ApiError> {
        self.api.execute("/configuration", Params::new()).await
    }

    pub async fn countries(&self) -> Result<Value, ApiError> {
        self.api
            .execute("/configuration/countries", Params::new())
            .await
    }

    pub async fn jobs(&self) -> Result<Value, ApiError> {
        self.api
            .execute("/configuration/jobs", Params::new())
            .await
    }

    pub async fn languages(&self) -> Result<Value, ApiError> {
        self.api
            .execute("/configuration/languages", Params::new())
            .await
    }

    pub async fn primary_translations(&self) -> Result<Value, ApiError> {
        self.api
            .execute("/configuration/primary_translations", Params::new())
            .await
    }

    pub async fn timezones(&self) -> Result<Value, ApiError> {
        self.api
            .execute("/configuration/timezones", Params::new())
            .await
    }
}

/// Trending across movies, series and people.
#[derive(Debug)]
pub struct Trending<'a, A> {
    api: &'a A,
}

impl<'a, A> Trending<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Trending<'_, A> {
    pub async fn all(&self, window: TimeWindow, page: u32) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/trending/all/{window}"), paged(page, None))
            .await
    }
}
