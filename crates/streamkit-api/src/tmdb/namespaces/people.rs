//! People endpoints.
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

use serde_json::Value;

use super::{localized, paged, search_query};
use crate::tmdb::api::LocalTmdbApi;
use crate::tmdb::error::ApiError;
use crate::tmdb::params::TimeWindow;

/// Sub-resources bundled into [`People::details`].
const DETAILS_APPEND: &[&str] = &[
    "movie_credits",
    "tv_credits",
    "images",
    "external_ids",
    "combined_credits",
];

/// People namespace.
#[derive(Debug)]
pub struct People<'a, A> {
    api: &'a A,
}

impl<'a, A> People<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> People<'_, A> {
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/search/person", search_query(query, page, language))
            .await
    }

    /// Person record with credits, images and external IDs appended.
    pub async fn details(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        let params = localized(language).with("append_to_response", DETAILS_APPEND);
        self.api.execute(&format!("/person/{id}"), params).await
    }

    pub async fn trending(
        &self,
        window: TimeWindow,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/trending/person/{window}"), paged(page, language))
            .await
    }

    pub async fn popular(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/person/popular", paged(page, language))
            .await
    }
}
