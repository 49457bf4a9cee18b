//! Cross-type search endpoints.
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

use serde_json::Value;

use super::{paged, search_query};
use crate::tmdb::api::LocalTmdbApi;
use crate::tmdb::error::ApiError;

/// Search namespace.
#[derive(Debug)]
pub struct Search<'a, A> {
    api: &'a A,
}

impl<'a, A> Search<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Search<'_, A> {
    /// Searches movies, series and people in one request.
    pub async fn multi(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/search/multi", search_query(query, page, language))
            .await
    }

    /// Keywords are not localized; no `language` is sent by this method.
    pub async fn keyword(&self, query: &str, page: u32) -> Result<Value, ApiError> {
        self.api
            .execute("/search/keyword", paged(page, None).with("query", query))
            .await
    }

    pub async fn company(&self, query: &str, page: u32) -> Result<Value, ApiError> {
        self.api
            .execute("/search/company", paged(page, None).with("query", query))
            .await
    }
}
