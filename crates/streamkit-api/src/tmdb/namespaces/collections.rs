//! Collection endpoints.
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

use serde_json::Value;

use super::{localized, search_query};
use crate::tmdb::api::LocalTmdbApi;
use crate::tmdb::error::ApiError;

/// Collection namespace.
#[derive(Debug)]
pub struct Collections<'a, A> {
    api: &'a A,
}

impl<'a, A> Collections<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Collections<'_, A> {
    /// Collection record including its parts.
    pub async fn details(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/collection/{id}"), localized(language))
            .await
    }

    pub async fn search(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/search/collection", search_query(query, page, language))
            .await
    }
}
