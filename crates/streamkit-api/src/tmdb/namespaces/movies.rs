//! Movie endpoints.
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

use serde_json::Value;

use super::{discover_filters, genre_filters, localized, paged, search_query};
use crate::tmdb::api::LocalTmdbApi;
use crate::tmdb::error::ApiError;
use crate::tmdb::params::{Params, TimeWindow};

/// Sub-resources bundled into [`Movies::details`].
const DETAILS_APPEND: &[&str] = &[
    "videos",
    "credits",
    "recommendations",
    "reviews",
    "external_ids",
    "release_dates",
    "keywords",
];

/// Movie namespace.
#[derive(Debug)]
pub struct Movies<'a, A> {
    api: &'a A,
}

impl<'a, A> Movies<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Movies<'_, A> {
    /// Searches movies by title.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/search/movie", search_query(query, page, language))
            .await
    }

    /// Full movie record with videos, credits, recommendations, reviews,
    /// external IDs, release dates and keywords appended.
    pub async fn details(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        let params = localized(language).with("append_to_response", DETAILS_APPEND);
        self.api.execute(&format!("/movie/{id}"), params).await
    }

    /// Currently popular movies.
    pub async fn popular(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/movie/popular", paged(page, language))
            .await
    }

    /// Trending movies for the given window.
    pub async fn trending(
        &self,
        window: TimeWindow,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/trending/movie/{window}"), paged(page, language))
            .await
    }

    /// Upcoming releases.
    pub async fn upcoming(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/movie/upcoming", paged(page, language))
            .await
    }

    /// Movies now in theaters.
    pub async fn now_playing(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/movie/now_playing", paged(page, language))
            .await
    }

    /// Top rated movies.
    pub async fn top_rated(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/movie/top_rated", paged(page, language))
            .await
    }

    /// Official movie genre list.
    pub async fn genres(&self, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/genre/movie/list", localized(language))
            .await
    }

    /// Discover movies with arbitrary TMDB filters.
    pub async fn discover(&self, filters: Params) -> Result<Value, ApiError> {
        self.api
            .execute("/discover/movie", discover_filters(filters))
            .await
    }

    /// Most popular movies of one genre.
    pub async fn by_genre(
        &self,
        genre_id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/discover/movie", genre_filters(genre_id, page, language))
            .await
    }

    /// Streaming/rent/buy availability per region.
    pub async fn watch_providers(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/watch/providers"), localized(language))
            .await
    }

    pub async fn similar(
        &self,
        id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/similar"), paged(page, language))
            .await
    }

    pub async fn recommendations(
        &self,
        id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/recommendations"), paged(page, language))
            .await
    }

    pub async fn reviews(
        &self,
        id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/reviews"), paged(page, language))
            .await
    }

    pub async fn keywords(&self, id: u64) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/keywords"), Params::new())
            .await
    }

    /// Cast and crew.
    pub async fn credits(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/credits"), localized(language))
            .await
    }

    /// Trailers, teasers and clips.
    pub async fn videos(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/movie/{id}/videos"), localized(language))
            .await
    }
}
