//! TV series endpoints.
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

use serde_json::Value;

use super::{discover_filters, genre_filters, localized, paged, search_query};
use crate::tmdb::api::LocalTmdbApi;
use crate::tmdb::error::ApiError;
use crate::tmdb::params::{Params, TimeWindow};

/// Sub-resources bundled into [`Tv::details`].
const DETAILS_APPEND: &[&str] = &[
    "videos",
    "credits",
    "recommendations",
    "reviews",
    "external_ids",
    "content_ratings",
    "keywords",
];

/// Sub-resources bundled into season and episode lookups.
const EPISODE_APPEND: &[&str] = &["videos", "credits"];

/// TV namespace.
#[derive(Debug)]
pub struct Tv<'a, A> {
    api: &'a A,
}

impl<'a, A> Tv<'a, A> {
    /// Wraps an API handle.
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: LocalTmdbApi> Tv<'_, A> {
    /// Searches series by name.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/search/tv", search_query(query, page, language))
            .await
    }

    /// Full series record with videos, credits, recommendations, reviews,
    /// external IDs, content ratings and keywords appended.
    pub async fn details(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        let params = localized(language).with("append_to_response", DETAILS_APPEND);
        self.api.execute(&format!("/tv/{id}"), params).await
    }

    pub async fn popular(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api.execute("/tv/popular", paged(page, language)).await
    }

    pub async fn top_rated(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/tv/top_rated", paged(page, language))
            .await
    }

    /// Trending series for the given window.
    pub async fn trending(
        &self,
        window: TimeWindow,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/trending/tv/{window}"), paged(page, language))
            .await
    }

    /// Series with an episode airing today.
    pub async fn airing_today(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/tv/airing_today", paged(page, language))
            .await
    }

    /// Series with an episode airing in the next seven days.
    pub async fn on_the_air(&self, page: u32, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/tv/on_the_air", paged(page, language))
            .await
    }

    /// One season with its videos and credits.
    pub async fn season(
        &self,
        id: u64,
        season: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        let params = localized(language).with("append_to_response", EPISODE_APPEND);
        self.api
            .execute(&format!("/tv/{id}/season/{season}"), params)
            .await
    }

    /// One episode with its videos and credits.
    pub async fn episode(
        &self,
        id: u64,
        season: u32,
        episode: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        let params = localized(language).with("append_to_response", EPISODE_APPEND);
        self.api
            .execute(
                &format!("/tv/{id}/season/{season}/episode/{episode}"),
                params,
            )
            .await
    }

    pub async fn watch_providers(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/tv/{id}/watch/providers"), localized(language))
            .await
    }

    pub async fn genres(&self, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute("/genre/tv/list", localized(language))
            .await
    }

    /// Discover series with arbitrary TMDB filters.
    pub async fn discover(&self, filters: Params) -> Result<Value, ApiError> {
        self.api
            .execute("/discover/tv", discover_filters(filters))
            .await
    }

    /// Most popular series of one genre.
    pub async fn by_genre(
        &self,
        genre_id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute("/discover/tv", genre_filters(genre_id, page, language))
            .await
    }

    pub async fn credits(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/tv/{id}/credits"), localized(language))
            .await
    }

    pub async fn videos(&self, id: u64, language: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/tv/{id}/videos"), localized(language))
            .await
    }

    pub async fn reviews(
        &self,
        id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/tv/{id}/reviews"), paged(page, language))
            .await
    }

    pub async fn similar(
        &self,
        id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/tv/{id}/similar"), paged(page, language))
            .await
    }

    pub async fn recommendations(
        &self,
        id: u64,
        page: u32,
        language: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.api
            .execute(&format!("/tv/{id}/recommendations"), paged(page, language))
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tmdb::namespaces::test_support::RecordingApi;
    use crate::tmdb::params::ParamValue;

    #[tokio::test]
    async fn test_details_appends_content_ratings() {
        // Arrange
        let api = RecordingApi::default();

        // Act
        Tv::new(&api).details(1399, Some("ja-JP")).await.unwrap();

        // Assert
        let (endpoint, params) = api.last().unwrap();
        assert_eq!(endpoint, "/tv/1399");
        assert_eq!(
            params.get("append_to_response").unwrap().to_query_value(),
            "videos,credits,recommendations,reviews,external_ids,content_ratings,keywords"
        );
        assert_eq!(params.get("language"), Some(&ParamValue::from("ja-JP")));
    }

    #[tokio::test]
    async fn test_season_and_episode_paths() {
        // Arrange
        let api = RecordingApi::default();
        let tv = Tv::new(&api);

        // Act & Assert
        tv.season(1399, 2, None).await.unwrap();
        let (endpoint, params) = api.last().unwrap();
        assert_eq!(endpoint, "/tv/1399/season/2");
        assert_eq!(
            params.get("append_to_response").unwrap().to_query_value(),
            "videos,credits"
        );

        tv.episode(1399, 2, 9, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/1399/season/2/episode/9");
    }

    #[tokio::test]
    async fn test_listing_endpoints() {
        // Arrange
        let api = RecordingApi::default();
        let tv = Tv::new(&api);

        // Act & Assert
        tv.popular(1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/popular");
        tv.top_rated(1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/top_rated");
        tv.airing_today(1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/airing_today");
        tv.on_the_air(1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/on_the_air");
        tv.trending(TimeWindow::Day, 1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/trending/tv/day");
        tv.genres(None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/genre/tv/list");
    }

    #[tokio::test]
    async fn test_per_series_endpoints() {
        // Arrange
        let api = RecordingApi::default();
        let tv = Tv::new(&api);

        // Act & Assert
        tv.watch_providers(5, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/5/watch/providers");
        tv.credits(5, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/5/credits");
        tv.videos(5, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/5/videos");
        tv.reviews(5, 2, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/5/reviews");
        tv.similar(5, 1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/5/similar");
        tv.recommendations(5, 1, None).await.unwrap();
        assert_eq!(api.last().unwrap().0, "/tv/5/recommendations");
    }

    #[tokio::test]
    async fn test_search_and_genre_discovery() {
        // Arrange
        let api = RecordingApi::default();
        let tv = Tv::new(&api);

        // Act & Assert
        tv.search("Dark", 1, None).await.unwrap();
        let (endpoint, params) = api.last().unwrap();
        assert_eq!(endpoint, "/search/tv");
        assert_eq!(params.get("include_adult"), Some(&ParamValue::Bool(false)));

        tv.by_genre(18, 1, None).await.unwrap();
        let (endpoint, params) = api.last().unwrap();
        assert_eq!(endpoint, "/discover/tv");
        assert_eq!(params.get("with_genres"), Some(&ParamValue::Integer(18)));

        tv.discover(Params::new().with("first_air_date_year", 2017))
            .await
            .unwrap();
        assert_eq!(api.last().unwrap().0, "/discover/tv");
    }
}
