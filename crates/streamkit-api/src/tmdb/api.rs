//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use serde_json::Value;

use super::error::ApiError;
use super::params::Params;

/// TMDB API trait.
///
/// The single chokepoint every namespace method goes through. Abstracted so
/// namespaces can be driven by a mock in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Issues a cached GET against `endpoint` (e.g. `/movie/550`).
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`] if the upstream call fails.
    async fn execute(&self, endpoint: &str, params: Params) -> Result<Value, ApiError>;
}
