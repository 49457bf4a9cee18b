//! TMDB API client module.
//!
//! Handles cached GET requests to the TMDB API v3 and exposes them through
//! the movie, TV, people, search, collection, find, configuration and
//! trending namespaces.

mod api;
mod cache;
mod client;
mod envelope;
mod error;
mod images;
mod key;
mod namespaces;
mod paginate;
mod params;
mod rate_limiter;
mod types;
mod utils;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
pub use cache::{CacheError, CacheStore, DEFAULT_CACHE_TTL, LocalCacheStore, MemoryCache};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_LANGUAGE, TmdbClient, TmdbClientBuilder};
pub use envelope::{Envelope, ErrorBody, Pagination};
pub use error::{ApiError, ErrorKind, TransportFailure, classify};
pub use images::{IMAGE_BASE_URL, ORIGINAL_SIZE, image_url};
pub use key::{CacheKey, derive_key};
pub use namespaces::{
    Collections, Configuration, Find, Movies, People, Search, Trending, Tv,
};
pub use paginate::{DEFAULT_MAX_PAGES, paginate};
pub use params::{ExternalSource, ParamValue, Params, ParseParamError, TimeWindow};
#[allow(clippy::module_name_repetitions)]
pub use types::TmdbErrorResponse;
pub use utils::{directors, youtube_trailer};
