//! Resource namespaces.
//!
//! Each namespace fixes an endpoint template and a parameter set, then
//! hands the request to [`LocalTmdbApi::execute`]. Every method returns the
//! pipeline's [`ApiError`](super::error::ApiError) unchanged on failure.

mod collections;
mod movies;
mod people;
mod search;
mod system;
mod tv;

pub use collections::Collections;
pub use movies::Movies;
pub use people::People;
pub use search::Search;
pub use system::{Configuration, Find, Trending};
pub use tv::Tv;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::error::ApiError;
use super::params::Params;

/// `include_adult` value sent with searches and discover queries.
const INCLUDE_ADULT: bool = false;

/// Bytes escaped when free text becomes a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encodes caller text as exactly one path segment.
///
/// Empty, `.` and `..` cannot name a resource and would be collapsed by URL
/// resolution, so they are answered with [`ApiError::NotFound`] before any
/// request is made.
fn path_segment(raw: &str) -> Result<String, ApiError> {
    if matches!(raw, "" | "." | "..") {
        return Err(ApiError::NotFound);
    }
    Ok(utf8_percent_encode(raw, PATH_SEGMENT).to_string())
}

/// Parameters of a localized single-resource request.
fn localized(language: Option<&str>) -> Params {
    Params::new().with_opt("language", language)
}

/// Parameters of a paged listing. Page numbers start at 1.
fn paged(page: u32, language: Option<&str>) -> Params {
    localized(language).with("page", page.max(1))
}

/// Parameters of a text search.
fn search_query(query: &str, page: u32, language: Option<&str>) -> Params {
    paged(page, language)
        .with("query", query)
        .with("include_adult", INCLUDE_ADULT)
}

/// Caller-supplied discover filters with the adult filter defaulted.
fn discover_filters(mut params: Params) -> Params {
    params.insert_default("include_adult", INCLUDE_ADULT);
    params
}

/// Discover filters listing one genre by popularity.
fn genre_filters(genre_id: u64, page: u32, language: Option<&str>) -> Params {
    discover_filters(
        paged(page, language)
            .with("with_genres", genre_id)
            .with("sort_by", "popularity.desc"),
    )
}
