//! Image URL construction.

/// Base URL of the TMDB image CDN.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Size segment selecting the original upload.
pub const ORIGINAL_SIZE: &str = "original";

/// Builds a full image URL from a `poster_path`/`profile_path` style value.
///
/// Returns `None` for a missing or empty path. An empty `size` selects
/// [`ORIGINAL_SIZE`]. Typical sizes are `w92`, `w185`, `w500`, `w780`.
#[must_use]
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    let size = if size.is_empty() { ORIGINAL_SIZE } else { size };
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!("{IMAGE_BASE_URL}{size}{separator}{path}"))
}
