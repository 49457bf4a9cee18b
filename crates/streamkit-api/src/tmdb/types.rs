//! TMDB wire types the pipeline inspects.
//!
//! Successful payloads are passed through as opaque JSON; only the error
//! body is decoded.

use serde::Deserialize;

/// TMDB error response body.
///
/// TMDB sends `status_code`/`status_message`; some proxies in front of it
/// use a bare `message` field instead.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbErrorResponse {
    /// TMDB-specific error code.
    #[serde(default)]
    pub status_code: Option<u32>,
    /// Human-readable error message.
    #[serde(default)]
    pub status_message: Option<String>,
    /// Alternative message field.
    #[serde(default)]
    pub message: Option<String>,
    /// Always `false` for errors.
    #[serde(default)]
    pub success: Option<bool>,
}

impl TmdbErrorResponse {
    /// Returns the most specific non-empty message in the body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.status_message
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}
