//! Error taxonomy and upstream failure classification.

use reqwest::StatusCode;

use super::types::TmdbErrorResponse;

/// Replacement for the API key wherever it would appear in a message.
const REDACTED: &str = "***";

/// Failure surfaced to callers of the client.
///
/// The set is closed: every upstream or transport fault is classified into
/// one of these variants, and the message is safe to display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ApiError {
    /// No API key was supplied when building the client.
    #[error("TMDB API key is required")]
    MissingCredential,
    /// Upstream rejected the API key (HTTP 401).
    #[error("Invalid TMDB API key")]
    InvalidCredential,
    /// Resource absent upstream (HTTP 404).
    #[error("Resource not found")]
    NotFound,
    /// Upstream throttling (HTTP 429).
    #[error("TMDB API rate limit exceeded")]
    RateLimited,
    /// Any other upstream failure.
    #[error("TMDB API error: {message}")]
    Upstream {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Upstream-provided or transport message.
        message: String,
    },
    /// No HTTP response (connection refused, DNS, timeout).
    #[error("TMDB network error: {message}")]
    Network {
        /// Transport message.
        message: String,
    },
}

impl ApiError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::NotFound => ErrorKind::NotFound,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Network { .. } => ErrorKind::Network,
        }
    }

    /// Human-readable message suitable for direct display.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Upstream HTTP status associated with the error, if any.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::InvalidCredential => Some(401),
            Self::NotFound => Some(404),
            Self::RateLimited => Some(429),
            Self::Upstream { status, .. } => *status,
            Self::MissingCredential | Self::Network { .. } => None,
        }
    }
}

/// Discriminant of [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ApiError::MissingCredential`].
    MissingCredential,
    /// See [`ApiError::InvalidCredential`].
    InvalidCredential,
    /// See [`ApiError::NotFound`].
    NotFound,
    /// See [`ApiError::RateLimited`].
    RateLimited,
    /// See [`ApiError::Upstream`].
    Upstream,
    /// See [`ApiError::Network`].
    Network,
}

impl ErrorKind {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Upstream => "UPSTREAM_ERROR",
            Self::Network => "NETWORK_ERROR",
        }
    }

    /// Status code an HTTP façade should answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::RateLimited => 429,
            Self::MissingCredential | Self::InvalidCredential | Self::Upstream | Self::Network => {
                500
            }
        }
    }
}

/// Raw outcome of a failed upstream call, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Upstream answered with a non-success status.
    Status {
        /// HTTP status.
        status: StatusCode,
        /// Raw response body (may be empty or non-JSON).
        body: String,
    },
    /// No HTTP response was received.
    NoResponse {
        /// Transport message.
        message: String,
    },
}

impl TransportFailure {
    /// Builds a `NoResponse` failure from a `reqwest` error.
    ///
    /// The request URL (which carries the API key) is stripped first; the
    /// error's source chain is appended so the cause stays visible.
    #[must_use]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::NoResponse { message }
    }
}

/// Maps a transport failure to an [`ApiError`].
///
/// | Condition              | Result              |
/// |------------------------|---------------------|
/// | HTTP 401               | `InvalidCredential` |
/// | HTTP 404               | `NotFound`          |
/// | HTTP 429               | `RateLimited`       |
/// | other HTTP status      | `Upstream`          |
/// | no response            | `Network`           |
///
/// Any occurrence of `api_key` in a carried message is replaced with `***`.
#[must_use]
pub fn classify(failure: &TransportFailure, api_key: &str) -> ApiError {
    match failure {
        TransportFailure::Status { status, body } => match *status {
            StatusCode::UNAUTHORIZED => ApiError::InvalidCredential,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            other => {
                let upstream = serde_json::from_str::<TmdbErrorResponse>(body).ok();
                let message = upstream
                    .as_ref()
                    .and_then(TmdbErrorResponse::message)
                    .map_or_else(
                        || format!("request failed with status code {}", other.as_u16()),
                        String::from,
                    );
                ApiError::Upstream {
                    status: Some(other.as_u16()),
                    message: redact(&message, api_key),
                }
            }
        },
        TransportFailure::NoResponse { message } => ApiError::Network {
            message: redact(message, api_key),
        },
    }
}

/// Replaces every occurrence of `secret` in `text`.
pub(crate) fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return String::from(text);
    }
    text.replace(secret, REDACTED)
}
