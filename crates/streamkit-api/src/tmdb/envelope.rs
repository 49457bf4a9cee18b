//! Uniform `{success, data, pagination, error}` response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

/// Page metadata lifted out of a paged TMDB response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-based).
    pub page: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of results.
    pub total_results: u64,
}

impl Pagination {
    /// Reads `page`/`total_pages`/`total_results` from a response body.
    ///
    /// Returns `None` unless all three are present.
    #[must_use]
    pub fn from_response(body: &Value) -> Option<Self> {
        let field = |name: &str| body.get(name).and_then(Value::as_u64);
        Some(Self {
            page: field("page")?,
            total_pages: field("total_pages")?,
            total_results: field("total_results")?,
        })
    }
}

/// Error member of a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable code (e.g. `NOT_FOUND`).
    pub code: String,
    /// Display message.
    pub message: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            code: String::from(err.kind().code()),
            message: err.message(),
        }
    }
}

/// Response envelope for consumers that want one shape for every outcome.
///
/// Absent members are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// `true` when `data` is present.
    pub success: bool,
    /// Payload (the `results` list for paged responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Page metadata for paged responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    /// Wraps a successful response.
    ///
    /// Paged responses (a `results` array plus page counters) are split into
    /// `data = results` and `pagination`; anything else becomes `data` as is.
    #[must_use]
    pub fn success(mut body: Value) -> Self {
        let pagination = Pagination::from_response(&body);
        let is_paged = pagination.is_some() && body.get("results").is_some_and(Value::is_array);

        if is_paged {
            let results = body.get_mut("results").map(Value::take);
            return Self {
                success: true,
                data: results,
                pagination,
                error: None,
            };
        }

        Self {
            success: true,
            data: Some(body),
            pagination: None,
            error: None,
        }
    }

    /// Wraps a failure.
    #[must_use]
    pub fn failure(err: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            pagination: None,
            error: Some(ErrorBody::from(err)),
        }
    }

    /// Builds an envelope from a pipeline result.
    #[must_use]
    pub fn from_result(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(body) => Self::success(body),
            Err(err) => Self::failure(&err),
        }
    }
}
