//! Multi-page aggregation over paged TMDB endpoints.

use serde_json::Value;

use super::error::ApiError;

/// Default page cap for [`paginate`].
pub const DEFAULT_MAX_PAGES: u32 = 2;

/// Fetches pages `1..=max_pages` sequentially and concatenates their
/// `results` arrays.
///
/// `fetch_page` receives the 1-based page number. Aggregation stops early
/// when a page reports `page >= total_pages`, or when a response has no
/// `results` array (in which case that page contributes nothing). A page
/// without `total_pages` does not end aggregation by itself.
///
/// # Errors
///
/// Returns the first error raised by `fetch_page`; items gathered from
/// earlier pages are discarded.
pub async fn paginate<F, Fut>(mut fetch_page: F, max_pages: u32) -> Result<Vec<Value>, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
{
    let mut items: Vec<Value> = Vec::new();
    let mut page: u32 = 1;

    while page <= max_pages {
        let mut body = fetch_page(page).await?;

        let Some(Value::Array(results)) = body.get_mut("results").map(Value::take) else {
            tracing::warn!(page = page, "response has no results array, stopping");
            break;
        };

        let fetched = results.len();
        items.extend(results);

        let total_pages = body.get("total_pages").and_then(Value::as_u64);

        tracing::info!(
            page = page,
            fetched = fetched,
            total_pages = ?total_pages,
            accumulated = items.len(),
            "page completed"
        );

        if total_pages.is_some_and(|total| u64::from(page) >= total) {
            break;
        }

        let Some(next) = page.checked_add(1) else {
            break;
        };
        page = next;
    }

    Ok(items)
}
