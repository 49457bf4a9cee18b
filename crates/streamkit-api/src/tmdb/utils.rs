//! Helpers over decoded TMDB payloads.

use serde_json::Value;

/// YouTube watch URL prefix.
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Picks the main YouTube trailer from a `videos.results` list.
///
/// Prefers an official YouTube trailer or teaser; otherwise falls back to
/// any YouTube trailer. Returns the watch URL.
#[must_use]
pub fn youtube_trailer(videos: &[Value]) -> Option<String> {
    fn field<'a>(video: &'a Value, name: &str) -> Option<&'a str> {
        video.get(name).and_then(Value::as_str)
    }

    let mut youtube = videos
        .iter()
        .filter(|v| field(v, "site") == Some("YouTube"));

    let official = youtube.clone().find(|v| {
        matches!(field(v, "type"), Some("Trailer" | "Teaser"))
            && v.get("official").and_then(Value::as_bool) == Some(true)
    });
    let trailer = official.or_else(|| youtube.find(|v| field(v, "type") == Some("Trailer")))?;

    let key = field(trailer, "key")?;
    Some(format!("{YOUTUBE_WATCH_URL}{key}"))
}

/// Returns the crew members whose job is `Director` in a credits object.
#[must_use]
pub fn directors(credits: &Value) -> Vec<&Value> {
    credits
        .get("crew")
        .and_then(Value::as_array)
        .map(|crew| {
            crew.iter()
                .filter(|m| m.get("job").and_then(Value::as_str) == Some("Director"))
                .collect()
        })
        .unwrap_or_default()
}
