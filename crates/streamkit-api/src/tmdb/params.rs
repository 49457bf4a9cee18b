//! Request parameter bag and typed parameter values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single query parameter value.
///
/// Lists are sent upstream comma-joined, which is how TMDB expects
/// `append_to_response` and `with_genres`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Free text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// List of values.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Renders the value as it is sent in the query string.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::to_query_value)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Returns `true` for values the pipeline treats as "not provided".
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Integer(_) | Self::Float(_) | Self::Bool(_) => false,
        }
    }
}

/// Canonical form used in cache keys. Finite floats are JSON numbers;
/// non-finite ones become `{"float": "NaN" | "inf" | "-inf"}` so they
/// neither collapse to `null` nor collide with text values.
impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Self::Float(_) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("float", &self.to_query_value())?;
                map.end()
            }
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for ParamValue {
    fn from(values: &[&str]) -> Self {
        Self::List(values.iter().copied().map(Self::from).collect())
    }
}

/// Query parameters accompanying a request.
///
/// Keys are held in lexicographic order, so two bags with the same
/// key/value pairs compare and serialize identically regardless of the
/// order in which they were built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Creates an empty parameter bag.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a parameter, replacing any previous value for the key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Adds a parameter only when `value` is `Some`.
    #[must_use]
    pub fn with_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Inserts a parameter, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Inserts `value` when the key is missing or blank (empty text or
    /// empty list). Returns `true` if the default was applied.
    pub fn insert_default(&mut self, key: &str, value: impl Into<ParamValue>) -> bool {
        if self.0.get(key).is_some_and(|v| !v.is_blank()) {
            return false;
        }
        self.0.insert(String::from(key), value.into());
        true
    }

    /// Removes a parameter.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Returns `true` if the bag holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the bag as query pairs, in key order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_query_value()))
            .collect()
    }

    /// Serializes the bag as a JSON object with sorted keys.
    ///
    /// Falls back to the `Debug` rendering if serialization ever fails,
    /// which keeps the output deterministic either way.
    #[must_use]
    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| format!("{:?}", self.0))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Error returned when a typed parameter cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseParamError {
    kind: &'static str,
    value: String,
}

/// Time window for trending endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeWindow {
    /// Trending over the last day.
    #[default]
    Day,
    /// Trending over the last week.
    Week,
}

impl TimeWindow {
    /// Path segment used by TMDB.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(ParseParamError {
                kind: "time window",
                value: String::from(other),
            }),
        }
    }
}

/// External ID sources accepted by `find/{external_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalSource {
    /// IMDb (`tt…` / `nm…`).
    ImdbId,
    /// Facebook.
    FacebookId,
    /// Instagram.
    InstagramId,
    /// TheTVDB.
    TvdbId,
    /// TikTok.
    TiktokId,
    /// Twitter / X.
    TwitterId,
    /// Wikidata.
    WikidataId,
    /// YouTube.
    YoutubeId,
}

impl ExternalSource {
    /// Value of the `external_source` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImdbId => "imdb_id",
            Self::FacebookId => "facebook_id",
            Self::InstagramId => "instagram_id",
            Self::TvdbId => "tvdb_id",
            Self::TiktokId => "tiktok_id",
            Self::TwitterId => "twitter_id",
            Self::WikidataId => "wikidata_id",
            Self::YoutubeId => "youtube_id",
        }
    }
}

impl fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExternalSource {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imdb_id" => Ok(Self::ImdbId),
            "facebook_id" => Ok(Self::FacebookId),
            "instagram_id" => Ok(Self::InstagramId),
            "tvdb_id" => Ok(Self::TvdbId),
            "tiktok_id" => Ok(Self::TiktokId),
            "twitter_id" => Ok(Self::TwitterId),
            "wikidata_id" => Ok(Self::WikidataId),
            "youtube_id" => Ok(Self::YoutubeId),
            other => Err(ParseParamError {
                kind: "external source",
                value: String::from(other),
            }),
        }
    }
}
