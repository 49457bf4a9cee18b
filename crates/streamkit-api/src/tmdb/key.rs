//! Cache key derivation.

use std::fmt;

use super::params::Params;

/// Deterministic identifier of a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the cache key `{endpoint}:{params as sorted JSON}`.
///
/// Parameter keys are serialized in lexicographic order, so bags built in
/// different orders map to the same key.
#[must_use]
pub fn derive_key(endpoint: &str, params: &Params) -> CacheKey {
    CacheKey(format!("{endpoint}:{}", params.to_canonical_json()))
}
