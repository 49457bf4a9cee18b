//! `AppConfig` struct and TOML loading.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB client settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// TMDB client configuration.
#[derive(Deserialize, Default, PartialEq, Eq)]
pub struct TmdbConfig {
    /// API key. `TMDB_API_KEY` takes precedence when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Cache time-to-live in seconds (0 or absent: 300).
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    /// Default response language (e.g. `ja-JP`).
    #[serde(default)]
    pub language: Option<String>,
}

impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("language", &self.language)
            .finish()
    }
}

/// Response cache configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: CacheBackend,
}

/// Cache storage backend.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process memory; lost when the command exits.
    #[default]
    Memory,
    /// `SQLite` database under the data directory.
    Sqlite,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Resolves the API key: a non-empty `env_key` wins over the file.
    #[must_use]
    pub fn api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|k| !k.is_empty())
            .or_else(|| self.tmdb.api_key.clone())
            .filter(|k| !k.is_empty())
    }

    /// Cache time-to-live (zero selects the client default).
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.tmdb.cache_ttl_secs.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert!(config.api_key(None).is_none());
    }

    #[test]
    fn test_parse_full_config() {
        // Arrange
        let toml_str = r#"
            [tmdb]
            api_key = "file-key"
            cache_ttl_secs = 600
            language = "ja-JP"

            [cache]
            backend = "sqlite"
        "#;

        // Act
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(config.tmdb.language.as_deref(), Some("ja-JP"));
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    }

    #[test]
    fn test_env_key_overrides_file() {
        // Arrange
        let config: AppConfig = toml::from_str("[tmdb]\napi_key = \"file-key\"").unwrap();

        // Act & Assert
        assert_eq!(
            config.api_key(Some(String::from("env-key"))).as_deref(),
            Some("env-key")
        );
        assert_eq!(config.api_key(Some(String::new())).as_deref(), Some("file-key"));
        assert_eq!(config.api_key(None).as_deref(), Some("file-key"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        // Arrange
        let config: AppConfig = toml::from_str("[tmdb]\napi_key = \"secret-value\"").unwrap();

        // Act
        let rendered = format!("{config:?}");

        // Assert
        assert!(!rendered.contains("secret-value"));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_invalid_backend_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nbackend = \"redis\"").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }
}
