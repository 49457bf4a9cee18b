//! Application configuration module.
//!
//! Manages the TOML config file holding the TMDB credential, cache
//! backend choice and default response language.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, CacheBackend};
pub use paths::resolve_config_path;
