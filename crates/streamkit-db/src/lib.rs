//! Persistent response cache.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep TMDB responses across
//! process restarts. [`SqliteCache`] plugs into the client as its cache
//! backend.

mod cache;
mod connection;
mod migrations;

#[allow(clippy::module_name_repetitions)]
pub use cache::SqliteCache;
pub use connection::open_db;
