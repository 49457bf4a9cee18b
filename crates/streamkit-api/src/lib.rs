//! Client library for the TMDB API.
//!
//! Every request flows through a single cached pipeline that injects
//! defaults, derives a cache key, consults a pluggable cache, and normalizes
//! upstream failures into a closed error taxonomy.

/// TMDB API client.
pub mod tmdb;
