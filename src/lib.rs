//! Weather Scout - current weather lookups through an AI browsing agent
//!
//! A lookup asks the browsing agent first and falls back to the keyless
//! Open-Meteo API when the agent times out, fails or returns incomplete
//! values. Successful lookups are kept in a small in-memory history.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{RecentSearches, ResolveError, ResolverTimeouts, WeatherResolver};
pub use models::{Envelope, Location, SourceKind, WeatherRecord};
pub use services::{SourceError, WeatherSource};
