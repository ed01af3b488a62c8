//! `weathervane` - weather lookup service
//!
//! Accepts a city name or coordinate pair, fetches current conditions from
//! OpenWeatherMap, normalizes them into a compact payload, and keeps a
//! best-effort history of the five most recently viewed locations.

pub mod api;
pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::Config;
pub use error::ApiError;
pub use provider::{WeatherClient, WeatherQuery};
pub use store::{LocationStore, NoopLocationStore, PersistentLocationStore, RecentLocation};
pub use weather::{CurrentConditions, WeatherReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
