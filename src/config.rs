//! Environment-driven configuration, loaded once at startup.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct Config {
    /// Listening port, `PORT` (default 5000)
    pub port: u16,
    /// Provider credential, `OPENWEATHER_API_KEY`. Optional at startup;
    /// `/weather` responds 500 while it is absent.
    pub api_key: Option<String>,
    /// Recent-location store directory, `WEATHER_STORE_PATH`. Absence
    /// disables persistence entirely.
    pub store_path: Option<PathBuf>,
    /// Provider endpoint, `OPENWEATHER_BASE_URL` override
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            api_key: non_empty_var("OPENWEATHER_API_KEY"),
            store_path: non_empty_var("WEATHER_STORE_PATH").map(PathBuf::from),
            base_url: non_empty_var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// An empty environment variable counts as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config {
            port: DEFAULT_PORT,
            api_key: None,
            store_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        };
        assert_eq!(config.port, 5000);
        assert!(config.base_url.contains("api.openweathermap.org"));
    }
}
