//! OpenWeatherMap client.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::weather::CurrentConditions;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_PROVIDER_MESSAGE: &str = "Failed to fetch weather data.";

/// A validated weather lookup input: exactly one of a coordinate pair or a
/// free-text place name.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates { lat: f64, lon: f64 },
    Place(String),
}

impl WeatherQuery {
    /// Builds a query from the raw request parameters.
    ///
    /// A full coordinate pair wins over `q` when both are supplied, matching
    /// the historical behavior of this endpoint. Empty parameters count as
    /// absent. A supplied pair that does not parse as numbers is
    /// `InvalidCoordinates`; neither variant populated is `MissingInput`.
    /// Both fail before any network access.
    pub fn from_parts(
        q: Option<String>,
        lat: Option<String>,
        lon: Option<String>,
    ) -> Result<Self, ApiError> {
        let lat = lat.filter(|v| !v.is_empty());
        let lon = lon.filter(|v| !v.is_empty());
        if let (Some(lat), Some(lon)) = (lat, lon) {
            return match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Ok(WeatherQuery::Coordinates { lat, lon }),
                _ => Err(ApiError::InvalidCoordinates),
            };
        }
        match q {
            Some(place) if !place.is_empty() => Ok(WeatherQuery::Place(place)),
            _ => Err(ApiError::MissingInput),
        }
    }
}

pub struct WeatherClient {
    http: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("weathervane/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetches current conditions for the given query.
    ///
    /// Always requests metric units. A non-success provider status becomes
    /// `ApiError::Provider` carrying the provider's status code and, when the
    /// error body has a `message` field, its message.
    #[tracing::instrument(name = "fetch_weather", level = "debug", skip(self, api_key))]
    pub async fn fetch(
        &self,
        query: &WeatherQuery,
        api_key: &str,
    ) -> Result<CurrentConditions, ApiError> {
        let mut params: Vec<(&str, String)> = match query {
            WeatherQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            WeatherQuery::Place(name) => vec![("q", name.clone())],
        };
        params.push(("units", "metric".to_string()));
        params.push(("appid", api_key.to_string()));

        debug!("Calling the weather provider");
        let response = self.http.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("message")?.as_str().map(str::to_string))
                .unwrap_or_else(|| FALLBACK_PROVIDER_MESSAGE.to_string());
            return Err(ApiError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<CurrentConditions>().await?)
    }
}
