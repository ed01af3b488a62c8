//! Provider response shapes and the normalized weather report.
//!
//! The provider's schema is not contractually stable, so every nested field
//! here is optional: a missing object or leaf deserializes to `None` and
//! flows through normalization as `null` instead of faulting.

use serde::{Deserialize, Serialize};

/// Raw current-weather body as returned by OpenWeatherMap.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub sys: Option<SysBlock>,
    pub coord: Option<Coordinates>,
    pub weather: Option<Vec<ConditionEntry>>,
    pub main: Option<MainReadings>,
    pub wind: Option<WindReadings>,
    pub clouds: Option<CloudReadings>,
    /// Observation time, unix seconds
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysBlock {
    /// ISO 3166-1 alpha-2 country code
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionEntry {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindReadings {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudReadings {
    /// Cloud cover percentage
    pub all: Option<u8>,
}

/// Normalized weather payload served to clients.
///
/// Temperatures are Celsius, wind speed m/s, `timestamp` epoch milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub weather: ConditionSummary,
    pub temperature: TemperatureSummary,
    pub humidity: Option<u8>,
    pub wind: WindSummary,
    pub clouds: Option<u8>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionSummary {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemperatureSummary {
    pub current: Option<f64>,
    #[serde(rename = "feelsLike")]
    pub feels_like: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindSummary {
    pub speed: Option<f64>,
}

impl From<CurrentConditions> for WeatherReport {
    fn from(raw: CurrentConditions) -> Self {
        let first = raw.weather.as_ref().and_then(|entries| entries.first());
        let weather = ConditionSummary {
            main: first.and_then(|entry| entry.main.clone()),
            description: first.and_then(|entry| entry.description.clone()),
            icon: first.and_then(|entry| entry.icon.clone()),
        };
        let temperature = TemperatureSummary {
            current: raw.main.as_ref().and_then(|m| m.temp),
            feels_like: raw.main.as_ref().and_then(|m| m.feels_like),
            min: raw.main.as_ref().and_then(|m| m.temp_min),
            max: raw.main.as_ref().and_then(|m| m.temp_max),
        };

        Self {
            id: raw.id,
            name: raw.name,
            country: raw.sys.and_then(|sys| sys.country),
            coordinates: raw.coord,
            weather,
            temperature,
            humidity: raw.main.and_then(|m| m.humidity),
            wind: WindSummary {
                speed: raw.wind.and_then(|wind| wind.speed),
            },
            clouds: raw.clouds.and_then(|clouds| clouds.all),
            // Provider reports seconds
            timestamp: raw.dt.map(|dt| dt * 1000),
        }
    }
}
