//! HTTP surface: `/health`, `/weather`, `/locations/recent`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::ApiError;
use crate::provider::{WeatherClient, WeatherQuery};
use crate::store::{LocationSighting, LocationStore, RECENT_LIMIT, RecentLocation};
use crate::weather::WeatherReport;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: Arc<WeatherClient>,
    pub store: Arc<dyn LocationStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn LocationStore>) -> Self {
        let weather = Arc::new(WeatherClient::new(config.base_url.clone()));
        Self {
            config: Arc::new(config),
            weather,
            store,
        }
    }
}

/// Raw query parameters. Coordinates arrive as strings and are parsed by
/// [`WeatherQuery::from_parts`], so malformed values get the same JSON error
/// envelope as every other failure instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// Wire shape of a recent location, matching what clients historically
/// received from this endpoint.
#[derive(Debug, Serialize)]
pub struct RecentLocationView {
    pub id: String,
    pub name: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(rename = "lastViewedAt")]
    pub last_viewed_at: DateTime<Utc>,
}

impl From<RecentLocation> for RecentLocationView {
    fn from(record: RecentLocation) -> Self {
        Self {
            id: record.id,
            name: record.name,
            country: record.country,
            lat: record.lat,
            lon: record.lon,
            last_viewed_at: record.last_viewed_at,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather", get(get_weather))
        .route("/locations/recent", get(recent_locations))
        .with_state(state)
}

// Liveness only, no dependency checks.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherReport>, ApiError> {
    let query = WeatherQuery::from_parts(params.q, params.lat, params.lon)?;
    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(ApiError::MissingApiKey)?;

    let conditions = state.weather.fetch(&query, api_key).await?;
    let report = WeatherReport::from(conditions);

    if let (Some(name), Some(country)) = (report.name.clone(), report.country.clone()) {
        let sighting = LocationSighting {
            name,
            country,
            lat: report.coordinates.as_ref().and_then(|c| c.lat),
            lon: report.coordinates.as_ref().and_then(|c| c.lon),
        };
        record_view(Arc::clone(&state.store), sighting);
    }

    Ok(Json(report))
}

/// Best-effort history write: runs detached so a store failure can only be
/// logged, never joined into the response already prepared.
fn record_view(store: Arc<dyn LocationStore>, sighting: LocationSighting) {
    tokio::spawn(async move {
        if let Err(err) = store.upsert(sighting).await {
            tracing::warn!("Failed to record recent location: {err:#}");
        }
    });
}

async fn recent_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecentLocationView>>, ApiError> {
    let records = state
        .store
        .list_recent(RECENT_LIMIT)
        .await
        .map_err(ApiError::StoreRead)?;
    Ok(Json(
        records.into_iter().map(RecentLocationView::from).collect(),
    ))
}
