//! Recent-location persistence.
//!
//! The store is an injected capability: handlers talk to [`LocationStore`]
//! and never know whether persistence is enabled. When no store path is
//! configured the [`NoopLocationStore`] is selected and recent-location
//! queries come back empty.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use tokio::task;

/// How many records `/locations/recent` serves.
pub const RECENT_LIMIT: usize = 5;

// Unit separator; cannot appear in a place name or country code.
const KEY_SEPARATOR: char = '\u{1f}';

/// A persisted recently-viewed location. At most one record exists per
/// `(name, country)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentLocation {
    /// Store-assigned identifier (the natural key)
    pub id: String,
    pub name: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub last_viewed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One observed view of a location, as extracted from a normalized weather
/// report. The store assigns identity and timestamps.
#[derive(Debug, Clone)]
pub struct LocationSighting {
    pub name: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Insert-or-update keyed by `(name, country)`: coordinates are
    /// overwritten and `last_viewed_at` is refreshed on every call.
    async fn upsert(&self, sighting: LocationSighting) -> Result<()>;

    /// The most recently viewed locations, newest first, at most `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<RecentLocation>>;
}

/// Embedded keyspace-backed store.
pub struct PersistentLocationStore {
    store: Keyspace,
}

impl PersistentLocationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let store = db.keyspace("recent_locations", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { store })
    }
}

fn storage_key(name: &str, country: &str) -> String {
    format!("{name}{KEY_SEPARATOR}{country}")
}

fn upsert_in_store(
    store: Keyspace,
    sighting: LocationSighting,
    now: DateTime<Utc>,
) -> Result<()> {
    let key = storage_key(&sighting.name, &sighting.country);

    // Preserve the creation time across updates of an existing record.
    let created_at = match store.get(key.as_bytes())? {
        Some(bytes) => postcard::from_bytes::<RecentLocation>(&bytes.to_vec())?.created_at,
        None => now,
    };

    let record = RecentLocation {
        id: key.clone(),
        name: sighting.name,
        country: sighting.country,
        lat: sighting.lat,
        lon: sighting.lon,
        last_viewed_at: now,
        created_at,
        updated_at: now,
    };
    let bytes = postcard::to_stdvec(&record)?;
    store.insert(key.as_bytes(), bytes)?;
    Ok(())
}

fn scan_store(store: Keyspace) -> Result<Vec<RecentLocation>> {
    let mut records = Vec::new();
    for entry in store.iter() {
        let (_, value) = entry.into_inner()?;
        records.push(postcard::from_bytes(&value.to_vec())?);
    }
    Ok(records)
}

#[async_trait]
impl LocationStore for PersistentLocationStore {
    #[tracing::instrument(name = "upsert_location", level = "debug", skip(self))]
    async fn upsert(&self, sighting: LocationSighting) -> Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || upsert_in_store(store, sighting, Utc::now())).await??;
        Ok(())
    }

    #[tracing::instrument(name = "list_recent", level = "debug", skip(self))]
    async fn list_recent(&self, limit: usize) -> Result<Vec<RecentLocation>> {
        let store = self.store.clone();
        let mut records = task::spawn_blocking(move || scan_store(store)).await??;
        records.sort_by(|a, b| b.last_viewed_at.cmp(&a.last_viewed_at));
        records.truncate(limit);
        Ok(records)
    }
}

/// Store selected when persistence is disabled.
pub struct NoopLocationStore;

#[async_trait]
impl LocationStore for NoopLocationStore {
    async fn upsert(&self, _sighting: LocationSighting) -> Result<()> {
        Ok(())
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<RecentLocation>> {
        Ok(Vec::new())
    }
}

/// Opens the persistent store at `path`, falling back to the no-op store
/// when no path is configured or the keyspace cannot be opened. A broken
/// store at startup degrades persistence; it never prevents serving weather.
pub fn open(path: Option<&Path>) -> Arc<dyn LocationStore> {
    match path {
        Some(path) => match PersistentLocationStore::open(path) {
            Ok(store) => {
                tracing::info!("Recent locations persisted at {}", path.display());
                Arc::new(store)
            }
            Err(err) => {
                tracing::error!("Failed to open recent-location store: {err:#}");
                Arc::new(NoopLocationStore)
            }
        },
        None => {
            tracing::warn!("WEATHER_STORE_PATH not set. Recent locations will not be persisted.");
            Arc::new(NoopLocationStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    static STORE_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> (PersistentLocationStore, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "weathervane-store-test-{}-{}",
            std::process::id(),
            STORE_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&path);
        let store = PersistentLocationStore::open(&path).unwrap();
        (store, path)
    }

    fn sighting(name: &str, country: &str) -> LocationSighting {
        LocationSighting {
            name: name.to_string(),
            country: country.to_string(),
            lat: Some(51.51),
            lon: Some(-0.13),
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_name_and_country() {
        let (store, path) = temp_store();

        store.upsert(sighting("London", "GB")).await.unwrap();
        let first = store.list_recent(RECENT_LIMIT).await.unwrap().remove(0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.upsert(sighting("London", "GB")).await.unwrap();

        let records = store.list_recent(RECENT_LIMIT).await.unwrap();
        assert_eq!(records.len(), 1);
        let second = &records[0];
        assert!(second.last_viewed_at > first.last_viewed_at);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.id, first.id);

        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_coordinates() {
        let (store, path) = temp_store();

        store.upsert(sighting("London", "GB")).await.unwrap();
        let moved = LocationSighting {
            lat: Some(51.50),
            lon: Some(-0.12),
            ..sighting("London", "GB")
        };
        store.upsert(moved).await.unwrap();

        let records = store.list_recent(RECENT_LIMIT).await.unwrap();
        assert_eq!(records[0].lat, Some(51.50));
        assert_eq!(records[0].lon, Some(-0.12));

        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn test_same_name_different_country_kept_apart() {
        let (store, path) = temp_store();

        store.upsert(sighting("London", "GB")).await.unwrap();
        store.upsert(sighting("London", "CA")).await.unwrap();

        let records = store.list_recent(RECENT_LIMIT).await.unwrap();
        assert_eq!(records.len(), 2);

        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn test_list_recent_is_capped_and_newest_first() {
        let (store, path) = temp_store();

        for name in ["Oslo", "Bergen", "Paris", "Berlin", "Madrid", "Rome"] {
            store.upsert(sighting(name, "XX")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let records = store.list_recent(RECENT_LIMIT).await.unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].name, "Rome");
        assert!(records.iter().all(|r| r.name != "Oslo"));
        for pair in records.windows(2) {
            assert!(pair[0].last_viewed_at >= pair[1].last_viewed_at);
        }

        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn test_noop_store_is_empty_and_accepts_writes() {
        let store = NoopLocationStore;
        store.upsert(sighting("London", "GB")).await.unwrap();
        assert!(store.list_recent(RECENT_LIMIT).await.unwrap().is_empty());
    }
}
