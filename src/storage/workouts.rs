//! Workout persistence adapter
//!
//! Serializes the whole registry under one key and reads it back into fully
//! reconstructed [`Workout`]s. The written layout is
//!
//! ```json
//! {"version": 1, "workouts": [{"id": "…", "createdAt": "…", "coordinates": [lat, lng],
//!   "distanceKm": 5.0, "durationMin": 25.0, "description": "Run on March 15, 2024",
//!   "type": "Run", "cadenceSpm": 170, "paceMinPerKm": 5.0}]}
//! ```
//!
//! A bare array of elements (no envelope) is also accepted on read, including
//! the field names the browser version of the logger used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueStore;
use crate::workout::{
    restore, Coordinates, Stamp, Workout, WorkoutDetails, WorkoutForm, WorkoutId, WorkoutKind,
};

/// Version written into every envelope
pub const SCHEMA_VERSION: u32 = 1;

/// Key the registry is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "workouts";

/// Serialized form of one workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkout {
    pub id: String,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "coords")]
    pub coordinates: Coordinates,
    #[serde(alias = "distance")]
    pub distance_km: f64,
    #[serde(alias = "duration")]
    pub duration_min: f64,
    pub description: String,
    #[serde(flatten)]
    pub details: StoredDetails,
}

/// Variant fields of a serialized workout, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoredDetails {
    #[serde(alias = "running", rename_all = "camelCase")]
    Run {
        #[serde(alias = "cadence")]
        cadence_spm: f64,
        #[serde(default, alias = "pace", skip_serializing_if = "Option::is_none")]
        pace_min_per_km: Option<f64>,
    },
    #[serde(alias = "cycling", rename_all = "camelCase")]
    Ride {
        #[serde(alias = "elevationGain")]
        elevation_gain_m: f64,
        #[serde(default, alias = "speed", skip_serializing_if = "Option::is_none")]
        speed_km_per_h: Option<f64>,
    },
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        let details = match *workout.details() {
            WorkoutDetails::Run { cadence_spm } => StoredDetails::Run {
                cadence_spm: cadence_spm as f64,
                pace_min_per_km: workout.pace_min_per_km(),
            },
            WorkoutDetails::Ride { elevation_gain_m } => StoredDetails::Ride {
                elevation_gain_m,
                speed_km_per_h: workout.speed_km_per_h(),
            },
        };

        Self {
            id: workout.id().to_string(),
            created_at: workout.created_at(),
            coordinates: workout.coordinates(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            description: workout.description().to_string(),
            details,
        }
    }
}

impl StoredWorkout {
    /// Rebuild the workout, re-validating every attribute.
    ///
    /// Stored metrics are ignored and recomputed.
    pub fn into_workout(self) -> crate::Result<Workout> {
        let form = match self.details {
            StoredDetails::Run { cadence_spm, .. } => WorkoutForm {
                kind: WorkoutKind::Run,
                distance_km: self.distance_km,
                duration_min: self.duration_min,
                cadence_spm: Some(cadence_spm),
                elevation_gain_m: None,
            },
            StoredDetails::Ride {
                elevation_gain_m, ..
            } => WorkoutForm {
                kind: WorkoutKind::Ride,
                distance_km: self.distance_km,
                duration_min: self.duration_min,
                cadence_spm: None,
                elevation_gain_m: Some(elevation_gain_m),
            },
        };

        let stamp = Stamp::new(WorkoutId::from_string(self.id), self.created_at);
        Ok(restore(stamp, self.coordinates, &form, self.description)?)
    }
}

#[derive(Serialize)]
struct Envelope {
    version: u32,
    workouts: Vec<StoredWorkout>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedLayout {
    Versioned {
        version: u32,
        workouts: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

/// Reads and writes the workout registry through a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct WorkoutStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> WorkoutStore<S> {
    /// Create an adapter using [`DEFAULT_KEY`]
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the underlying store
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Overwrite the persisted state with `workouts`
    pub async fn save(&self, workouts: &[Workout]) -> StorageResult<()> {
        let envelope = Envelope {
            version: SCHEMA_VERSION,
            workouts: workouts.iter().map(StoredWorkout::from).collect(),
        };
        let json = serde_json::to_string(&envelope)?;
        self.store.set(&self.key, &json).await?;

        debug!("Saved {} workouts under {:?}", workouts.len(), self.key);
        Ok(())
    }

    /// Load the persisted workouts.
    ///
    /// Never fails: unreadable or malformed state yields an empty list, and
    /// invalid or duplicate elements are skipped.
    pub async fn load(&self) -> Vec<Workout> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Cannot read persisted workouts: {}", e);
                return Vec::new();
            }
        };

        let elements = match parse_layout(&raw) {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Persisted workouts are unusable: {}", e);
                self.preserve_unusable(&raw).await;
                return Vec::new();
            }
        };

        let total = elements.len();
        let mut seen = HashSet::new();
        let mut workouts = Vec::with_capacity(total);
        for (index, element) in elements.into_iter().enumerate() {
            let workout = serde_json::from_value::<StoredWorkout>(element)
                .map_err(crate::Error::from)
                .and_then(StoredWorkout::into_workout);

            match workout {
                Ok(workout) if seen.insert(workout.id().clone()) => workouts.push(workout),
                Ok(workout) => warn!("Skipping duplicate workout id {}", workout.id()),
                Err(e) => warn!("Skipping persisted workout #{}: {}", index, e),
            }
        }

        // The next save rewrites the key without the skipped elements
        if workouts.len() < total {
            if let Err(e) = self.backup(&raw).await {
                warn!("Cannot back up persisted state with skipped workouts: {}", e);
            }
        }

        info!("Loaded {} of {} persisted workouts", workouts.len(), total);
        workouts
    }

    /// Remove the persisted state
    pub async fn clear(&self) -> StorageResult<()> {
        self.store.remove(&self.key).await
    }

    /// Copy `raw` to `<key>.corrupted.<ts>` and return the key it went to
    async fn backup(&self, raw: &str) -> StorageResult<String> {
        let backup_key = format!("{}.corrupted.{}", self.key, Utc::now().timestamp());
        self.store.set(&backup_key, raw).await?;

        warn!("Copied persisted state to {:?}", backup_key);
        Ok(backup_key)
    }

    /// Copy unusable state aside before dropping it, so it can be inspected later
    async fn preserve_unusable(&self, raw: &str) {
        match self.backup(raw).await {
            Ok(_) => {
                if let Err(e) = self.store.remove(&self.key).await {
                    warn!("Cannot remove unusable persisted state: {}", e);
                }
            }
            Err(e) => warn!("Cannot back up unusable persisted state: {}", e),
        }
    }
}

fn parse_layout(raw: &str) -> StorageResult<Vec<serde_json::Value>> {
    match serde_json::from_str::<PersistedLayout>(raw)? {
        PersistedLayout::Versioned { version, workouts } if version <= SCHEMA_VERSION => {
            Ok(workouts)
        }
        PersistedLayout::Versioned { version, .. } => {
            Err(StorageError::UnsupportedVersion(version))
        }
        PersistedLayout::Legacy(workouts) => Ok(workouts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use crate::workout::create;
    use chrono::TimeZone;

    fn run_workout(id: &str) -> Workout {
        create(
            Stamp::new(
                WorkoutId::from_string(id.to_string()),
                Utc.with_ymd_and_hms(2024, 3, 15, 6, 45, 0).unwrap(),
            ),
            Coordinates::new(38.72, -9.14),
            &WorkoutForm::run(8.0, 40.0, 172.0),
        )
        .unwrap()
    }

    fn ride_workout(id: &str) -> Workout {
        create(
            Stamp::new(
                WorkoutId::from_string(id.to_string()),
                Utc.with_ymd_and_hms(2024, 4, 2, 17, 0, 0).unwrap(),
            ),
            Coordinates::new(38.75, -9.2),
            &WorkoutForm::ride(42.0, 120.0, 610.0),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load_reconstructs_workouts() {
        let store = WorkoutStore::new(MemoryKeyValueStore::new());
        let workouts = vec![run_workout("r1"), ride_workout("c1")];

        store.save(&workouts).await.unwrap();
        let loaded = store.load().await;

        assert_eq!(loaded, workouts);
        assert_eq!(loaded[1].speed_km_per_h(), Some(21.0));
    }

    #[tokio::test]
    async fn test_written_layout() {
        let kv = MemoryKeyValueStore::new();
        let store = WorkoutStore::new(kv.clone());
        store.save(&[run_workout("r1")]).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&kv.raw("workouts").unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        let element = &value["workouts"][0];
        assert_eq!(element["id"], "r1");
        assert_eq!(element["type"], "Run");
        assert_eq!(element["coordinates"], serde_json::json!([38.72, -9.14]));
        assert_eq!(element["distanceKm"], 8.0);
        assert_eq!(element["durationMin"], 40.0);
        assert_eq!(element["cadenceSpm"], 172.0);
        assert_eq!(element["paceMinPerKm"], 5.0);
        assert_eq!(element["description"], "Run on March 15, 2024");
        assert!(element.get("speedKmPerH").is_none());
    }

    #[tokio::test]
    async fn test_missing_state_loads_empty() {
        let store = WorkoutStore::new(MemoryKeyValueStore::new());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_browser_layout() {
        let kv = MemoryKeyValueStore::new();
        kv.seed(
            "workouts",
            r#"[{"date":"2024-03-15T10:00:00.000Z","id":"0512345678","coords":[51.5,-0.12],
                "distance":5,"duration":27,"type":"running","cadence":176,"pace":5.4,
                "description":"Running on March 15, 2024"},
               {"date":"2024-03-16T10:00:00.000Z","id":"0512399999","coords":[51.6,-0.1],
                "distance":30,"duration":90,"type":"cycling","elevationGain":200,"speed":20,
                "description":"Cycling on March 16, 2024"}]"#,
        );

        let loaded = WorkoutStore::new(kv).load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].kind(), WorkoutKind::Run);
        assert_eq!(loaded[0].description(), "Running on March 15, 2024");
        assert_eq!(loaded[0].pace_min_per_km(), Some(5.4));
        assert_eq!(loaded[1].kind(), WorkoutKind::Ride);
        assert_eq!(loaded[1].speed_km_per_h(), Some(20.0));
    }

    #[tokio::test]
    async fn test_stored_metric_is_recomputed() {
        let kv = MemoryKeyValueStore::new();
        kv.seed(
            "workouts",
            r#"{"version":1,"workouts":[{"id":"a","createdAt":"2024-03-15T10:00:00Z",
                "coordinates":[1,2],"distanceKm":10,"durationMin":50,
                "description":"Run on March 15, 2024","type":"Run","cadenceSpm":160,
                "paceMinPerKm":99}]}"#,
        );

        let loaded = WorkoutStore::new(kv).load().await;
        assert_eq!(loaded[0].pace_min_per_km(), Some(5.0));
    }

    #[tokio::test]
    async fn test_invalid_and_duplicate_elements_are_skipped() {
        let kv = MemoryKeyValueStore::new();
        kv.seed(
            "workouts",
            r#"{"version":1,"workouts":[
                {"id":"a","createdAt":"2024-03-15T10:00:00Z","coordinates":[1,2],"distanceKm":10,
                 "durationMin":50,"description":"Run","type":"Run","cadenceSpm":160},
                {"id":"b","createdAt":"2024-03-15T10:00:00Z","coordinates":[1,2],"distanceKm":-3,
                 "durationMin":50,"description":"Run","type":"Run","cadenceSpm":160},
                {"id":"a","createdAt":"2024-03-15T10:00:00Z","coordinates":[1,2],"distanceKm":12,
                 "durationMin":50,"description":"Run","type":"Run","cadenceSpm":160},
                {"id":"c","type":"Swim"}
            ]}"#,
        );

        let loaded = WorkoutStore::new(kv.clone()).load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].distance_km(), 10.0);

        // the full original text is kept beside the live key
        let keys = kv.keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], "workouts");
        assert!(keys[1].starts_with("workouts.corrupted."));
        assert!(kv.raw(&keys[1]).unwrap().contains("\"distanceKm\":-3"));
    }

    #[tokio::test]
    async fn test_fully_valid_state_is_not_backed_up() {
        let kv = MemoryKeyValueStore::new();
        let store = WorkoutStore::new(kv.clone());
        store.save(&[run_workout("r1"), ride_workout("c1")]).await.unwrap();

        assert_eq!(store.load().await.len(), 2);
        assert_eq!(kv.keys(), vec!["workouts".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupted_state_is_preserved_and_ignored() {
        let kv = MemoryKeyValueStore::new();
        kv.seed("workouts", "{not json");

        let store = WorkoutStore::new(kv.clone());
        assert!(store.load().await.is_empty());

        let keys = kv.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("workouts.corrupted."));
        assert_eq!(kv.raw(&keys[0]).as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_newer_version_is_not_loaded() {
        let kv = MemoryKeyValueStore::new();
        kv.seed("workouts", r#"{"version":2,"workouts":[]}"#);

        assert!(WorkoutStore::new(kv.clone()).load().await.is_empty());
        assert!(kv.raw("workouts").is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let kv = MemoryKeyValueStore::new();
        kv.set_fail_writes(true);

        let err = WorkoutStore::new(kv).save(&[run_workout("r1")]).await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_clear_removes_state() {
        let kv = MemoryKeyValueStore::new();
        let store = WorkoutStore::with_key(kv.clone(), "log");
        store.save(&[ride_workout("c1")]).await.unwrap();
        assert!(kv.raw("log").is_some());

        store.clear().await.unwrap();
        assert!(kv.raw("log").is_none());
        assert!(store.load().await.is_empty());
    }
}
