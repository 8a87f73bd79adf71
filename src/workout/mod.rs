//! Workout data model
//!
//! A [`Workout`] is one logged activity: where it happened, how far and how
//! long, and a variant payload ([`WorkoutDetails`]) that determines the
//! derived performance [`Metric`]. Records are built by the
//! [`factory`] and are immutable afterwards; every field is read through
//! accessors.

pub mod factory;
pub mod registry;
pub mod summary;

pub use factory::{create, restore, Stamp, WorkoutForm};
pub use registry::WorkoutRegistry;
pub use summary::WorkoutSummary;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Geographic position as (latitude, longitude), stored as `[lat, lng]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.lat, coords.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatesParseError {
    #[error("expected \"lat,lng\", got {0:?}")]
    Format(String),

    #[error("invalid number {0:?}")]
    Number(String),

    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

impl FromStr for Coordinates {
    type Err = CoordinatesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordinatesParseError::Format(s.to_string()))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CoordinatesParseError::Number(part.trim().to_string()))
        };
        let (lat, lng) = (parse(lat)?, parse(lng)?);

        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinatesParseError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinatesParseError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }
}

/// Unique identifier for a workout within a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Create a new workout ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two activity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutKind {
    #[serde(alias = "running")]
    Run,
    #[serde(alias = "cycling")]
    Ride,
}

impl WorkoutKind {
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutKind::Run => "Run",
            WorkoutKind::Ride => "Ride",
        }
    }

    /// Glyph prefixed to the marker popup
    pub fn glyph(&self) -> &'static str {
        match self {
            WorkoutKind::Run => "🏃",
            WorkoutKind::Ride => "🚴",
        }
    }

    /// Style class attached to the marker popup
    pub fn popup_class(&self) -> &'static str {
        match self {
            WorkoutKind::Run => "run-popup",
            WorkoutKind::Ride => "ride-popup",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "run" | "running" => Ok(WorkoutKind::Run),
            "ride" | "cycling" => Ok(WorkoutKind::Ride),
            other => Err(format!("unknown workout type '{other}' (expected run or ride)")),
        }
    }
}

/// Derived performance metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    PaceMinPerKm(f64),
    SpeedKmPerH(f64),
}

impl Metric {
    pub fn value(&self) -> f64 {
        match self {
            Metric::PaceMinPerKm(v) | Metric::SpeedKmPerH(v) => *v,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::PaceMinPerKm(_) => "min/km",
            Metric::SpeedKmPerH(_) => "km/h",
        }
    }
}

/// Variant-specific payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutDetails {
    Run { cadence_spm: u32 },
    Ride { elevation_gain_m: f64 },
}

impl WorkoutDetails {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutDetails::Run { .. } => WorkoutKind::Run,
            WorkoutDetails::Ride { .. } => WorkoutKind::Ride,
        }
    }

    /// Pace for runs, speed for rides
    pub fn derive_metric(&self, distance_km: f64, duration_min: f64) -> Metric {
        match self {
            WorkoutDetails::Run { .. } => Metric::PaceMinPerKm(duration_min / distance_km),
            WorkoutDetails::Ride { .. } => Metric::SpeedKmPerH(distance_km / (duration_min / 60.0)),
        }
    }

    /// Fixed description scheme: "<Label> on <Month> <day>, <year>"
    pub fn describe(&self, created_at: DateTime<Utc>) -> String {
        format!(
            "{} on {}",
            self.kind().label(),
            created_at.format("%B %-d, %Y")
        )
    }
}

/// One logged activity
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    details: WorkoutDetails,
    metric: Metric,
    description: String,
}

impl Workout {
    /// Assemble a record from already-validated parts
    pub(crate) fn assemble(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        details: WorkoutDetails,
        description: String,
    ) -> Self {
        Self {
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            metric: details.derive_metric(distance_km, duration_min),
            details,
            description,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.metric {
            Metric::PaceMinPerKm(pace) => Some(pace),
            Metric::SpeedKmPerH(_) => None,
        }
    }

    pub fn speed_km_per_h(&self) -> Option<f64> {
        match self.metric {
            Metric::SpeedKmPerH(speed) => Some(speed),
            Metric::PaceMinPerKm(_) => None,
        }
    }

    /// Popup text for the map marker
    pub fn popup_content(&self) -> String {
        format!("{} {}", self.kind().glyph(), self.description)
    }
}
