//! Workout factory: validates form input and builds typed records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinates, Workout, WorkoutDetails, WorkoutId, WorkoutKind};
use crate::error::{ValidationError, ValidationReason};

/// Submitted form payload, without the pending map position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutForm {
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_spm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
}

impl WorkoutForm {
    pub fn run(distance_km: f64, duration_min: f64, cadence_spm: f64) -> Self {
        Self {
            kind: WorkoutKind::Run,
            distance_km,
            duration_min,
            cadence_spm: Some(cadence_spm),
            elevation_gain_m: None,
        }
    }

    pub fn ride(distance_km: f64, duration_min: f64, elevation_gain_m: f64) -> Self {
        Self {
            kind: WorkoutKind::Ride,
            distance_km,
            duration_min,
            cadence_spm: None,
            elevation_gain_m: Some(elevation_gain_m),
        }
    }
}

/// Identity and creation time for a new record
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub id: WorkoutId,
    pub created_at: DateTime<Utc>,
}

impl Stamp {
    pub fn new(id: WorkoutId, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }

    /// Fresh id, current time
    pub fn now() -> Self {
        Self {
            id: WorkoutId::new(),
            created_at: Utc::now(),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, ValidationReason::NotFinite));
    }
    if value <= 0.0 {
        return Err(ValidationError::new(field, ValidationReason::NotPositive));
    }
    Ok(value)
}

fn required(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    value.ok_or(ValidationError::new(field, ValidationReason::Missing))
}

fn cadence(value: Option<f64>) -> Result<u32, ValidationError> {
    let value = positive("cadenceSpm", required("cadenceSpm", value)?)?;
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::new("cadenceSpm", ValidationReason::NotWhole));
    }
    Ok(value as u32)
}

fn elevation(value: Option<f64>) -> Result<f64, ValidationError> {
    let value = required("elevationGainM", value)?;
    if !value.is_finite() {
        return Err(ValidationError::new(
            "elevationGainM",
            ValidationReason::NotFinite,
        ));
    }
    if value < 0.0 {
        return Err(ValidationError::new(
            "elevationGainM",
            ValidationReason::Negative,
        ));
    }
    Ok(value)
}

/// Check a form and return the variant payload it describes.
///
/// Distance and duration must be finite and strictly positive. Runs need a
/// positive whole cadence; rides need a finite, non-negative elevation gain.
/// The field belonging to the other variant is ignored.
pub fn validate(form: &WorkoutForm) -> Result<WorkoutDetails, ValidationError> {
    positive("distanceKm", form.distance_km)?;
    positive("durationMin", form.duration_min)?;

    match form.kind {
        WorkoutKind::Run => Ok(WorkoutDetails::Run {
            cadence_spm: cadence(form.cadence_spm)?,
        }),
        WorkoutKind::Ride => Ok(WorkoutDetails::Ride {
            elevation_gain_m: elevation(form.elevation_gain_m)?,
        }),
    }
}

/// Build a new workout at `coordinates` from a submitted form.
///
/// The derived metric and the description are computed here, once.
pub fn create(
    stamp: Stamp,
    coordinates: Coordinates,
    form: &WorkoutForm,
) -> Result<Workout, ValidationError> {
    let details = validate(form)?;
    let description = details.describe(stamp.created_at);

    Ok(Workout::assemble(
        stamp.id,
        stamp.created_at,
        coordinates,
        form.distance_km,
        form.duration_min,
        details,
        description,
    ))
}

/// Rebuild a persisted workout, keeping its stored description.
///
/// Inputs go through the same validation as [`create`]; the metric is
/// recomputed from the stored attributes.
pub fn restore(
    stamp: Stamp,
    coordinates: Coordinates,
    form: &WorkoutForm,
    description: String,
) -> Result<Workout, ValidationError> {
    let details = validate(form)?;

    Ok(Workout::assemble(
        stamp.id,
        stamp.created_at,
        coordinates,
        form.distance_km,
        form.duration_min,
        details,
        description,
    ))
}
