//! List-entry view of a workout

use std::fmt;

use super::{Workout, WorkoutDetails, WorkoutId, WorkoutKind};

/// Values shown for one entry in the workout list
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub title: String,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Metric rounded to one decimal, e.g. "4.6 min/km"
    pub metric: String,
    /// Variant attribute with its unit, e.g. "178 spm"
    pub extra: String,
}

impl From<&Workout> for WorkoutSummary {
    fn from(workout: &Workout) -> Self {
        let metric = workout.metric();
        let extra = match workout.details() {
            WorkoutDetails::Run { cadence_spm } => format!("{cadence_spm} spm"),
            WorkoutDetails::Ride { elevation_gain_m } => format!("{elevation_gain_m} m"),
        };

        Self {
            id: workout.id().clone(),
            kind: workout.kind(),
            title: workout.description().to_string(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            metric: format!("{:.1} {}", metric.value(), metric.unit()),
            extra,
        }
    }
}

impl fmt::Display for WorkoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]  {} km · {} min · {} · {}",
            self.title, self.id, self.distance_km, self.duration_min, self.metric, self.extra
        )
    }
}
