//! Events fed into the session and the effects it asks for

use crate::abstractions::Marker;
use crate::error::{PositionError, ValidationError};
use crate::workout::{Coordinates, Stamp, Workout, WorkoutForm, WorkoutId, WorkoutKind};

/// Events that can occur during a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Persisted workouts were loaded
    Rehydrated(Vec<Workout>),
    /// The position request resolved
    PositionAcquired(Coordinates),
    /// The position request failed
    PositionFailed(PositionError),
    /// A point on the map was selected
    PointSelected(Coordinates),
    /// The form's workout type was changed
    VariantSelected(WorkoutKind),
    /// The form was submitted; `stamp` is the identity a new record receives
    FormSubmitted { form: WorkoutForm, stamp: Stamp },
    /// A list entry was selected
    EntrySelected(WorkoutId),
    /// Persisted state is discarded and the session starts over
    Reset,
}

impl SessionEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SessionEvent::Rehydrated(workouts) => {
                format!("Rehydrated {} workouts", workouts.len())
            }
            SessionEvent::PositionAcquired(coords) => format!("Position acquired at {coords}"),
            SessionEvent::PositionFailed(error) => format!("Position failed: {error}"),
            SessionEvent::PointSelected(coords) => format!("Point selected at {coords}"),
            SessionEvent::VariantSelected(kind) => format!("{kind} selected"),
            SessionEvent::FormSubmitted { form, .. } => format!("{} form submitted", form.kind),
            SessionEvent::EntrySelected(id) => format!("Entry {id} selected"),
            SessionEvent::Reset => "Session reset".to_string(),
        }
    }
}

/// Messages shown through the blocking-notice channel
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    InvalidInput(ValidationError),
    PositionUnavailable(PositionError),
    SaveFailed(String),
    ClearFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::InvalidInput(error) => error.user_message().to_string(),
            Notice::PositionUnavailable(error) => error.user_message().to_string(),
            Notice::SaveFailed(reason) => format!("Could not save your workouts: {reason}"),
            Notice::ClearFailed(reason) => format!("Could not clear saved workouts: {reason}"),
        }
    }
}

/// Commands a transition asks the controller to carry out, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    InitializeMap { center: Coordinates, zoom: u8 },
    PlaceMarker(Marker),
    RenderEntry(Workout),
    OpenForm(WorkoutKind),
    ShowVariantField(WorkoutKind),
    ClearAndHideForm,
    Recenter {
        center: Coordinates,
        zoom: u8,
        animate: bool,
    },
    ShowNotice(Notice),
    /// Overwrite the persisted state with this snapshot of the registry
    Persist(Vec<Workout>),
    ClearPersisted,
    ClearEntries,
}
