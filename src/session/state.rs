//! Session state machine states

use crate::workout::{Coordinates, WorkoutKind};

/// Core session states
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the position request to resolve
    AwaitingPosition,
    /// Position could not be determined; the map is never shown
    PositionUnavailable { reason: String },
    /// Map is shown and waiting for a point to be selected
    MapReady { center: Coordinates },
    /// Form is open for a workout at `pending`
    FormOpen {
        center: Coordinates,
        pending: Coordinates,
        kind: WorkoutKind,
    },
}

impl SessionState {
    /// Check if this is a terminal state for the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::PositionUnavailable { .. })
    }

    /// Check if the map has been initialized
    pub fn has_map(&self) -> bool {
        matches!(
            self,
            SessionState::MapReady { .. } | SessionState::FormOpen { .. }
        )
    }

    pub fn is_form_open(&self) -> bool {
        matches!(self, SessionState::FormOpen { .. })
    }

    /// Coordinates the next submission will be recorded at
    pub fn pending_coordinates(&self) -> Option<Coordinates> {
        match self {
            SessionState::FormOpen { pending, .. } => Some(*pending),
            _ => None,
        }
    }

    /// Where the map was centered when it was initialized
    pub fn map_center(&self) -> Option<Coordinates> {
        match self {
            SessionState::MapReady { center } | SessionState::FormOpen { center, .. } => {
                Some(*center)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitingPosition => "awaiting-position",
            SessionState::PositionUnavailable { .. } => "position-unavailable",
            SessionState::MapReady { .. } => "map-ready",
            SessionState::FormOpen { .. } => "form-open",
        }
    }
}
