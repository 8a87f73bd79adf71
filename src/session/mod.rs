//! Session state machine
//!
//! [`Session`] owns the state and the workout registry and turns each
//! [`SessionEvent`] into a list of [`Effect`]s without doing any I/O itself.
//! [`SessionController`] feeds it events and carries the effects out against
//! the map, the presentation surface and storage.
//!
//! ```text
//! AwaitingPosition --PositionAcquired--> MapReady <--submit ok-- FormOpen
//!        |                                   \--PointSelected-->/
//!        \--PositionFailed--> PositionUnavailable
//! ```

pub mod controller;
pub mod events;
pub mod state;

pub use controller::SessionController;
pub use events::{Effect, Notice, SessionEvent};
pub use state::SessionState;

use tracing::{debug, info};

use crate::abstractions::Marker;
use crate::workout::{create, WorkoutKind, WorkoutRegistry};

/// Zoom level used when the map is shown or re-centered
pub const DEFAULT_ZOOM_LEVEL: u8 = 13;

/// Session state plus the registry it guards
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    registry: WorkoutRegistry,
    zoom_level: u8,
    /// Type preselected when the form opens; follows the last choice
    form_kind: WorkoutKind,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_LEVEL)
    }
}

impl Session {
    pub fn new(zoom_level: u8) -> Self {
        Self {
            state: SessionState::AwaitingPosition,
            registry: WorkoutRegistry::new(),
            zoom_level,
            form_kind: WorkoutKind::Run,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn registry(&self) -> &WorkoutRegistry {
        &self.registry
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    /// Apply one event and return the effects to carry out
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        debug!("[{}] {}", self.state.name(), event.description());

        match event {
            SessionEvent::Rehydrated(workouts) => {
                self.registry.replace_all(workouts);
                if self.state.has_map() {
                    self.replay()
                } else {
                    Vec::new()
                }
            }
            SessionEvent::PositionAcquired(center) => {
                if self.state != SessionState::AwaitingPosition {
                    return Vec::new();
                }
                self.state = SessionState::MapReady { center };

                let mut effects = vec![Effect::InitializeMap {
                    center,
                    zoom: self.zoom_level,
                }];
                effects.extend(self.replay());
                effects
            }
            SessionEvent::PositionFailed(error) => {
                if self.state != SessionState::AwaitingPosition {
                    return Vec::new();
                }
                self.state = SessionState::PositionUnavailable {
                    reason: error.to_string(),
                };
                vec![Effect::ShowNotice(Notice::PositionUnavailable(error))]
            }
            SessionEvent::PointSelected(point) => match &mut self.state {
                SessionState::MapReady { center } => {
                    let center = *center;
                    self.state = SessionState::FormOpen {
                        center,
                        pending: point,
                        kind: self.form_kind,
                    };
                    vec![Effect::OpenForm(self.form_kind)]
                }
                SessionState::FormOpen { pending, .. } => {
                    *pending = point;
                    Vec::new()
                }
                _ => Vec::new(),
            },
            SessionEvent::VariantSelected(selected) => match &mut self.state {
                SessionState::FormOpen { kind, .. } => {
                    *kind = selected;
                    self.form_kind = selected;
                    vec![Effect::ShowVariantField(selected)]
                }
                _ => Vec::new(),
            },
            SessionEvent::FormSubmitted { form, stamp } => {
                let (center, pending) = match &self.state {
                    SessionState::FormOpen {
                        center, pending, ..
                    } => (*center, *pending),
                    _ => return Vec::new(),
                };

                match create(stamp, pending, &form) {
                    Ok(workout) => {
                        info!("Logged {} ({})", workout.description(), workout.id());
                        self.form_kind = form.kind;
                        self.registry.append(workout.clone());
                        self.state = SessionState::MapReady { center };

                        vec![
                            Effect::PlaceMarker(Marker::from(&workout)),
                            Effect::RenderEntry(workout),
                            Effect::Persist(self.registry.all().to_vec()),
                            Effect::ClearAndHideForm,
                        ]
                    }
                    Err(error) => {
                        debug!("Rejected submission: {}", error);
                        vec![Effect::ShowNotice(Notice::InvalidInput(error))]
                    }
                }
            }
            SessionEvent::EntrySelected(id) => {
                if !self.state.has_map() {
                    return Vec::new();
                }
                match self.registry.find_by_id(&id) {
                    Some(workout) => vec![Effect::Recenter {
                        center: workout.coordinates(),
                        zoom: self.zoom_level,
                        animate: true,
                    }],
                    None => Vec::new(),
                }
            }
            SessionEvent::Reset => {
                info!("Resetting session, discarding {} workouts", self.registry.len());
                let mut effects = vec![Effect::ClearPersisted, Effect::ClearEntries];
                if self.state.is_form_open() {
                    effects.push(Effect::ClearAndHideForm);
                }
                self.registry.clear();
                self.state = SessionState::AwaitingPosition;
                effects
            }
        }
    }

    /// Entry and marker for every registered workout, in order
    fn replay(&self) -> Vec<Effect> {
        self.registry
            .all()
            .iter()
            .flat_map(|workout| {
                [
                    Effect::RenderEntry(workout.clone()),
                    Effect::PlaceMarker(Marker::from(workout)),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
