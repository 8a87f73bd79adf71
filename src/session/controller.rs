//! Session controller: runs the state machine against real collaborators

use tracing::{debug, trace, warn};

use super::{Effect, Notice, Session, SessionEvent, SessionState};
use crate::abstractions::{MapSurface, PositionSource, PresentationSurface};
use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, StorageError, WorkoutStore};
use crate::workout::{Coordinates, Stamp, Workout, WorkoutForm, WorkoutId, WorkoutKind};

/// Drives one session: position acquisition, point selection, form
/// submission, persistence and replay.
pub struct SessionController<M, P, S, L> {
    session: Session,
    map: M,
    presentation: P,
    store: WorkoutStore<S>,
    position: L,
    last_notice: Option<Notice>,
    /// Set when the last `ClearPersisted` effect failed
    clear_failure: Option<StorageError>,
}

impl<M, P, S, L> SessionController<M, P, S, L>
where
    M: MapSurface,
    P: PresentationSurface,
    S: KeyValueStore,
    L: PositionSource,
{
    pub fn new(
        map: M,
        presentation: P,
        store: WorkoutStore<S>,
        position: L,
        zoom_level: u8,
    ) -> Self {
        Self {
            session: Session::new(zoom_level),
            map,
            presentation,
            store,
            position,
            last_notice: None,
            clear_failure: None,
        }
    }

    /// Load persisted workouts, then wait for the position and show the map.
    ///
    /// Returns the state the session settled in: `MapReady` on success,
    /// `PositionUnavailable` otherwise. A session that already left
    /// `AwaitingPosition` is returned unchanged.
    pub async fn start(&mut self) -> &SessionState {
        if self.session.state() != &SessionState::AwaitingPosition {
            debug!("Session already started ({})", self.session.state().name());
            return self.session.state();
        }

        let workouts = self.store.load().await;
        self.dispatch(SessionEvent::Rehydrated(workouts)).await;

        let event = match self.position.current_position().await {
            Ok(position) => SessionEvent::PositionAcquired(position),
            Err(error) => {
                warn!("Position unavailable: {}", error);
                SessionEvent::PositionFailed(error)
            }
        };
        self.dispatch(event).await;

        self.session.state()
    }

    /// A point on the map was selected
    pub async fn select_point(&mut self, point: Coordinates) {
        self.dispatch(SessionEvent::PointSelected(point)).await;
    }

    /// The form's workout type was changed
    pub async fn select_variant(&mut self, kind: WorkoutKind) {
        self.dispatch(SessionEvent::VariantSelected(kind)).await;
    }

    /// Submit the form for the pending point.
    ///
    /// On success the new workout's id is returned, even if saving it failed;
    /// the record stays in memory and a notice is shown.
    pub async fn submit(&mut self, form: WorkoutForm) -> Result<WorkoutId> {
        if !self.session.state().is_form_open() {
            return Err(Error::InvalidState(format!(
                "cannot submit a workout while {}",
                self.session.state().name()
            )));
        }

        let stamp = Stamp::now();
        let id = stamp.id.clone();
        self.last_notice = None;
        self.dispatch(SessionEvent::FormSubmitted { form, stamp }).await;

        if self.session.registry().find_by_id(&id).is_some() {
            return Ok(id);
        }
        match self.last_notice.take() {
            Some(Notice::InvalidInput(error)) => Err(error.into()),
            other => Err(Error::InvalidState(format!(
                "submission was not recorded ({other:?})"
            ))),
        }
    }

    /// A list entry was selected; pans the map to it
    pub async fn select_entry(&mut self, id: &WorkoutId) -> Result<()> {
        if self.session.registry().find_by_id(id).is_none() {
            return Err(Error::NotFound(format!("workout {id}")));
        }
        self.dispatch(SessionEvent::EntrySelected(id.clone())).await;
        Ok(())
    }

    /// Discard persisted state and start the session from scratch.
    ///
    /// If the persisted state cannot be removed the session is not restarted
    /// and the storage error is returned; the next `start` loads it again.
    pub async fn reset(&mut self) -> Result<&SessionState> {
        self.clear_failure = None;
        self.dispatch(SessionEvent::Reset).await;

        if let Some(error) = self.clear_failure.take() {
            return Err(error.into());
        }
        Ok(self.start().await)
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn workouts(&self) -> &[Workout] {
        self.session.registry().all()
    }

    /// Most recent notice shown, if any
    pub fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub fn position(&self) -> &L {
        &self.position
    }

    async fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.session.apply(event);
        for effect in effects {
            self.execute(effect).await;
        }
    }

    async fn execute(&mut self, effect: Effect) {
        trace!("Executing {:?}", effect);

        match effect {
            Effect::InitializeMap { center, zoom } => self.map.initialize(center, zoom),
            Effect::PlaceMarker(marker) => self.map.place_marker(&marker),
            Effect::RenderEntry(workout) => self.presentation.render_workout_entry(&workout),
            Effect::OpenForm(kind) => self.presentation.open_form(kind),
            Effect::ShowVariantField(kind) => self.presentation.show_variant_field(kind),
            Effect::ClearAndHideForm => self.presentation.clear_and_hide_form(),
            Effect::Recenter {
                center,
                zoom,
                animate,
            } => self.map.recenter(center, zoom, animate),
            Effect::ShowNotice(notice) => self.notify(notice),
            Effect::Persist(workouts) => {
                if let Err(e) = self.store.save(&workouts).await {
                    warn!("Failed to persist {} workouts: {}", workouts.len(), e);
                    self.notify(Notice::SaveFailed(e.to_string()));
                }
            }
            Effect::ClearPersisted => {
                if let Err(e) = self.store.clear().await {
                    warn!("Failed to clear persisted workouts: {}", e);
                    self.notify(Notice::ClearFailed(e.to_string()));
                    self.clear_failure = Some(e);
                }
            }
            Effect::ClearEntries => self.presentation.clear_entries(),
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.presentation.show_blocking_notice(&notice.message());
        self.last_notice = Some(notice);
    }
}
