//! Transition tests for the session state machine

use super::*;
use crate::error::{PositionError, ValidationReason};
use crate::workout::{Coordinates, Stamp, Workout, WorkoutForm, WorkoutId};
use chrono::{TimeZone, Utc};

fn stamp(id: &str) -> Stamp {
    Stamp::new(
        WorkoutId::from_string(id.to_string()),
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
    )
}

fn stored_workout(id: &str, lat: f64) -> Workout {
    crate::workout::create(
        stamp(id),
        Coordinates::new(lat, 0.0),
        &WorkoutForm::run(5.0, 30.0, 170.0),
    )
    .unwrap()
}

fn ready_session() -> Session {
    let mut session = Session::default();
    session.apply(SessionEvent::PositionAcquired(Coordinates::new(10.0, 20.0)));
    session
}

fn open_form(session: &mut Session, at: Coordinates) {
    session.apply(SessionEvent::PointSelected(at));
}

#[test]
fn test_initial_state() {
    let session = Session::default();
    assert_eq!(session.state(), &SessionState::AwaitingPosition);
    assert!(session.registry().is_empty());
    assert_eq!(session.zoom_level(), DEFAULT_ZOOM_LEVEL);
}

#[test]
fn test_position_acquired_initializes_map_and_replays() {
    let mut session = Session::new(15);
    let stored = vec![stored_workout("a", 1.0), stored_workout("b", 2.0)];
    assert!(session
        .apply(SessionEvent::Rehydrated(stored.clone()))
        .is_empty());

    let effects = session.apply(SessionEvent::PositionAcquired(Coordinates::new(10.0, 20.0)));

    assert_eq!(
        effects[0],
        Effect::InitializeMap {
            center: Coordinates::new(10.0, 20.0),
            zoom: 15
        }
    );
    assert_eq!(effects.len(), 5);
    assert_eq!(effects[1], Effect::RenderEntry(stored[0].clone()));
    assert!(
        matches!(&effects[2], Effect::PlaceMarker(m) if m.coordinates == Coordinates::new(1.0, 0.0))
    );
    assert_eq!(effects[3], Effect::RenderEntry(stored[1].clone()));
    assert_eq!(
        session.state(),
        &SessionState::MapReady {
            center: Coordinates::new(10.0, 20.0)
        }
    );
}

#[test]
fn test_position_failure_is_terminal() {
    let mut session = Session::default();
    let effects = session.apply(SessionEvent::PositionFailed(PositionError::PermissionDenied));

    assert_eq!(
        effects,
        vec![Effect::ShowNotice(Notice::PositionUnavailable(
            PositionError::PermissionDenied
        ))]
    );
    assert!(session.state().is_terminal());

    // nothing can be created afterwards
    assert!(session
        .apply(SessionEvent::PointSelected(Coordinates::new(1.0, 1.0)))
        .is_empty());
    assert!(session
        .apply(SessionEvent::FormSubmitted {
            form: WorkoutForm::run(5.0, 30.0, 170.0),
            stamp: stamp("x"),
        })
        .is_empty());
    assert!(session.registry().is_empty());
}

#[test]
fn test_late_position_events_are_ignored() {
    let mut session = ready_session();
    assert!(session
        .apply(SessionEvent::PositionAcquired(Coordinates::new(0.0, 0.0)))
        .is_empty());
    assert!(session
        .apply(SessionEvent::PositionFailed(PositionError::NotConfigured))
        .is_empty());
    assert!(session.state().has_map());
}

#[test]
fn test_point_selection_opens_form() {
    let mut session = ready_session();
    let effects = session.apply(SessionEvent::PointSelected(Coordinates::new(11.0, 21.0)));

    assert_eq!(effects, vec![Effect::OpenForm(WorkoutKind::Run)]);
    assert_eq!(
        session.state().pending_coordinates(),
        Some(Coordinates::new(11.0, 21.0))
    );

    // a second click moves the pending point without reopening the form
    let effects = session.apply(SessionEvent::PointSelected(Coordinates::new(12.0, 22.0)));
    assert!(effects.is_empty());
    assert_eq!(
        session.state().pending_coordinates(),
        Some(Coordinates::new(12.0, 22.0))
    );
}

#[test]
fn test_point_selection_before_map_is_ignored() {
    let mut session = Session::default();
    assert!(session
        .apply(SessionEvent::PointSelected(Coordinates::new(1.0, 1.0)))
        .is_empty());
    assert_eq!(session.state(), &SessionState::AwaitingPosition);
}

#[test]
fn test_successful_submission() {
    let mut session = ready_session();
    open_form(&mut session, Coordinates::new(11.0, 21.0));

    let effects = session.apply(SessionEvent::FormSubmitted {
        form: WorkoutForm::ride(20.0, 60.0, 150.0),
        stamp: stamp("ride-1"),
    });

    assert_eq!(session.registry().len(), 1);
    let workout = &session.registry().all()[0];
    assert_eq!(workout.speed_km_per_h(), Some(20.0));
    assert_eq!(workout.coordinates(), Coordinates::new(11.0, 21.0));

    assert_eq!(effects.len(), 4);
    assert!(matches!(&effects[0], Effect::PlaceMarker(m) if m.class == "ride-popup"));
    assert_eq!(effects[1], Effect::RenderEntry(workout.clone()));
    assert_eq!(effects[2], Effect::Persist(vec![workout.clone()]));
    assert_eq!(effects[3], Effect::ClearAndHideForm);

    assert_eq!(
        session.state(),
        &SessionState::MapReady {
            center: Coordinates::new(10.0, 20.0)
        }
    );
}

#[test]
fn test_persist_carries_whole_registry() {
    let mut session = ready_session();
    for (i, id) in ["one", "two"].iter().enumerate() {
        open_form(&mut session, Coordinates::new(i as f64, 0.0));
        let effects = session.apply(SessionEvent::FormSubmitted {
            form: WorkoutForm::run(5.0, 25.0, 170.0),
            stamp: stamp(id),
        });
        let persisted = effects.iter().find_map(|e| match e {
            Effect::Persist(workouts) => Some(workouts.len()),
            _ => None,
        });
        assert_eq!(persisted, Some(i + 1));
    }
}

#[test]
fn test_rejected_submission_keeps_form_open() {
    let mut session = ready_session();
    open_form(&mut session, Coordinates::new(11.0, 21.0));

    let effects = session.apply(SessionEvent::FormSubmitted {
        form: WorkoutForm::run(-5.0, 30.0, 150.0),
        stamp: stamp("bad"),
    });

    match effects.as_slice() {
        [Effect::ShowNotice(Notice::InvalidInput(error))] => {
            assert_eq!(error.field, "distanceKm");
            assert_eq!(error.reason, ValidationReason::NotPositive);
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    assert!(session.registry().is_empty());
    assert_eq!(
        session.state().pending_coordinates(),
        Some(Coordinates::new(11.0, 21.0))
    );
}

#[test]
fn test_submission_without_open_form_is_ignored() {
    let mut session = ready_session();
    let effects = session.apply(SessionEvent::FormSubmitted {
        form: WorkoutForm::run(5.0, 30.0, 150.0),
        stamp: stamp("early"),
    });
    assert!(effects.is_empty());
    assert!(session.registry().is_empty());
}

#[test]
fn test_variant_selection() {
    let mut session = ready_session();

    // no form, nothing to toggle
    assert!(session
        .apply(SessionEvent::VariantSelected(WorkoutKind::Ride))
        .is_empty());

    open_form(&mut session, Coordinates::new(1.0, 1.0));
    let effects = session.apply(SessionEvent::VariantSelected(WorkoutKind::Ride));
    assert_eq!(effects, vec![Effect::ShowVariantField(WorkoutKind::Ride)]);

    session.apply(SessionEvent::FormSubmitted {
        form: WorkoutForm::ride(10.0, 30.0, 0.0),
        stamp: stamp("r"),
    });

    // the form reopens with the last type chosen
    let effects = session.apply(SessionEvent::PointSelected(Coordinates::new(2.0, 2.0)));
    assert_eq!(effects, vec![Effect::OpenForm(WorkoutKind::Ride)]);
}

#[test]
fn test_entry_selection_recenters() {
    let mut session = Session::default();
    session.apply(SessionEvent::Rehydrated(vec![stored_workout("a", 42.0)]));

    // no map yet
    assert!(session
        .apply(SessionEvent::EntrySelected(WorkoutId::from_string("a".into())))
        .is_empty());

    session.apply(SessionEvent::PositionAcquired(Coordinates::new(0.0, 0.0)));
    let effects = session.apply(SessionEvent::EntrySelected(WorkoutId::from_string(
        "a".into(),
    )));
    assert_eq!(
        effects,
        vec![Effect::Recenter {
            center: Coordinates::new(42.0, 0.0),
            zoom: DEFAULT_ZOOM_LEVEL,
            animate: true,
        }]
    );

    // unknown ids do nothing and the state is untouched
    let before = session.state().clone();
    assert!(session
        .apply(SessionEvent::EntrySelected(WorkoutId::from_string(
            "nope".into()
        )))
        .is_empty());
    assert_eq!(session.state(), &before);
}

#[test]
fn test_reset() {
    let mut session = ready_session();
    open_form(&mut session, Coordinates::new(1.0, 1.0));
    session.apply(SessionEvent::FormSubmitted {
        form: WorkoutForm::run(5.0, 30.0, 170.0),
        stamp: stamp("a"),
    });
    open_form(&mut session, Coordinates::new(2.0, 2.0));

    let effects = session.apply(SessionEvent::Reset);

    assert_eq!(
        effects,
        vec![
            Effect::ClearPersisted,
            Effect::ClearEntries,
            Effect::ClearAndHideForm
        ]
    );
    assert!(session.registry().is_empty());
    assert_eq!(session.state(), &SessionState::AwaitingPosition);
}
