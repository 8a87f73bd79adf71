//! Map surface abstraction
//!
//! The session controller drives a map it does not own: it centers the view,
//! drops markers and pans to them. Point selection flows the other way; the
//! host forwards it to [`crate::session::SessionController::select_point`].

use crate::workout::{Coordinates, Workout, WorkoutKind};

/// Marker placement request
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coordinates: Coordinates,
    pub popup: String,
    pub class: &'static str,
    pub kind: WorkoutKind,
}

impl From<&Workout> for Marker {
    fn from(workout: &Workout) -> Self {
        Self {
            coordinates: workout.coordinates(),
            popup: workout.popup_content(),
            class: workout.kind().popup_class(),
            kind: workout.kind(),
        }
    }
}

/// Trait for map surfaces
pub trait MapSurface {
    /// Show the map centered on `center`
    fn initialize(&mut self, center: Coordinates, zoom: u8);

    /// Place a marker with an open popup
    fn place_marker(&mut self, marker: &Marker);

    /// Move the view to `center`
    fn recenter(&mut self, center: Coordinates, zoom: u8, animate: bool);
}

/// Map surface that prints to stdout
#[derive(Debug, Default)]
pub struct ConsoleMap {
    initialized: bool,
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapSurface for ConsoleMap {
    fn initialize(&mut self, center: Coordinates, zoom: u8) {
        self.initialized = true;
        println!("🗺️  Map centered on {center} (zoom {zoom})");
    }

    fn place_marker(&mut self, marker: &Marker) {
        if self.initialized {
            println!("📍 {} @ {}", marker.popup, marker.coordinates);
        }
    }

    fn recenter(&mut self, center: Coordinates, zoom: u8, _animate: bool) {
        println!("🎯 Moved to {center} (zoom {zoom})");
    }
}

/// A call received by [`MockMapSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    Initialize { center: Coordinates, zoom: u8 },
    PlaceMarker(Marker),
    Recenter {
        center: Coordinates,
        zoom: u8,
        animate: bool,
    },
}

/// Mock map surface that records every call for verification
#[derive(Debug, Default)]
pub struct MockMapSurface {
    pub calls: Vec<MapCall>,
}

impl MockMapSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every marker placed so far
    pub fn markers(&self) -> Vec<&Marker> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                MapCall::PlaceMarker(marker) => Some(marker),
                _ => None,
            })
            .collect()
    }

    /// Center of the most recent initialization
    pub fn initialized_at(&self) -> Option<Coordinates> {
        self.calls.iter().rev().find_map(|call| match call {
            MapCall::Initialize { center, .. } => Some(*center),
            _ => None,
        })
    }
}

impl MapSurface for MockMapSurface {
    fn initialize(&mut self, center: Coordinates, zoom: u8) {
        self.calls.push(MapCall::Initialize { center, zoom });
    }

    fn place_marker(&mut self, marker: &Marker) {
        self.calls.push(MapCall::PlaceMarker(marker.clone()));
    }

    fn recenter(&mut self, center: Coordinates, zoom: u8, animate: bool) {
        self.calls.push(MapCall::Recenter {
            center,
            zoom,
            animate,
        });
    }
}
