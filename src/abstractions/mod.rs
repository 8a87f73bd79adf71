//! Abstraction layers for external collaborators
//!
//! This module provides trait-based abstractions for the map, the
//! presentation surface and position acquisition, so the session can be
//! driven and tested without any real UI.

pub mod map;
pub mod position;
pub mod presentation;

pub use map::{ConsoleMap, MapCall, MapSurface, Marker, MockMapSurface};
pub use position::{FixedPosition, MockPositionSource, PositionSource};
pub use presentation::{ConsolePresentation, MockPresentationSurface, PresentationSurface};
