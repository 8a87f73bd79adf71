//! # Waymark
//!
//! Log runs and rides against the places they happened.
//!
//! ## Usage
//!
//! ```bash
//! waymark log --at 51.5,-0.12 --kind run --distance 5 --duration 25 --cadence 170
//! waymark list
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Trait-based abstractions for the map, the presentation surface and position
//! - `config` - Configuration loading with environment overrides
//! - `error` - Error types shared across the crate
//! - `session` - Session state machine and the controller that drives it
//! - `storage` - Key-value storage backends and workout persistence
//! - `workout` - Workout records, validation, factory and registry
pub mod abstractions;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod workout;

pub use error::{Error, Result};
