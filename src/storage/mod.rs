//! Durable storage for the workout log
//!
//! A small key-value abstraction ([`KeyValueStore`]) with a file backend and
//! an in-memory backend, and the [`WorkoutStore`] adapter that persists the
//! whole registry under a single key.

pub mod backends;
pub mod error;
pub mod traits;
pub mod workouts;

pub use backends::{FileKeyValueStore, MemoryKeyValueStore};
pub use error::{StorageError, StorageResult};
pub use traits::KeyValueStore;
pub use workouts::{StoredDetails, StoredWorkout, WorkoutStore, DEFAULT_KEY, SCHEMA_VERSION};
