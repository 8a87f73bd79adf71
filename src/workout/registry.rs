//! In-memory, insertion-ordered collection of the session's workouts

use super::{Workout, WorkoutId};

#[derive(Debug, Clone, Default)]
pub struct WorkoutRegistry {
    workouts: Vec<Workout>,
}

impl WorkoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end.
    ///
    /// Ids are not checked here; uniqueness comes from the ids the factory
    /// assigns.
    pub fn append(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    /// Discard the current contents and take `workouts` in their given order
    pub fn replace_all(&mut self, workouts: Vec<Workout>) {
        self.workouts = workouts;
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    /// Ordered view of every record
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}
