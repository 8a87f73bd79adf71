//! Presentation surface abstraction: the workout list, the entry form and
//! blocking notices.

use crate::workout::{Workout, WorkoutId, WorkoutKind, WorkoutSummary};

/// Trait for presentation surfaces
pub trait PresentationSurface {
    /// Add one entry to the visible list
    fn render_workout_entry(&mut self, workout: &Workout);

    /// Show a message the user has to acknowledge
    fn show_blocking_notice(&mut self, message: &str);

    /// Reveal the entry form with the field for `kind` visible
    fn open_form(&mut self, kind: WorkoutKind);

    /// Swap the visible variant field (cadence or elevation)
    fn show_variant_field(&mut self, kind: WorkoutKind);

    /// Empty the form inputs and hide the form
    fn clear_and_hide_form(&mut self);

    /// Remove every list entry
    fn clear_entries(&mut self);
}

/// Presentation surface that prints to stdout
#[derive(Debug, Default)]
pub struct ConsolePresentation;

impl ConsolePresentation {
    pub fn new() -> Self {
        Self
    }
}

impl PresentationSurface for ConsolePresentation {
    fn render_workout_entry(&mut self, workout: &Workout) {
        println!("  {}", WorkoutSummary::from(workout));
    }

    fn show_blocking_notice(&mut self, message: &str) {
        println!("⚠️  {message}");
    }

    fn open_form(&mut self, _kind: WorkoutKind) {}

    fn show_variant_field(&mut self, _kind: WorkoutKind) {}

    fn clear_and_hide_form(&mut self) {}

    fn clear_entries(&mut self) {
        println!("🧹 Workout list cleared");
    }
}

/// Mock presentation surface that records what was shown
#[derive(Debug, Default)]
pub struct MockPresentationSurface {
    pub entries: Vec<WorkoutId>,
    pub notices: Vec<String>,
    /// Visible variant field while the form is open
    pub form: Option<WorkoutKind>,
    pub forms_opened: usize,
    pub forms_cleared: usize,
}

impl MockPresentationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }
}

impl PresentationSurface for MockPresentationSurface {
    fn render_workout_entry(&mut self, workout: &Workout) {
        self.entries.push(workout.id().clone());
    }

    fn show_blocking_notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn open_form(&mut self, kind: WorkoutKind) {
        self.form = Some(kind);
        self.forms_opened += 1;
    }

    fn show_variant_field(&mut self, kind: WorkoutKind) {
        if self.form.is_some() {
            self.form = Some(kind);
        }
    }

    fn clear_and_hide_form(&mut self) {
        self.form = None;
        self.forms_cleared += 1;
    }

    fn clear_entries(&mut self) {
        self.entries.clear();
    }
}
