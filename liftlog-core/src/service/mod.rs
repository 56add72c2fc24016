//! Client side of the remote workout data service.
//!
//! All persistence and identity live in the backend; this module only
//! describes its REST contract and provides an HTTP implementation.

pub mod http_client;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

pub use http_client::HttpDataService;
#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryDataService;
pub use types::{
    Exercise, ExerciseStats, SetRecord, Template, TemplateExercise, TemplateInput, User,
    WorkoutEntryRecord, WorkoutRecord, WorkoutUpsert,
};

/// Operations the backend exposes to the client.
///
/// Implementations must be shareable across tasks: the session editor
/// issues saves from spawned tasks.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Create-or-get a user by name.
    async fn login(&self, name: &str) -> Result<User>;

    async fn get_user(&self, user_id: &str) -> Result<User>;

    async fn list_exercises(&self, user_id: &str) -> Result<Vec<Exercise>>;

    /// Returns the existing exercise when the name is already in the catalog.
    async fn create_exercise(&self, user_id: &str, name: &str) -> Result<Exercise>;

    async fn delete_exercise(&self, exercise_id: &str) -> Result<()>;

    /// Newest first.
    async fn list_workouts(&self, user_id: &str, limit: usize) -> Result<Vec<WorkoutRecord>>;

    /// `Ok(None)` when no session exists for that date; that is not an error.
    async fn get_workout(&self, user_id: &str, date: NaiveDate) -> Result<Option<WorkoutRecord>>;

    /// Idempotent upsert keyed by (user, date). Overwrites prior content.
    async fn save_workout(&self, user_id: &str, workout: &WorkoutUpsert) -> Result<WorkoutRecord>;

    async fn delete_workout(&self, workout_id: &str) -> Result<()>;

    async fn list_templates(&self, user_id: &str) -> Result<Vec<Template>>;

    async fn create_template(&self, user_id: &str, template: &TemplateInput) -> Result<Template>;

    async fn update_template(&self, template_id: &str, template: &TemplateInput)
        -> Result<Template>;

    async fn delete_template(&self, template_id: &str) -> Result<()>;

    /// Oldest to newest.
    async fn exercise_stats(
        &self,
        user_id: &str,
        exercise_id: &str,
        limit: usize,
    ) -> Result<Vec<ExerciseStats>>;
}
