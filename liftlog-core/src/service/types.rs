use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered user. Login is a create-or-get by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// An entry in the user's personal exercise catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
}

/// A committed set as stored by the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub weight: f64,
    pub reps: u32,
}

/// One exercise row of a stored workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntryRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

/// A stored workout: one per (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub exercises: Vec<WorkoutEntryRecord>,
}

impl WorkoutRecord {
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Request body of the workout upsert. The whole session, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutUpsert {
    pub date: NaiveDate,
    pub exercises: Vec<WorkoutEntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub exercise_id: String,
    pub exercise_name: String,
}

impl From<&Exercise> for TemplateExercise {
    fn from(exercise: &Exercise) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.clone(),
        }
    }
}

/// A named, reusable exercise list with no set data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<TemplateExercise>,
}

/// Request body for template create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInput {
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
}

/// One point of an exercise's history, oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStats {
    pub date: NaiveDate,
    pub max_weight: f64,
    pub total_reps: u32,
    pub total_sets: u32,
}
