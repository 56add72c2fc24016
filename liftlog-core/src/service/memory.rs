use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::types::{
    Exercise, ExerciseStats, Template, TemplateInput, User, WorkoutRecord, WorkoutUpsert,
};
use super::DataService;
use crate::error::{LiftLogError, Result};

#[derive(Default)]
struct Store {
    users: Vec<User>,
    /// (owner, exercise)
    exercises: Vec<(String, Exercise)>,
    workouts: Vec<WorkoutRecord>,
    /// (owner, template)
    templates: Vec<(String, Template)>,
    saved: Vec<WorkoutUpsert>,
}

/// In-process `DataService` with the backend's semantics: login and
/// exercise creation are create-or-get by name, workouts upsert by
/// (user, date), stats are computed from stored workouts.
///
/// Every workout upsert body is recorded so tests can inspect exactly what
/// was sent. Failures can be injected to exercise error paths.
#[derive(Default)]
pub struct InMemoryDataService {
    store: Mutex<Store>,
    next_id: AtomicU64,
    offline: AtomicBool,
    reject_saves: AtomicBool,
    /// Latency of workout saves, in milliseconds.
    save_delay_ms: AtomicU64,
}

impl InMemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LiftLogError::Unreachable("connection refused".to_string()));
        }
        Ok(())
    }

    /// Every request fails as if the service were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Workout saves answer with a server error.
    pub fn set_reject_saves(&self, reject: bool) {
        self.reject_saves.store(reject, Ordering::SeqCst);
    }

    /// Workout saves take `delay` before they are stored.
    pub fn set_save_delay(&self, delay: Duration) {
        self.save_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Workout upsert bodies in the order they were received.
    pub fn saved_snapshots(&self) -> Vec<WorkoutUpsert> {
        self.lock().saved.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saved.len()
    }

    /// Seed a stored workout directly.
    pub fn insert_workout(&self, record: WorkoutRecord) {
        let mut store = self.lock();
        store
            .workouts
            .retain(|w| !(w.user_id == record.user_id && w.date == record.date));
        store.workouts.push(record);
    }

    pub fn stored_workout(&self, user_id: &str, date: NaiveDate) -> Option<WorkoutRecord> {
        self.lock()
            .workouts
            .iter()
            .find(|w| w.user_id == user_id && w.date == date)
            .cloned()
    }
}

fn not_found(what: &str) -> LiftLogError {
    LiftLogError::Server {
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl DataService for InMemoryDataService {
    async fn login(&self, name: &str) -> Result<User> {
        self.check_online()?;
        if let Some(user) = self.lock().users.iter().find(|u| u.name == name) {
            return Ok(user.clone());
        }
        let user = User {
            id: self.next_id("user"),
            name: name.to_string(),
        };
        self.lock().users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.check_online()?;
        self.lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("User"))
    }

    async fn list_exercises(&self, user_id: &str) -> Result<Vec<Exercise>> {
        self.check_online()?;
        Ok(self
            .lock()
            .exercises
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn create_exercise(&self, user_id: &str, name: &str) -> Result<Exercise> {
        self.check_online()?;
        let existing = self
            .lock()
            .exercises
            .iter()
            .find(|(owner, e)| owner == user_id && e.name == name)
            .map(|(_, e)| e.clone());
        if let Some(exercise) = existing {
            return Ok(exercise);
        }
        let exercise = Exercise {
            id: self.next_id("exercise"),
            name: name.to_string(),
        };
        self.lock()
            .exercises
            .push((user_id.to_string(), exercise.clone()));
        Ok(exercise)
    }

    async fn delete_exercise(&self, exercise_id: &str) -> Result<()> {
        self.check_online()?;
        let mut store = self.lock();
        let before = store.exercises.len();
        store.exercises.retain(|(_, e)| e.id != exercise_id);
        if store.exercises.len() == before {
            return Err(not_found("Exercise"));
        }
        Ok(())
    }

    async fn list_workouts(&self, user_id: &str, limit: usize) -> Result<Vec<WorkoutRecord>> {
        self.check_online()?;
        let mut workouts: Vec<WorkoutRecord> = self
            .lock()
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        workouts.truncate(limit);
        Ok(workouts)
    }

    async fn get_workout(&self, user_id: &str, date: NaiveDate) -> Result<Option<WorkoutRecord>> {
        self.check_online()?;
        Ok(self.stored_workout(user_id, date))
    }

    async fn save_workout(&self, user_id: &str, workout: &WorkoutUpsert) -> Result<WorkoutRecord> {
        let delay = self.save_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check_online()?;
        if self.reject_saves.load(Ordering::SeqCst) {
            return Err(LiftLogError::Server {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }

        let existing_id = self
            .stored_workout(user_id, workout.date)
            .and_then(|w| w.id);
        let record = WorkoutRecord {
            id: Some(existing_id.unwrap_or_else(|| self.next_id("workout"))),
            user_id: user_id.to_string(),
            date: workout.date,
            exercises: workout.exercises.clone(),
        };
        self.insert_workout(record.clone());
        self.lock().saved.push(workout.clone());
        Ok(record)
    }

    async fn delete_workout(&self, workout_id: &str) -> Result<()> {
        self.check_online()?;
        let mut store = self.lock();
        let before = store.workouts.len();
        store
            .workouts
            .retain(|w| w.id.as_deref() != Some(workout_id));
        if store.workouts.len() == before {
            return Err(not_found("Workout"));
        }
        Ok(())
    }

    async fn list_templates(&self, user_id: &str) -> Result<Vec<Template>> {
        self.check_online()?;
        // Newest first, like the backend
        Ok(self
            .lock()
            .templates
            .iter()
            .rev()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn create_template(&self, user_id: &str, template: &TemplateInput) -> Result<Template> {
        self.check_online()?;
        let created = Template {
            id: self.next_id("template"),
            name: template.name.clone(),
            exercises: template.exercises.clone(),
        };
        self.lock()
            .templates
            .push((user_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn update_template(
        &self,
        template_id: &str,
        template: &TemplateInput,
    ) -> Result<Template> {
        self.check_online()?;
        let mut store = self.lock();
        let (_, stored) = store
            .templates
            .iter_mut()
            .find(|(_, t)| t.id == template_id)
            .ok_or_else(|| not_found("Template"))?;
        stored.name = template.name.clone();
        stored.exercises = template.exercises.clone();
        Ok(stored.clone())
    }

    async fn delete_template(&self, template_id: &str) -> Result<()> {
        self.check_online()?;
        let mut store = self.lock();
        let before = store.templates.len();
        store.templates.retain(|(_, t)| t.id != template_id);
        if store.templates.len() == before {
            return Err(not_found("Template"));
        }
        Ok(())
    }

    async fn exercise_stats(
        &self,
        user_id: &str,
        exercise_id: &str,
        limit: usize,
    ) -> Result<Vec<ExerciseStats>> {
        let recent = self.list_workouts(user_id, limit).await?;
        let mut stats: Vec<ExerciseStats> = recent
            .iter()
            .filter_map(|w| {
                let entry = w.exercises.iter().find(|e| e.exercise_id == exercise_id)?;
                if entry.sets.is_empty() {
                    return None;
                }
                Some(ExerciseStats {
                    date: w.date,
                    max_weight: entry.sets.iter().map(|s| s.weight).fold(0.0, f64::max),
                    total_reps: entry.sets.iter().map(|s| s.reps).sum(),
                    total_sets: entry.sets.len() as u32,
                })
            })
            .collect();
        stats.reverse();
        Ok(stats)
    }
}
