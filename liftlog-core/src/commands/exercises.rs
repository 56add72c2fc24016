//! The user's exercise catalog.

use tracing::info;

use crate::error::{LiftLogError, Result};
use crate::service::{DataService, Exercise};

pub async fn list(service: &dyn DataService, user_id: &str) -> Result<Vec<Exercise>> {
    let exercises = service.list_exercises(user_id).await?;
    info!("Listed {} exercises", exercises.len());
    Ok(exercises)
}

/// Create an exercise. The service answers a duplicate name with the
/// existing exercise; that is reported as a validation error when the
/// caller's `catalog` already holds it.
pub async fn create(
    service: &dyn DataService,
    user_id: &str,
    catalog: &[Exercise],
    name: &str,
) -> Result<Exercise> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LiftLogError::Validation("Enter an exercise name".to_string()));
    }

    let exercise = service.create_exercise(user_id, name).await?;
    if catalog.iter().any(|e| e.id == exercise.id) {
        return Err(LiftLogError::Validation(format!(
            "{} already exists",
            exercise.name
        )));
    }
    info!("Created exercise {} ({})", exercise.name, exercise.id);
    Ok(exercise)
}

/// Past workouts keep their copy of the exercise name.
pub async fn delete(service: &dyn DataService, exercise_id: &str) -> Result<()> {
    service.delete_exercise(exercise_id).await?;
    info!("Deleted exercise {}", exercise_id);
    Ok(())
}
