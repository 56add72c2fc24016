//! Workout templates: named, ordered exercise lists that seed a session.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{LiftLogError, Result};
use crate::service::{
    DataService, Exercise, Template, TemplateExercise, TemplateInput, WorkoutEntryRecord,
    WorkoutRecord, WorkoutUpsert,
};

/// A template being created or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
}

impl TemplateDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_template(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            exercises: template.exercises.clone(),
        }
    }

    pub fn add_exercise(&mut self, exercise: &Exercise) -> Result<()> {
        if self.exercises.iter().any(|e| e.exercise_id == exercise.id) {
            return Err(LiftLogError::Validation(format!(
                "{} is already in this template",
                exercise.name
            )));
        }
        self.exercises.push(TemplateExercise::from(exercise));
        Ok(())
    }

    /// Returns whether anything was removed.
    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.exercise_id != exercise_id);
        self.exercises.len() != before
    }

    /// The request body, or the first problem with the draft.
    pub fn validate(&self) -> Result<TemplateInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LiftLogError::Validation("Enter a template name".to_string()));
        }
        if self.exercises.is_empty() {
            return Err(LiftLogError::Validation(
                "Add at least one exercise".to_string(),
            ));
        }
        Ok(TemplateInput {
            name: name.to_string(),
            exercises: self.exercises.clone(),
        })
    }
}

pub async fn list(service: &dyn DataService, user_id: &str) -> Result<Vec<Template>> {
    let templates = service.list_templates(user_id).await?;
    info!("Listed {} templates", templates.len());
    Ok(templates)
}

/// Create the template, or replace the one with id `editing`.
pub async fn save(
    service: &dyn DataService,
    user_id: &str,
    draft: &TemplateDraft,
    editing: Option<&str>,
) -> Result<Template> {
    let input = draft.validate()?;
    let template = match editing {
        Some(template_id) => service.update_template(template_id, &input).await?,
        None => service.create_template(user_id, &input).await?,
    };
    info!(
        "Saved template {} with {} exercises",
        template.name,
        template.exercises.len()
    );
    Ok(template)
}

pub async fn delete(service: &dyn DataService, template_id: &str) -> Result<()> {
    service.delete_template(template_id).await?;
    info!("Deleted template {}", template_id);
    Ok(())
}

/// Upsert the session for `today` with the template's exercises and no
/// sets. Anything already logged for that date is replaced.
pub async fn start_workout(
    service: &dyn DataService,
    user_id: &str,
    template: &Template,
    today: NaiveDate,
) -> Result<WorkoutRecord> {
    let body = WorkoutUpsert {
        date: today,
        exercises: template
            .exercises
            .iter()
            .map(|e| WorkoutEntryRecord {
                exercise_id: e.exercise_id.clone(),
                exercise_name: e.exercise_name.clone(),
                sets: Vec::new(),
            })
            .collect(),
    };
    let record = service.save_workout(user_id, &body).await?;
    info!("Started workout {} from template {}", today, template.name);
    Ok(record)
}
