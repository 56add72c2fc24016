use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LiftLogError, Result};
use crate::service::{SetRecord, WorkoutEntryRecord, WorkoutRecord, WorkoutUpsert};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetField {
    Weight,
    Reps,
}

impl SetField {
    pub fn label(self) -> &'static str {
        match self {
            SetField::Weight => "weight",
            SetField::Reps => "reps",
        }
    }
}

/// A set field while it is being edited.
///
/// `Empty` is distinct from zero so a cleared input stays cleared until
/// commit; `Partial` keeps in-progress text such as `"-"` or `"."`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    Empty,
    Value(f64),
    Partial(String),
}

impl FieldValue {
    /// Interpret raw input for `field`. Text that is neither empty, a
    /// number, nor the start of one is rejected.
    pub fn parse(field: SetField, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(FieldValue::Empty);
        }
        if let Ok(value) = raw.parse::<f64>() {
            if value.is_finite() {
                return Ok(FieldValue::Value(value));
            }
        }
        let partial = match field {
            SetField::Weight => matches!(raw, "-" | "." | "-."),
            SetField::Reps => raw == "-",
        };
        if partial {
            return Ok(FieldValue::Partial(raw.to_string()));
        }
        Err(LiftLogError::Validation(format!(
            "'{}' is not a valid {}",
            raw,
            field.label()
        )))
    }

    /// Normalized numeric value: empty and non-numeric become 0, negatives clamp to 0.
    pub fn committed(&self) -> f64 {
        let value = match self {
            FieldValue::Empty => 0.0,
            FieldValue::Value(v) => *v,
            FieldValue::Partial(text) => text.parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Value(v) if v.fract() == 0.0 => write!(f, "{:.0}", v),
            FieldValue::Value(v) => write!(f, "{}", v),
            FieldValue::Partial(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditableSet {
    pub weight: FieldValue,
    pub reps: FieldValue,
}

impl EditableSet {
    pub fn empty() -> Self {
        Self {
            weight: FieldValue::Empty,
            reps: FieldValue::Empty,
        }
    }

    pub fn field(&self, field: SetField) -> &FieldValue {
        match field {
            SetField::Weight => &self.weight,
            SetField::Reps => &self.reps,
        }
    }

    pub fn field_mut(&mut self, field: SetField) -> &mut FieldValue {
        match field {
            SetField::Weight => &mut self.weight,
            SetField::Reps => &mut self.reps,
        }
    }

    /// Reps are whole and truncate toward zero.
    pub fn to_record(&self) -> SetRecord {
        SetRecord {
            weight: self.weight.committed(),
            reps: self.reps.committed().trunc() as u32,
        }
    }
}

impl From<SetRecord> for EditableSet {
    fn from(record: SetRecord) -> Self {
        Self {
            weight: FieldValue::Value(record.weight),
            reps: FieldValue::Value(record.reps as f64),
        }
    }
}

/// One exercise within the session, with its sets in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEntry {
    pub exercise_id: String,
    /// Snapshot of the name when the exercise was added; later renames do not apply.
    pub exercise_name: String,
    pub sets: Vec<EditableSet>,
}

impl SessionEntry {
    pub fn to_record(&self) -> WorkoutEntryRecord {
        WorkoutEntryRecord {
            exercise_id: self.exercise_id.clone(),
            exercise_name: self.exercise_name.clone(),
            sets: self.sets.iter().map(EditableSet::to_record).collect(),
        }
    }
}

/// The in-memory workout for one user on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub date: NaiveDate,
    pub entries: Vec<SessionEntry>,
}

impl Session {
    pub fn empty(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            entries: Vec::new(),
        }
    }

    pub fn from_record(record: WorkoutRecord) -> Self {
        Self {
            user_id: record.user_id,
            date: record.date,
            entries: record
                .exercises
                .into_iter()
                .map(|e| SessionEntry {
                    exercise_id: e.exercise_id,
                    exercise_name: e.exercise_name,
                    sets: e.sets.into_iter().map(EditableSet::from).collect(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, exercise_id: &str) -> bool {
        self.entries.iter().any(|e| e.exercise_id == exercise_id)
    }

    pub fn entry(&self, exercise_id: &str) -> Option<&SessionEntry> {
        self.entries.iter().find(|e| e.exercise_id == exercise_id)
    }

    pub fn entry_mut(&mut self, exercise_id: &str) -> Option<&mut SessionEntry> {
        self.entries.iter_mut().find(|e| e.exercise_id == exercise_id)
    }

    pub fn set_count(&self) -> usize {
        self.entries.iter().map(|e| e.sets.len()).sum()
    }

    /// Normalize every set field in place (empty and partial become numbers).
    pub fn commit(&mut self) {
        for entry in &mut self.entries {
            for set in &mut entry.sets {
                let record = set.to_record();
                *set = EditableSet::from(record);
            }
        }
    }

    /// The full session as sent to the service. Uncommitted fields go out
    /// normalized; local editing state is left as is.
    pub fn snapshot(&self) -> WorkoutUpsert {
        WorkoutUpsert {
            date: self.date,
            exercises: self.entries.iter().map(SessionEntry::to_record).collect(),
        }
    }
}
