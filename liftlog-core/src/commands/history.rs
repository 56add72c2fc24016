//! Past workouts and the dashboard summary.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::service::{DataService, WorkoutRecord};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Recent workouts fetched for the dashboard, before today's is filtered out.
const DASHBOARD_FETCH_LIMIT: usize = 5;
const DASHBOARD_RECENT: usize = 3;

/// Totals shown next to a workout in lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub id: Option<String>,
    pub date: NaiveDate,
    pub exercise_count: usize,
    pub set_count: usize,
    /// Sum of weight x reps, rounded.
    pub volume: u64,
}

impl From<&WorkoutRecord> for WorkoutSummary {
    fn from(record: &WorkoutRecord) -> Self {
        let volume: f64 = record
            .exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .map(|s| s.weight * s.reps as f64)
            .sum();
        Self {
            id: record.id.clone(),
            date: record.date,
            exercise_count: record.exercises.len(),
            set_count: record.set_count(),
            volume: volume.round() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: Option<WorkoutSummary>,
    pub recent: Vec<WorkoutSummary>,
}

/// Most recent first.
pub async fn recent(
    service: &dyn DataService,
    user_id: &str,
    limit: usize,
) -> Result<Vec<WorkoutRecord>> {
    let workouts = service.list_workouts(user_id, limit).await?;
    info!("Listed {} workouts", workouts.len());
    Ok(workouts)
}

pub async fn delete(service: &dyn DataService, workout_id: &str) -> Result<()> {
    service.delete_workout(workout_id).await?;
    info!("Deleted workout {}", workout_id);
    Ok(())
}

pub async fn dashboard(
    service: &dyn DataService,
    user_id: &str,
    today: NaiveDate,
) -> Result<Dashboard> {
    let current = service.get_workout(user_id, today).await?;
    let history = service.list_workouts(user_id, DASHBOARD_FETCH_LIMIT).await?;

    Ok(Dashboard {
        today: current.as_ref().map(WorkoutSummary::from),
        recent: history
            .iter()
            .filter(|w| w.date != today)
            .take(DASHBOARD_RECENT)
            .map(WorkoutSummary::from)
            .collect(),
    })
}

/// Consecutive runs of workouts sharing a calendar month, in input order.
pub fn group_by_month(workouts: &[WorkoutRecord]) -> Vec<(String, Vec<&WorkoutRecord>)> {
    let mut groups: Vec<(String, Vec<&WorkoutRecord>)> = Vec::new();
    for workout in workouts {
        let key = workout.date.format("%B %Y").to_string();
        if let Some((last, members)) = groups.last_mut() {
            if *last == key {
                members.push(workout);
                continue;
            }
        }
        groups.push((key, vec![workout]));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{InMemoryDataService, SetRecord, WorkoutEntryRecord};

    fn workout(date: NaiveDate, sets: Vec<SetRecord>) -> WorkoutRecord {
        WorkoutRecord {
            id: Some(format!("w-{}", date)),
            user_id: "u-1".to_string(),
            date,
            exercises: vec![WorkoutEntryRecord {
                exercise_id: "e-1".to_string(),
                exercise_name: "Squat".to_string(),
                sets,
            }],
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_summary_counts_and_volume() {
        let record = workout(
            day(3, 1),
            vec![
                SetRecord { weight: 100.0, reps: 5 },
                SetRecord { weight: 102.5, reps: 3 },
            ],
        );
        let summary = WorkoutSummary::from(&record);
        assert_eq!(summary.exercise_count, 1);
        assert_eq!(summary.set_count, 2);
        assert_eq!(summary.volume, 808);
    }

    #[tokio::test]
    async fn test_dashboard_splits_today_from_recent() {
        let service = InMemoryDataService::new();
        for d in 1..=6 {
            service.insert_workout(workout(day(3, d), vec![]));
        }

        let dash = dashboard(&service, "u-1", day(3, 6)).await.unwrap();

        assert_eq!(dash.today.unwrap().date, day(3, 6));
        let dates: Vec<_> = dash.recent.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(3, 5), day(3, 4), day(3, 3)]);
    }

    #[tokio::test]
    async fn test_dashboard_without_today() {
        let service = InMemoryDataService::new();
        service.insert_workout(workout(day(3, 1), vec![]));

        let dash = dashboard(&service, "u-1", day(3, 9)).await.unwrap();
        assert!(dash.today.is_none());
        assert_eq!(dash.recent.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_recent() {
        let service = InMemoryDataService::new();
        service.insert_workout(workout(day(3, 1), vec![]));
        service.insert_workout(workout(day(3, 2), vec![]));

        delete(&service, "w-2026-03-01").await.unwrap();
        let left = recent(&service, "u-1", DEFAULT_HISTORY_LIMIT).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].date, day(3, 2));
    }

    #[test]
    fn test_group_by_month() {
        let workouts = vec![
            workout(day(4, 2), vec![]),
            workout(day(4, 1), vec![]),
            workout(day(3, 30), vec![]),
        ];
        let groups = group_by_month(&workouts);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "April 2026");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "March 2026");
    }
}
