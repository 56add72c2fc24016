//! Per-exercise progress over recent workouts.

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::service::{DataService, ExerciseStats};

pub const DEFAULT_STATS_LIMIT: usize = 30;

/// First-versus-last change across a stats series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub weight_change: f64,
    /// Whole percent of the first value; 0 when the first value is 0.
    pub weight_percent: i64,
    pub reps_change: i64,
    pub reps_percent: i64,
}

/// Stats for one exercise, oldest first.
pub async fn series(
    service: &dyn DataService,
    user_id: &str,
    exercise_id: &str,
    limit: usize,
) -> Result<Vec<ExerciseStats>> {
    let stats = service.exercise_stats(user_id, exercise_id, limit).await?;
    info!("Loaded {} stat points for {}", stats.len(), exercise_id);
    Ok(stats)
}

/// `None` with fewer than two points.
pub fn progress(series: &[ExerciseStats]) -> Option<Progress> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first()?;
    let last = series.last()?;

    let weight_change = last.max_weight - first.max_weight;
    let reps_change = last.total_reps as i64 - first.total_reps as i64;
    Some(Progress {
        weight_change,
        weight_percent: percent_of(weight_change, first.max_weight),
        reps_change,
        reps_percent: percent_of(reps_change as f64, first.total_reps as f64),
    })
}

fn percent_of(change: f64, base: f64) -> i64 {
    if base > 0.0 {
        (change / base * 100.0).round() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(d: u32, max_weight: f64, total_reps: u32) -> ExerciseStats {
        ExerciseStats {
            date: NaiveDate::from_ymd_opt(2026, 2, d).unwrap(),
            max_weight,
            total_reps,
            total_sets: 3,
        }
    }

    #[test]
    fn test_progress_needs_two_points() {
        assert!(progress(&[]).is_none());
        assert!(progress(&[point(1, 100.0, 15)]).is_none());
    }

    #[test]
    fn test_progress_first_vs_last() {
        let p = progress(&[point(1, 80.0, 30), point(8, 120.0, 10), point(15, 90.0, 20)]).unwrap();
        assert_eq!(p.weight_change, 10.0);
        assert_eq!(p.weight_percent, 13);
        assert_eq!(p.reps_change, -10);
        assert_eq!(p.reps_percent, -33);
    }

    #[test]
    fn test_progress_from_zero_base() {
        let p = progress(&[point(1, 0.0, 0), point(2, 20.0, 12)]).unwrap();
        assert_eq!(p.weight_change, 20.0);
        assert_eq!(p.weight_percent, 0);
        assert_eq!(p.reps_percent, 0);
    }
}
