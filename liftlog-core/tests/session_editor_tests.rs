use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;

use liftlog_core::service::{Exercise, SetRecord, WorkoutEntryRecord, WorkoutRecord};
use liftlog_core::session::{FieldValue, SetField};
use liftlog_core::{
    DataService, InMemoryDataService, PreferenceStore, RecordingNotifier, RestDuration,
    RestTimerDriver, SessionEditor, TimerPhase,
};

const USER: &str = "u-1";

struct Harness {
    editor: SessionEditor,
    service: Arc<InMemoryDataService>,
    notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 12).unwrap()
}

async fn open_editor(service: Arc<InMemoryDataService>) -> Harness {
    let dir = TempDir::new().unwrap();
    let prefs = Arc::new(PreferenceStore::open(&dir.path().join("preferences.json")));
    let notifier = Arc::new(RecordingNotifier::new());
    let timer = Arc::new(RestTimerDriver::new(
        RestDuration::default(),
        prefs,
        notifier.clone(),
    ));
    let editor = SessionEditor::open(USER, date(), service.clone(), timer, notifier.clone()).await;
    Harness {
        editor,
        service,
        notifier,
        _dir: dir,
    }
}

async fn catalog_exercise(service: &InMemoryDataService, name: &str) -> Exercise {
    service.create_exercise(USER, name).await.unwrap()
}

fn weights(h: &Harness, exercise_id: &str) -> Vec<FieldValue> {
    h.editor
        .session()
        .entry(exercise_id)
        .unwrap()
        .sets
        .iter()
        .map(|s| s.weight.clone())
        .collect()
}

#[tokio::test]
async fn test_squat_scenario_normalizes_empty_sets() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;
    assert!(h.editor.session().is_empty());

    h.editor.add_exercise(&squat).unwrap();
    h.editor.add_set(&squat.id).unwrap();
    h.editor.add_set(&squat.id).unwrap();

    let entry = h.editor.session().entry(&squat.id).unwrap();
    assert_eq!(h.editor.session().entries.len(), 1);
    assert_eq!(entry.sets.len(), 2);
    assert!(entry.sets.iter().all(|s| s.weight.is_empty() && s.reps.is_empty()));

    assert!(h.editor.commit_set_edits().settled().await);

    let stored = h.service.stored_workout(USER, date()).unwrap();
    assert_eq!(
        stored.exercises[0].sets,
        vec![SetRecord { weight: 0.0, reps: 0 }; 2]
    );
    let entry = h.editor.session().entry(&squat.id).unwrap();
    assert_eq!(entry.sets[0].weight, FieldValue::Value(0.0));
}

#[tokio::test]
async fn test_set_order_survives_removals() {
    let service = Arc::new(InMemoryDataService::new());
    let bench = catalog_exercise(&service, "Bench").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&bench).unwrap();
    for weight in ["40", "50", "60", "70"] {
        h.editor.add_set(&bench.id).unwrap();
        let index = h.editor.session().entry(&bench.id).unwrap().sets.len() - 1;
        h.editor
            .update_set_field(&bench.id, index, SetField::Weight, weight)
            .unwrap();
    }

    h.editor.remove_set(&bench.id, 1).unwrap();
    h.editor.remove_set(&bench.id, 2).unwrap();

    assert_eq!(
        weights(&h, &bench.id),
        vec![FieldValue::Value(40.0), FieldValue::Value(60.0)]
    );

    let err = h.editor.remove_set(&bench.id, 5).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(weights(&h, &bench.id).len(), 2);
}

#[tokio::test]
async fn test_duplicate_exercise_is_rejected_and_reported() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&squat).unwrap().settled().await;
    let saves = h.service.save_count();

    let err = h.editor.add_exercise(&squat).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.editor.session().entries.len(), 1);
    assert_eq!(h.service.save_count(), saves);
    assert_eq!(h.notifier.errors(), vec![err.user_message()]);
}

#[tokio::test]
async fn test_commit_twice_saves_the_same_snapshot() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&squat).unwrap();
    h.editor.add_set(&squat.id).unwrap();
    h.editor
        .update_set_field(&squat.id, 0, SetField::Weight, "-20")
        .unwrap();
    h.editor
        .update_set_field(&squat.id, 0, SetField::Reps, "5.9")
        .unwrap();

    h.editor.commit_set_edits().settled().await;
    let first = h.editor.session().clone();
    h.editor.commit_set_edits().settled().await;

    assert_eq!(h.editor.session(), &first);
    let saved = h.service.saved_snapshots();
    let last_two = &saved[saved.len() - 2..];
    assert_eq!(last_two[0], last_two[1]);
    assert_eq!(last_two[1].exercises[0].sets[0], SetRecord { weight: 0.0, reps: 5 });
}

#[tokio::test]
async fn test_field_edits_are_local_until_commit() {
    let service = Arc::new(InMemoryDataService::new());
    let row = catalog_exercise(&service, "Row").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&row).unwrap();
    h.editor.add_set(&row.id).unwrap().settled().await;
    let saves = h.service.save_count();

    h.editor
        .update_set_field(&row.id, 0, SetField::Weight, "12.")
        .unwrap();
    h.editor
        .update_set_field(&row.id, 0, SetField::Weight, "")
        .unwrap();
    assert_eq!(h.service.save_count(), saves);
    assert_eq!(weights(&h, &row.id), vec![FieldValue::Empty]);

    let err = h
        .editor
        .update_set_field(&row.id, 0, SetField::Reps, "ten")
        .unwrap_err();
    assert!(err.is_validation());
    let set = &h.editor.session().entry(&row.id).unwrap().sets[0];
    assert_eq!(set.reps, FieldValue::Empty);
}

#[tokio::test(start_paused = true)]
async fn test_second_set_starts_rest_timer() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&squat).unwrap();
    h.editor.add_set(&squat.id).unwrap();
    assert_eq!(h.editor.timer().snapshot().phase, TimerPhase::Idle);

    h.editor.add_set(&squat.id).unwrap();
    let snapshot = h.editor.timer().snapshot();
    assert_eq!(snapshot.phase, TimerPhase::Running);
    assert_eq!(snapshot.remaining, RestDuration::DEFAULT_SECONDS);

    h.editor.timer().shutdown();
}

#[tokio::test]
async fn test_remove_unknown_exercise_issues_no_save() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&squat).unwrap().settled().await;
    let before = h.editor.session().clone();
    let saves = h.service.save_count();

    assert!(h.editor.remove_exercise("missing").is_none());

    assert_eq!(h.editor.session(), &before);
    assert_eq!(h.service.save_count(), saves);
}

#[tokio::test]
async fn test_remove_exercise_persists_remaining_entries() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let bench = catalog_exercise(&service, "Bench").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&squat).unwrap();
    h.editor.add_exercise(&bench).unwrap();
    let save = h.editor.remove_exercise(&squat.id).unwrap();
    assert!(save.settled().await);

    let stored = h.service.stored_workout(USER, date()).unwrap();
    assert_eq!(stored.exercises.len(), 1);
    assert_eq!(stored.exercises[0].exercise_name, "Bench");
}

#[tokio::test]
async fn test_failed_save_keeps_local_change_and_reports() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;
    h.service.set_reject_saves(true);

    let stored = h.editor.add_exercise(&squat).unwrap().settled().await;

    assert!(!stored);
    assert!(h.editor.session().contains(&squat.id));
    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Workout not saved."));
}

#[tokio::test]
async fn test_revisions_increase_per_save() {
    let service = Arc::new(InMemoryDataService::new());
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;

    let first = h.editor.add_exercise(&squat).unwrap();
    let second = h.editor.add_set(&squat.id).unwrap();
    assert!(second.revision() > first.revision());
    first.settled().await;
    second.settled().await;
}

#[tokio::test]
async fn test_open_loads_existing_session_and_catalog() {
    let service = Arc::new(InMemoryDataService::new());
    let deadlift = catalog_exercise(&service, "Deadlift").await;
    service.insert_workout(WorkoutRecord {
        id: Some("w-1".to_string()),
        user_id: USER.to_string(),
        date: date(),
        exercises: vec![WorkoutEntryRecord {
            exercise_id: deadlift.id.clone(),
            exercise_name: "Deadlift (old name)".to_string(),
            sets: vec![SetRecord { weight: 140.0, reps: 3 }],
        }],
    });

    let h = open_editor(service).await;

    assert_eq!(h.editor.catalog(), &[deadlift.clone()]);
    let entry = h.editor.session().entry(&deadlift.id).unwrap();
    assert_eq!(entry.exercise_name, "Deadlift (old name)");
    assert_eq!(entry.sets[0].weight, FieldValue::Value(140.0));
}

#[tokio::test]
async fn test_open_offline_gives_empty_session() {
    let service = Arc::new(InMemoryDataService::new());
    service.set_offline(true);

    let h = open_editor(service).await;

    assert!(h.editor.session().is_empty());
    assert!(h.editor.catalog().is_empty());
    assert!(!h.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_create_and_add_extends_catalog() {
    let service = Arc::new(InMemoryDataService::new());
    let mut h = open_editor(service).await;

    h.editor
        .create_and_add_exercise("  Pull-up ")
        .await
        .unwrap()
        .settled()
        .await;

    assert_eq!(h.editor.catalog().len(), 1);
    assert_eq!(h.editor.session().entries[0].exercise_name, "Pull-up");
    assert!(h
        .editor
        .create_and_add_exercise(" ")
        .await
        .unwrap_err()
        .is_validation());
}

#[test]
fn test_close_stores_last_edit_before_runtime_exits() {
    let service = Arc::new(InMemoryDataService::new());
    service.set_save_delay(Duration::from_millis(20));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    runtime.block_on(async {
        let squat = catalog_exercise(&service, "Squat").await;
        let mut h = open_editor(service.clone()).await;
        h.editor.add_exercise(&squat).unwrap();
        h.editor.add_set(&squat.id).unwrap();
        h.editor
            .update_set_field(&squat.id, 0, SetField::Weight, "100")
            .unwrap();
        assert!(h.editor.has_uncommitted_edits());

        h.editor.timer().shutdown();
        let Harness { editor, .. } = h;
        assert!(editor.close().await);
    });
    drop(runtime);

    let stored = service.stored_workout(USER, date()).unwrap();
    assert_eq!(stored.exercises[0].sets[0].weight, 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_close_waits_for_saves_already_in_flight() {
    let service = Arc::new(InMemoryDataService::new());
    service.set_save_delay(Duration::from_millis(500));
    let squat = catalog_exercise(&service, "Squat").await;
    let mut h = open_editor(service).await;

    h.editor.add_exercise(&squat).unwrap();
    h.editor.add_set(&squat.id).unwrap();
    assert!(!h.editor.has_uncommitted_edits());
    assert_eq!(h.service.save_count(), 0);

    let Harness { editor, service, .. } = h;
    assert!(editor.close().await);
    assert_eq!(service.save_count(), 2);
}
