use std::fs;
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use routine_core::{DayStatus, Frequency, FrequencyUnit, ToggleOutcome};
use routine_domain::{JsonFileStore, KeyValueStore, RecordingScheduler, RoutineService, TASKS_KEY};
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date")
}

fn morning(d: u32) -> NaiveDateTime {
    day(d).and_hms_opt(7, 0, 0).expect("valid time")
}

fn open(path: &std::path::Path) -> (RoutineService, Arc<RecordingScheduler>) {
    let scheduler = Arc::new(RecordingScheduler::new());
    let service = RoutineService::builder()
        .with_store(Arc::new(JsonFileStore::new(path)))
        .with_scheduler(scheduler.clone())
        .build()
        .expect("build routine service");
    (service, scheduler)
}

#[test]
fn tasks_and_completions_survive_reopen() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("store.json");

    let (service, scheduler) = open(&path);
    assert!(service.tasks().is_empty(), "missing file means no tasks");

    let weekly = Frequency::new(FrequencyUnit::Week, 2).expect("frequency");
    let task = service
        .add_task("Water plants", weekly, morning(10))
        .expect("add task");
    assert!(scheduler.is_scheduled(task.id()));

    let outcome = service
        .toggle_completion(task.id(), day(10), day(10))
        .expect("toggle");
    assert_eq!(outcome, ToggleOutcome::Added(day(10)));
    drop(service);

    let (reopened, _) = open(&path);
    let board = reopened.board(day(10)).expect("board");
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].title, "Water plants");
    assert_eq!(board[0].frequency_label, "Every 2 weeks");
    assert_eq!(board[0].cells[0].date, day(10) - chrono::Days::new(56));
    assert_eq!(
        board[0].today_cell().map(|cell| cell.status),
        Some(DayStatus::Completed)
    );

    let undone = reopened
        .toggle_completion(task.id(), day(10), day(10))
        .expect("toggle back");
    assert_eq!(undone, ToggleOutcome::Removed(day(10)));
    assert!(reopened
        .task(task.id())
        .expect("task present")
        .completed_dates()
        .is_empty());
}

#[test]
fn loads_legacy_records_with_timestamps() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("store.json");
    let legacy_tasks = r#"[{"id":"1718000000000","title":"Meditate","frequency":{"type":"day","value":1},"completedDates":["2024-06-08T12:00:00.000Z","2024-06-08T12:10:00.000Z"]},{"id":"1718000000001","title":"Budget review","frequency":{"type":"month","value":1}}]"#;
    JsonFileStore::new(&path)
        .set(TASKS_KEY, legacy_tasks.to_string())
        .expect("seed store");

    let (service, _) = open(&path);
    let tasks = service.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].completed_dates().len(), 1, "same-day entries collapse");
    assert!(tasks[1].completed_dates().is_empty());

    let marked = Utc
        .with_ymd_and_hms(2024, 6, 8, 12, 0, 0)
        .single()
        .expect("valid timestamp")
        .with_timezone(&Local)
        .date_naive();
    assert!(tasks[0].completed_dates().contains(marked));

    let today = marked + Days::new(2);
    let board = service.board(today).expect("board");
    let meditate: Vec<DayStatus> = board[0].cells.iter().map(|cell| cell.status).collect();
    assert_eq!(
        meditate,
        vec![
            DayStatus::Missed,
            DayStatus::Missed,
            DayStatus::Completed,
            DayStatus::Missed,
            DayStatus::Pending,
            DayStatus::Future,
            DayStatus::Future,
        ]
    );
}

#[test]
fn corrupt_store_fails_loudly() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("store.json");
    fs::write(&path, "{ not json").expect("write fixture");

    let err = RoutineService::builder()
        .with_store(Arc::new(JsonFileStore::new(&path)))
        .build()
        .err()
        .expect("corrupt store must not load");
    assert!(format!("{err:#}").contains("not a JSON object"));
}

#[test]
fn reset_clears_store_and_reminders() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("store.json");
    let (service, scheduler) = open(&path);
    service
        .add_task("Journal", Frequency::daily(), morning(10))
        .expect("add task");

    service.reset_all().expect("reset");
    assert!(service.tasks().is_empty());
    assert!(scheduler.active().is_empty());
    assert!(!path.exists());

    let (reopened, _) = open(&path);
    assert!(reopened.tasks().is_empty());
}

#[test]
fn export_then_import_into_fresh_store() {
    let temp = tempdir().expect("tempdir");
    let (source, _) = open(&temp.path().join("a.json"));
    let task = source
        .add_task("Run", Frequency::new(FrequencyUnit::Day, 3).expect("frequency"), morning(10))
        .expect("add task");
    source
        .toggle_completion(task.id(), day(7), day(10))
        .expect("toggle");
    let exported = source.export_json().expect("export");

    let (target, scheduler) = open(&temp.path().join("b.json"));
    assert_eq!(target.import_json(&exported, morning(11)).expect("import"), 1);
    assert_eq!(target.tasks(), source.tasks());
    assert!(scheduler.is_scheduled(task.id()));

    let (reopened, _) = open(&temp.path().join("b.json"));
    assert_eq!(reopened.tasks(), source.tasks());
}
