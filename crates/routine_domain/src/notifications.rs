use anyhow::Result;
use chrono::{NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use routine_core::{Task, TaskId};

/// Hour of day (local wall clock) at which reminders fire.
pub const REMINDER_HOUR: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub task_id: TaskId,
    pub title: String,
    pub body: String,
    pub first_fire: NaiveDateTime,
    pub repeats_daily: bool,
}

impl ReminderRequest {
    pub fn for_task(task: &Task, now: NaiveDateTime) -> Self {
        Self {
            task_id: task.id().clone(),
            title: "Task reminder".to_string(),
            body: format!("\"{}\" is due today.", task.title()),
            first_fire: next_reminder_at(now),
            repeats_daily: true,
        }
    }
}

/// Today at the reminder hour if that is still ahead, otherwise tomorrow.
pub fn next_reminder_at(now: NaiveDateTime) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(REMINDER_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let day = if now.time() < at {
        now.date()
    } else {
        now.date().succ_opt().unwrap_or(now.date())
    };
    day.and_time(at)
}

/// Platform-specific notification adapters implement this. Delivery is best
/// effort; callers decide which failures are fatal.
pub trait ReminderScheduler: Send + Sync {
    fn schedule_reminder(&self, request: &ReminderRequest) -> Result<()>;
    fn cancel_reminders_for_task(&self, task_id: &TaskId) -> Result<()>;
    fn cancel_all_reminders(&self) -> Result<()>;
}

/// Keeps scheduled reminders in memory. Used by the CLI, which has no OS
/// notification channel, and by tests.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    active: Mutex<Vec<ReminderRequest>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Vec<ReminderRequest> {
        self.active.lock().clone()
    }

    pub fn is_scheduled(&self, task_id: &TaskId) -> bool {
        self.active
            .lock()
            .iter()
            .any(|request| &request.task_id == task_id)
    }
}

impl ReminderScheduler for RecordingScheduler {
    fn schedule_reminder(&self, request: &ReminderRequest) -> Result<()> {
        tracing::info!(
            task_id = %request.task_id,
            first_fire = %request.first_fire,
            "reminder scheduled"
        );
        self.active.lock().push(request.clone());
        Ok(())
    }

    fn cancel_reminders_for_task(&self, task_id: &TaskId) -> Result<()> {
        let mut active = self.active.lock();
        let before = active.len();
        active.retain(|request| &request.task_id != task_id);
        tracing::debug!(%task_id, cancelled = before - active.len(), "reminders cancelled");
        Ok(())
    }

    fn cancel_all_reminders(&self) -> Result<()> {
        self.active.lock().clear();
        Ok(())
    }
}
