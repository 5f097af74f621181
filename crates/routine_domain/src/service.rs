use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use tracing::instrument;

use routine_core::{Frequency, Task, TaskId, TaskView, ToggleOutcome};

use crate::{
    notifications::{ReminderRequest, ReminderScheduler},
    store::{KeyValueStore, MemoryStore},
};

/// Store key holding the serialized task list.
pub const TASKS_KEY: &str = "@routine_tasks";

/// Owns the task list for the whole process. Every mutation is written to
/// the store before the in-memory list is replaced, so a failed write leaves
/// the previous state visible.
pub struct RoutineService {
    store: Arc<dyn KeyValueStore>,
    scheduler: Option<Arc<dyn ReminderScheduler>>,
    tasks: RwLock<Vec<Task>>,
}

pub struct RoutineServiceBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    scheduler: Option<Arc<dyn ReminderScheduler>>,
}

impl RoutineServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            scheduler: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn ReminderScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Falls back to an in-memory store when none was given.
    pub fn build(self) -> Result<RoutineService> {
        let service = RoutineService {
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            scheduler: self.scheduler,
            tasks: RwLock::new(Vec::new()),
        };
        service.reload()?;
        Ok(service)
    }
}

impl Default for RoutineServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineService {
    pub fn builder() -> RoutineServiceBuilder {
        RoutineServiceBuilder::new()
    }

    /// Replaces the in-memory list with what the store holds. An absent key
    /// is an empty list.
    pub fn reload(&self) -> Result<()> {
        let raw = self
            .store
            .get(TASKS_KEY)
            .context("failed to read tasks from store")?;
        let tasks = match raw {
            Some(raw) => parse_tasks(&raw).context("stored task list is invalid")?,
            None => Vec::new(),
        };
        tracing::info!(task_count = tasks.len(), "tasks loaded");
        *self.tasks.write() = tasks;
        Ok(())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    pub fn task(&self, id: &TaskId) -> Result<Task> {
        self.tasks
            .read()
            .iter()
            .find(|task| task.id() == id)
            .cloned()
            .ok_or_else(|| anyhow!("no task with id `{}`", id))
    }

    /// Rendered window for every task, in list order.
    pub fn board(&self, today: NaiveDate) -> Result<Vec<TaskView>> {
        self.tasks
            .read()
            .iter()
            .map(|task| {
                TaskView::build(task, today)
                    .with_context(|| format!("failed to build window for `{}`", task.title()))
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub fn add_task(&self, title: &str, frequency: Frequency, now: NaiveDateTime) -> Result<Task> {
        let task = Task::new(title, frequency)?;
        ensure_window(&task, now)?;
        self.commit(|tasks| {
            tasks.push(task.clone());
            Ok(())
        })?;
        tracing::info!(task_id = %task.id(), "task added");
        self.schedule_best_effort(&task, now);
        Ok(task)
    }

    /// Applies the given changes. When anything a reminder depends on
    /// changed, the old reminders are cancelled before the edit is written;
    /// a failed cancellation leaves the task as it was.
    #[instrument(skip(self))]
    pub fn edit_task(
        &self,
        id: &TaskId,
        title: Option<&str>,
        frequency: Option<Frequency>,
        now: NaiveDateTime,
    ) -> Result<Task> {
        let current = self.task(id)?;
        let mut updated = current.clone();
        let mut changed = false;
        if let Some(title) = title {
            updated.rename(title)?;
            changed |= updated.title() != current.title();
        }
        if let Some(frequency) = frequency {
            changed |= updated.set_frequency(frequency);
        }
        if !changed {
            return Ok(current);
        }
        ensure_window(&updated, now)?;

        if let Some(scheduler) = &self.scheduler {
            scheduler
                .cancel_reminders_for_task(id)
                .context("failed to cancel reminders before rescheduling")?;
        }
        let written = self.commit(|tasks| {
            *find_mut(tasks, id)? = updated.clone();
            Ok(())
        });
        if let Err(err) = written {
            self.schedule_best_effort(&current, now);
            return Err(err);
        }
        self.schedule_best_effort(&updated, now);
        Ok(updated)
    }

    /// Reminders are cancelled before the task disappears; if cancellation
    /// fails the task is kept.
    #[instrument(skip(self))]
    pub fn delete_task(&self, id: &TaskId) -> Result<Task> {
        self.task(id)?;
        if let Some(scheduler) = &self.scheduler {
            scheduler
                .cancel_reminders_for_task(id)
                .with_context(|| format!("failed to cancel reminders for `{}`", id))?;
        }
        let removed = self.commit(|tasks| {
            let index = tasks
                .iter()
                .position(|task| task.id() == id)
                .ok_or_else(|| anyhow!("no task with id `{}`", id))?;
            Ok(tasks.remove(index))
        })?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(removed)
    }

    /// Rejected toggles (future dates) return [`ToggleOutcome::Rejected`]
    /// and write nothing.
    #[instrument(skip(self))]
    pub fn toggle_completion(
        &self,
        id: &TaskId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleOutcome> {
        let mut tasks = self.tasks.write();
        let mut draft = tasks.clone();
        let outcome = find_mut(&mut draft, id)?.toggle(date, today);
        if !outcome.is_change() {
            return Ok(outcome);
        }
        self.persist(&draft)?;
        *tasks = draft;
        tracing::debug!(task_id = %id, ?outcome, "completion toggled");
        Ok(outcome)
    }

    /// Cancels every reminder and wipes the store.
    #[instrument(skip(self))]
    pub fn reset_all(&self) -> Result<()> {
        let mut tasks = self.tasks.write();
        if let Some(scheduler) = &self.scheduler {
            scheduler
                .cancel_all_reminders()
                .context("failed to cancel reminders")?;
        }
        self.store.clear().context("failed to clear store")?;
        tasks.clear();
        tracing::info!("all data reset");
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&*self.tasks.read()).context("failed to serialize tasks")
    }

    /// Replaces the whole list. The document is validated before anything
    /// is touched; reminders are rebuilt for the imported tasks.
    #[instrument(skip(self, raw))]
    pub fn import_json(&self, raw: &str, now: NaiveDateTime) -> Result<usize> {
        let imported = parse_tasks(raw).context("import document is invalid")?;
        let mut seen = HashSet::new();
        for task in &imported {
            ensure!(seen.insert(task.id().clone()), "duplicate task id `{}`", task.id());
            ensure_window(task, now)?;
        }

        if let Some(scheduler) = &self.scheduler {
            scheduler
                .cancel_all_reminders()
                .context("failed to cancel reminders before import")?;
        }
        let written = {
            let mut tasks = self.tasks.write();
            self.persist(&imported).map(|()| *tasks = imported.clone())
        };
        if let Err(err) = written {
            for task in self.tasks() {
                self.schedule_best_effort(&task, now);
            }
            return Err(err);
        }
        for task in &imported {
            self.schedule_best_effort(task, now);
        }
        tracing::info!(task_count = imported.len(), "tasks imported");
        Ok(imported.len())
    }
}

impl RoutineService {
    fn commit<T>(&self, change: impl FnOnce(&mut Vec<Task>) -> Result<T>) -> Result<T> {
        let mut tasks = self.tasks.write();
        let mut draft = tasks.clone();
        let output = change(&mut draft)?;
        self.persist(&draft)?;
        *tasks = draft;
        Ok(output)
    }

    fn persist(&self, tasks: &[Task]) -> Result<()> {
        let payload = serde_json::to_string(tasks).context("failed to serialize tasks")?;
        self.store
            .set(TASKS_KEY, payload)
            .context("failed to write tasks to store")
    }

    fn schedule_best_effort(&self, task: &Task, now: NaiveDateTime) {
        let Some(scheduler) = &self.scheduler else {
            return;
        };
        let request = ReminderRequest::for_task(task, now);
        if let Err(err) = scheduler.schedule_reminder(&request) {
            tracing::warn!(task_id = %task.id(), %err, "unable to schedule reminder");
        }
    }
}

/// Refuses a task whose window cannot be built for `now`.
fn ensure_window(task: &Task, now: NaiveDateTime) -> Result<()> {
    task.window(now.date())
        .with_context(|| format!("frequency of `{}` is too large to display", task.title()))?;
    Ok(())
}

fn parse_tasks(raw: &str) -> Result<Vec<Task>> {
    Ok(serde_json::from_str(raw)?)
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|task| task.id() == id)
        .ok_or_else(|| anyhow!("no task with id `{}`", id))
}
