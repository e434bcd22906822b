use crate::model::{Filter, Task};
use crate::storage::json_store;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Owned task-list state: the ordered tasks, the active filter, and the
/// in-progress edit session.
///
/// Every operation is total. Blank text and unknown ids degrade to
/// silent no-ops; persistence is best-effort and never surfaces a
/// failure to the caller. Construct one store per session and pass it
/// by reference to the presentation layer.
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: Filter,
    editing: Option<EditSession>,
    slot: Option<PathBuf>,
    last_id: i64,
}

#[derive(Debug)]
struct EditSession {
    id: i64,
    buffer: String,
}

impl TaskStore {
    /// Open a store backed by the slot at `path`, hydrating from it.
    ///
    /// An absent or malformed slot hydrates as an empty list; the store
    /// never fails to construct.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let tasks = match json_store::load_tasks(&path) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(slot = %path.display(), %err, "hydration failed, starting empty");
                Vec::new()
            }
        };

        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        Self {
            tasks,
            filter: Filter::All,
            editing: None,
            slot: Some(path),
            last_id,
        }
    }

    /// Store with no backing slot; state lives for the session only.
    pub fn in_memory() -> Self {
        Self {
            tasks: Vec::new(),
            filter: Filter::All,
            editing: None,
            slot: None,
            last_id: 0,
        }
    }

    /// Append a task with the trimmed text. Blank input is a no-op.
    pub fn create_task(&mut self, text: &str) -> Option<Task> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let task = Task {
            id: self.next_id(),
            text: trimmed.to_string(),
            completed: false,
            created_at: now_rfc3339(),
        };
        self.tasks.push(task.clone());
        self.persist();

        Some(task)
    }

    /// Flip the completed flag of the task with `id`, if present.
    pub fn toggle_completed(&mut self, id: i64) -> Option<Task> {
        let toggled = self.tasks.iter_mut().find(|task| task.id == id).map(|task| {
            task.completed = !task.completed;
            task.clone()
        });
        self.persist();

        toggled
    }

    /// Remove the task with `id`, preserving the order of the rest.
    pub fn delete_task(&mut self, id: i64) -> Option<Task> {
        let removed = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .map(|index| self.tasks.remove(index));
        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
        self.persist();

        removed
    }

    /// Start editing the task with `id`, seeding the buffer with its
    /// current text. Any edit already in progress is abandoned.
    pub fn begin_edit(&mut self, id: i64) -> Option<&str> {
        let buffer = self.tasks.iter().find(|task| task.id == id)?.text.clone();
        self.editing = Some(EditSession { id, buffer });

        self.editing.as_ref().map(|edit| edit.buffer.as_str())
    }

    /// End the edit session, replacing the task's text with the trimmed
    /// value. Blank text leaves the stored text unchanged; the session
    /// ends either way.
    pub fn commit_edit(&mut self, id: i64, new_text: &str) -> Option<Task> {
        self.editing = None;

        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let updated = self.tasks.iter_mut().find(|task| task.id == id).map(|task| {
            task.text = trimmed.to_string();
            task.clone()
        });
        if updated.is_some() {
            self.persist();
        }

        updated
    }

    /// Abandon the edit session without touching any task.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Remove every completed task, preserving the order of the rest.
    /// Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        self.persist();

        before - self.tasks.len()
    }

    /// Fresh snapshot of the tasks matching the active filter, in list
    /// order.
    pub fn visible_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .cloned()
            .collect()
    }

    /// `(completed, total)` over the full unfiltered list.
    pub fn completion_summary(&self) -> (usize, usize) {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        (completed, self.tasks.len())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing.as_ref().map(|edit| edit.id)
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.editing.as_ref().map(|edit| edit.buffer.as_str())
    }

    /// Millisecond creation timestamp, bumped past the previous id so
    /// rapid successive creates stay unique.
    fn next_id(&mut self) -> i64 {
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        self.last_id = now_ms.max(self.last_id + 1);
        self.last_id
    }

    fn persist(&self) {
        let Some(path) = self.slot.as_ref() else {
            return;
        };

        match json_store::save_tasks(path, &self.tasks) {
            Ok(()) => debug!(slot = %path.display(), tasks = self.tasks.len(), "slot written"),
            Err(err) => warn!(slot = %path.display(), %err, "persist failed, state kept in memory"),
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::new())
}
