//! In-memory normalized store for todolists and tasks.
//!
//! The store is plain data plus pure mutations; no I/O happens here. The
//! sync layer applies a mutation only after the corresponding remote call
//! succeeded, so the store always reflects server-acknowledged state.
//!
//! Two invariants hold after every todolist mutation:
//! - the task store has exactly one bucket per todolist id, and
//! - bucket order is display order (new tasks prepend, fetches replace
//!   wholesale in server order).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::{Task, TaskPayload, TaskPriority, TaskStatus, Todolist};

/// Client-only display filter attached to each todolist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// State of the latest network operation.
///
/// One global value shared by all operations: concurrent calls overwrite
/// each other last-write-wins. There is no per-request correlation or
/// cancellation of in-flight calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A todolist decorated with client-side display state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodolistEntry {
    pub todolist: Todolist,
    pub filter: TaskFilter,
    /// Per-item request marker, distinct from the global status. Set while
    /// a delete call for this todolist is in flight.
    pub entity_status: RequestStatus,
}

impl From<Todolist> for TodolistEntry {
    fn from(todolist: Todolist) -> Self {
        Self {
            todolist,
            filter: TaskFilter::All,
            entity_status: RequestStatus::Idle,
        }
    }
}

impl TodolistEntry {
    pub fn id(&self) -> &str {
        &self.todolist.id
    }
}

/// Partial task change supplied by the caller.
///
/// The server only accepts full task payloads, so an update is a two-step
/// merge: build the wire payload from the cached task with this patch laid
/// over it, and after the server accepts, lay the same patch over the
/// cached task. The server response is never consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
}

impl TaskPatch {
    /// Reconstruct the full wire payload: `current`'s fields with the
    /// patched ones substituted.
    pub fn wire_payload(&self, current: &Task) -> TaskPayload {
        TaskPayload {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            status: self.status.unwrap_or(current.status),
            priority: self.priority.unwrap_or(current.priority),
            start_date: self.start_date.clone().or_else(|| current.start_date.clone()),
            deadline: self.deadline.clone().or_else(|| current.deadline.clone()),
        }
    }

    /// Overlay the patch onto a cached task, leaving unpatched fields alone.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(start_date) = &self.start_date {
            task.start_date = Some(start_date.clone());
        }
        if let Some(deadline) = &self.deadline {
            task.deadline = Some(deadline.clone());
        }
    }
}

/// The whole client-side state: both stores plus the global status
/// reporter. Initialized empty and idle; torn down via [`AppState::clear`].
#[derive(Debug, Clone, Default)]
pub struct AppState {
    todolists: Vec<TodolistEntry>,
    tasks: HashMap<String, Vec<Task>>,
    status: RequestStatus,
    error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- todolist store ---

    pub fn todolists(&self) -> &[TodolistEntry] {
        &self.todolists
    }

    pub fn todolist(&self, id: &str) -> Option<&TodolistEntry> {
        self.todolists.iter().find(|entry| entry.id() == id)
    }

    /// Replace the whole todolist store with a fetched list. Every fetched
    /// id gets a fresh empty bucket; stale buckets are dropped.
    pub fn set_todolists(&mut self, todolists: Vec<Todolist>) {
        self.tasks = todolists
            .iter()
            .map(|todolist| (todolist.id.clone(), Vec::new()))
            .collect();
        self.todolists = todolists.into_iter().map(TodolistEntry::from).collect();
    }

    /// Prepend a freshly created todolist and its empty bucket.
    pub fn insert_todolist(&mut self, todolist: Todolist) {
        self.tasks.insert(todolist.id.clone(), Vec::new());
        self.todolists.insert(0, TodolistEntry::from(todolist));
    }

    /// Remove a todolist and its bucket. No-op when the id is unknown.
    pub fn remove_todolist(&mut self, id: &str) {
        self.todolists.retain(|entry| entry.id() != id);
        self.tasks.remove(id);
    }

    /// No-op when the id is unknown.
    pub fn rename_todolist(&mut self, id: &str, title: &str) {
        if let Some(entry) = self.todolists.iter_mut().find(|entry| entry.id() == id) {
            entry.todolist.title = title.to_string();
        }
    }

    /// No-op when the id is unknown.
    pub fn set_filter(&mut self, id: &str, filter: TaskFilter) {
        if let Some(entry) = self.todolists.iter_mut().find(|entry| entry.id() == id) {
            entry.filter = filter;
        }
    }

    /// No-op when the id is unknown.
    pub fn set_entity_status(&mut self, id: &str, status: RequestStatus) {
        if let Some(entry) = self.todolists.iter_mut().find(|entry| entry.id() == id) {
            entry.entity_status = status;
        }
    }

    // --- task store ---

    /// Tasks for one todolist. `None` means the todolist is not present,
    /// which is distinct from a present-but-empty bucket.
    pub fn tasks_for(&self, todolist_id: &str) -> Option<&[Task]> {
        self.tasks.get(todolist_id).map(Vec::as_slice)
    }

    pub fn task(&self, todolist_id: &str, task_id: &str) -> Option<&Task> {
        self.tasks
            .get(todolist_id)?
            .iter()
            .find(|task| task.id == task_id)
    }

    /// Replace one bucket with a fetched task list, preserving server
    /// order. Other buckets are untouched.
    pub fn set_tasks(&mut self, todolist_id: &str, tasks: Vec<Task>) {
        self.tasks.insert(todolist_id.to_string(), tasks);
    }

    /// Prepend a freshly created task to its owning bucket.
    pub fn push_task(&mut self, task: Task) {
        self.tasks
            .entry(task.todo_list_id.clone())
            .or_default()
            .insert(0, task);
    }

    /// Overlay `patch` onto a cached task. No-op when the task is absent.
    pub fn update_task(&mut self, todolist_id: &str, task_id: &str, patch: &TaskPatch) {
        if let Some(task) = self
            .tasks
            .get_mut(todolist_id)
            .and_then(|bucket| bucket.iter_mut().find(|task| task.id == task_id))
        {
            patch.apply(task);
        }
    }

    /// No-op when the task is absent.
    pub fn remove_task(&mut self, todolist_id: &str, task_id: &str) {
        if let Some(bucket) = self.tasks.get_mut(todolist_id) {
            bucket.retain(|task| task.id != task_id);
        }
    }

    // --- status reporter ---

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Last error message recorded by a failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    /// Record a failure: status `Failed` plus the message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RequestStatus::Failed;
        self.error = Some(message.into());
    }

    /// Record a success and drop any previous error message.
    pub fn succeed(&mut self) {
        self.status = RequestStatus::Succeeded;
        self.error = None;
    }

    // --- reset ---

    /// Clear both stores and return the reporter to idle. Invoked on
    /// logout / session loss.
    pub fn clear(&mut self) {
        self.todolists.clear();
        self.tasks.clear();
        self.status = RequestStatus::Idle;
        self.error = None;
    }
}
