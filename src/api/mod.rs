//! Remote todolist API abstraction.
//!
//! This module defines the `TodoApi` trait that the sync layer talks to,
//! along with the wire types shared by every implementation. The production
//! implementation lives in [`rest`]; tests substitute their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, DEFAULT_SERVER_ERROR};

pub mod rest;

pub use rest::RestApi;

/// Lifecycle state of a task on the server.
///
/// Serialized as the integer codes the service uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TaskStatus {
    New,
    InProgress,
    Completed,
    Draft,
}

impl From<TaskStatus> for i32 {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::New => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed => 2,
            TaskStatus::Draft => 3,
        }
    }
}

impl TryFrom<i32> for TaskStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskStatus::New),
            1 => Ok(TaskStatus::InProgress),
            2 => Ok(TaskStatus::Completed),
            3 => Ok(TaskStatus::Draft),
            other => Err(format!("unknown task status code: {other}")),
        }
    }
}

/// Task priority, integer-coded on the wire like [`TaskStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TaskPriority {
    Low,
    Middle,
    High,
    Urgent,
    Later,
}

impl From<TaskPriority> for i32 {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Low => 0,
            TaskPriority::Middle => 1,
            TaskPriority::High => 2,
            TaskPriority::Urgent => 3,
            TaskPriority::Later => 4,
        }
    }
}

impl TryFrom<i32> for TaskPriority {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskPriority::Low),
            1 => Ok(TaskPriority::Middle),
            2 => Ok(TaskPriority::High),
            3 => Ok(TaskPriority::Urgent),
            4 => Ok(TaskPriority::Later),
            other => Err(format!("unknown task priority code: {other}")),
        }
    }
}

/// A todolist as the server returns it. Ids and ordering are
/// server-assigned; client-side decoration happens in the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todolist {
    pub id: String,
    pub title: String,
    pub added_date: String,
    pub order: i32,
}

/// A task belonging to exactly one todolist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub todo_list_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub added_date: String,
    pub order: i32,
}

/// Full task payload required by the update endpoint. The server does not
/// accept partial updates, so callers reconstruct this from the cached task
/// (see `TaskPatch` in the store layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
}

impl From<&Task> for TaskPayload {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            start_date: task.start_date.clone(),
            deadline: task.deadline.clone(),
        }
    }
}

/// Uniform envelope returned by every mutating endpoint.
/// `result_code == 0` means application-level success; anything else is a
/// rejection carrying human-readable `messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
pub struct ServerResponse<D> {
    pub result_code: i32,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub data: Option<D>,
}

impl<D> ServerResponse<D> {
    /// Turn the envelope into a result, extracting the first server message
    /// (or a default) on rejection.
    pub fn into_result(self) -> Result<Option<D>, SyncError> {
        if self.result_code == 0 {
            Ok(self.data)
        } else {
            let message = self
                .messages
                .into_iter()
                .next()
                .unwrap_or_else(|| DEFAULT_SERVER_ERROR.to_string());
            Err(SyncError::Server(message))
        }
    }
}

/// `data` shape of the create endpoints: the new record under an `item` key.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPayload<T> {
    pub item: T,
}

/// Body of the task-list endpoint. Unlike the mutating endpoints this is
/// not wrapped in a [`ServerResponse`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_count: i64,
    pub items: Vec<Task>,
}

/// Credentials for the login endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
}

/// The authenticated user as reported by the `me` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub login: String,
}

/// Contract with the remote todolist service.
///
/// Every method performs one round-trip and resolves the envelope, so the
/// sync layer only ever sees domain values or a [`SyncError`].
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn fetch_todolists(&self) -> Result<Vec<Todolist>, SyncError>;
    async fn create_todolist(&self, title: &str) -> Result<Todolist, SyncError>;
    async fn rename_todolist(&self, id: &str, title: &str) -> Result<(), SyncError>;
    async fn delete_todolist(&self, id: &str) -> Result<(), SyncError>;

    async fn fetch_tasks(&self, todolist_id: &str) -> Result<Vec<Task>, SyncError>;
    async fn create_task(&self, todolist_id: &str, title: &str) -> Result<Task, SyncError>;
    async fn update_task(
        &self,
        todolist_id: &str,
        task_id: &str,
        payload: &TaskPayload,
    ) -> Result<(), SyncError>;
    async fn delete_task(&self, todolist_id: &str, task_id: &str) -> Result<(), SyncError>;

    async fn login(&self, credentials: &LoginRequest) -> Result<(), SyncError>;
    async fn logout(&self) -> Result<(), SyncError>;
    async fn me(&self) -> Result<AuthUser, SyncError>;
}
