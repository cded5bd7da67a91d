//! Sync service bridging the remote API and the in-memory store.
//!
//! Every networked operation follows the same protocol: mark the global
//! status `Loading`, perform the call, and on success apply the store
//! mutation and mark `Succeeded`. On failure the store is left untouched
//! and the reporter records `Failed` plus the error message, whether the
//! server rejected the request or the transport never completed it.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::api::{AuthUser, LoginRequest, RestApi, Task, TodoApi, Todolist};
use crate::config::Config;
use crate::error::SyncError;
use crate::store::{AppState, RequestStatus, TaskFilter, TaskPatch, TodolistEntry};

/// Sync service that owns the API handle and the shared application state.
///
/// All mutations go through one `tokio::sync::Mutex`, so the two stores are
/// never observably out of sync: a todolist lifecycle change and its task
/// bucket change happen under the same lock.
#[derive(Clone)]
pub struct SyncService {
    api: Arc<dyn TodoApi>,
    state: Arc<Mutex<AppState>>,
}

impl SyncService {
    /// Create a sync service over any API implementation.
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(AppState::new())),
        }
    }

    /// Build the production service from configuration, reading the API key
    /// from the configured environment variable.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api.api_key()?;
        let api = RestApi::new(&config.api.base_url, &api_key)?;
        Ok(Self::new(Arc::new(api)))
    }

    /// Handle to the shared state, for callers that need more than the
    /// snapshot accessors below.
    pub fn state(&self) -> Arc<Mutex<AppState>> {
        Arc::clone(&self.state)
    }

    /// Snapshot of the todolist store in display order.
    pub async fn todolists(&self) -> Vec<TodolistEntry> {
        self.state.lock().await.todolists().to_vec()
    }

    /// Snapshot of one task bucket. `None` when the todolist is not
    /// present, as opposed to present with no tasks.
    pub async fn tasks_for(&self, todolist_id: &str) -> Option<Vec<Task>> {
        self.state
            .lock()
            .await
            .tasks_for(todolist_id)
            .map(<[Task]>::to_vec)
    }

    /// Current global status and last error message.
    pub async fn status(&self) -> (RequestStatus, Option<String>) {
        let state = self.state.lock().await;
        (state.status(), state.error().map(str::to_string))
    }

    /// Record a failure on the reporter and hand the error back.
    async fn report_failure(&self, err: SyncError) -> SyncError {
        warn!("sync operation failed: {err}");
        self.state.lock().await.fail(err.to_string());
        err
    }

    async fn mark_loading(&self) {
        self.state.lock().await.set_status(RequestStatus::Loading);
    }

    // --- todolist operations ---

    /// Fetch all todolists and replace the local stores with the result.
    pub async fn fetch_todolists(&self) -> Result<(), SyncError> {
        self.mark_loading().await;
        match self.api.fetch_todolists().await {
            Ok(todolists) => {
                debug!("fetched {} todolists", todolists.len());
                let mut state = self.state.lock().await;
                state.set_todolists(todolists);
                state.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Create a todolist and prepend it locally. The title must be
    /// non-empty after trimming; validation fails without a network call.
    pub async fn add_todolist(&self, title: &str) -> Result<Todolist, SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.report_failure(SyncError::EmptyTitle).await);
        }
        self.mark_loading().await;
        match self.api.create_todolist(title).await {
            Ok(todolist) => {
                debug!("created todolist {}", todolist.id);
                let mut state = self.state.lock().await;
                state.insert_todolist(todolist.clone());
                state.succeed();
                Ok(todolist)
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Rename a todolist on the server, then locally.
    pub async fn rename_todolist(&self, id: &str, title: &str) -> Result<(), SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.report_failure(SyncError::EmptyTitle).await);
        }
        self.mark_loading().await;
        match self.api.rename_todolist(id, title).await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.rename_todolist(id, title);
                state.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Delete a todolist and its task bucket. While the call is in flight
    /// the entry is marked `Loading`; the marker is cleared on both
    /// outcomes so a failed delete never leaves a stuck entry.
    pub async fn remove_todolist(&self, id: &str) -> Result<(), SyncError> {
        {
            let mut state = self.state.lock().await;
            state.set_status(RequestStatus::Loading);
            state.set_entity_status(id, RequestStatus::Loading);
        }
        match self.api.delete_todolist(id).await {
            Ok(()) => {
                debug!("deleted todolist {id}");
                let mut state = self.state.lock().await;
                state.remove_todolist(id);
                state.succeed();
                Ok(())
            }
            Err(err) => {
                self.state
                    .lock()
                    .await
                    .set_entity_status(id, RequestStatus::Idle);
                Err(self.report_failure(err).await)
            }
        }
    }

    /// Change a todolist's display filter. Purely local; never touches the
    /// network or the global status.
    pub async fn set_filter(&self, id: &str, filter: TaskFilter) {
        self.state.lock().await.set_filter(id, filter);
    }

    // --- task operations ---

    /// Fetch one todolist's tasks, replacing that bucket only.
    pub async fn fetch_tasks(&self, todolist_id: &str) -> Result<(), SyncError> {
        self.mark_loading().await;
        match self.api.fetch_tasks(todolist_id).await {
            Ok(tasks) => {
                debug!("fetched {} tasks for todolist {todolist_id}", tasks.len());
                let mut state = self.state.lock().await;
                state.set_tasks(todolist_id, tasks);
                state.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Create a task and prepend the server-returned record to its bucket.
    pub async fn add_task(&self, todolist_id: &str, title: &str) -> Result<Task, SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.report_failure(SyncError::EmptyTitle).await);
        }
        self.mark_loading().await;
        match self.api.create_task(todolist_id, title).await {
            Ok(task) => {
                debug!("created task {} in todolist {todolist_id}", task.id);
                let mut state = self.state.lock().await;
                state.push_task(task.clone());
                state.succeed();
                Ok(task)
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Merge-update a task.
    ///
    /// The server requires a full payload, so the current task is looked up
    /// in the store first; if it is absent the operation fails without a
    /// network call. The wire payload is the cached record with `patch`
    /// laid over it, and on success the same patch is applied to the cached
    /// record. The server response is never used for the merge.
    pub async fn update_task(
        &self,
        todolist_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<(), SyncError> {
        let payload = {
            let state = self.state.lock().await;
            state
                .task(todolist_id, task_id)
                .map(|task| patch.wire_payload(task))
        };
        let Some(payload) = payload else {
            let err = SyncError::TaskNotFound {
                todolist_id: todolist_id.to_string(),
                task_id: task_id.to_string(),
            };
            return Err(self.report_failure(err).await);
        };

        self.mark_loading().await;
        match self.api.update_task(todolist_id, task_id, &payload).await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.update_task(todolist_id, task_id, &patch);
                state.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Delete a task from the server and its bucket.
    pub async fn remove_task(&self, todolist_id: &str, task_id: &str) -> Result<(), SyncError> {
        self.mark_loading().await;
        match self.api.delete_task(todolist_id, task_id).await {
            Ok(()) => {
                debug!("deleted task {task_id} from todolist {todolist_id}");
                let mut state = self.state.lock().await;
                state.remove_task(todolist_id, task_id);
                state.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    // --- session ---

    /// Log in with the given credentials.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), SyncError> {
        self.mark_loading().await;
        match self.api.login(credentials).await {
            Ok(()) => {
                self.state.lock().await.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Who the server thinks we are. Read-only probe; does not touch the
    /// stores or the status reporter.
    pub async fn whoami(&self) -> Result<AuthUser, SyncError> {
        self.api.me().await
    }

    /// Log out and clear both stores.
    pub async fn logout(&self) -> Result<(), SyncError> {
        self.mark_loading().await;
        match self.api.logout().await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.clear();
                state.succeed();
                Ok(())
            }
            Err(err) => Err(self.report_failure(err).await),
        }
    }

    /// Clear both stores without a network call, e.g. when the session is
    /// already known to be gone.
    pub async fn reset(&self) {
        self.state.lock().await.clear();
    }
}
