//! Integration tests for the sync service against a stubbed API.
//!
//! The stub stands in for the remote service behind the `TodoApi` seam: it
//! records every call, can be told to reject the next mutating call at the
//! application level or to drop the connection entirely, and keeps a small
//! in-memory server state so fetches reflect earlier creates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use listling::api::{AuthUser, LoginRequest, Task, TaskPayload, TodoApi, Todolist};
use listling::error::SyncError;
use listling::store::{RequestStatus, TaskFilter, TaskPatch};
use listling::sync::SyncService;
use listling::{TaskPriority, TaskStatus};

fn todolist(id: &str, title: &str) -> Todolist {
    Todolist {
        id: id.to_string(),
        title: title.to_string(),
        added_date: "2024-01-01T00:00:00".to_string(),
        order: 0,
    }
}

fn task(id: &str, todolist_id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        todo_list_id: todolist_id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::New,
        priority: TaskPriority::Low,
        start_date: None,
        deadline: None,
        added_date: "2024-01-01T00:00:00".to_string(),
        order: 0,
    }
}

#[derive(Default)]
struct StubApi {
    todolists: Mutex<Vec<Todolist>>,
    tasks: Mutex<HashMap<String, Vec<Task>>>,
    calls: Mutex<Vec<String>>,
    /// Application-level rejection for the next checked call.
    reject_with: Mutex<Option<String>>,
    /// Simulate the transport never completing.
    disconnected: Mutex<bool>,
    last_update: Mutex<Option<TaskPayload>>,
    next_id: Mutex<u32>,
}

impl StubApi {
    fn with_todolists(todolists: Vec<Todolist>) -> Self {
        let tasks = todolists
            .iter()
            .map(|tl| (tl.id.clone(), Vec::new()))
            .collect();
        Self {
            todolists: Mutex::new(todolists),
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    fn seed_tasks(&self, todolist_id: &str, tasks: Vec<Task>) {
        self.tasks
            .lock()
            .unwrap()
            .insert(todolist_id.to_string(), tasks);
    }

    fn reject_next(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    fn disconnect(&self) {
        *self.disconnected.lock().unwrap() = true;
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn check(&self, call: &str) -> Result<(), SyncError> {
        self.calls.lock().unwrap().push(call.to_string());
        if *self.disconnected.lock().unwrap() {
            return Err(SyncError::Network("connection refused".to_string()));
        }
        if let Some(message) = self.reject_with.lock().unwrap().take() {
            return Err(SyncError::Server(message));
        }
        Ok(())
    }

    fn mint_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{prefix}-{next}")
    }
}

#[async_trait]
impl TodoApi for StubApi {
    async fn fetch_todolists(&self) -> Result<Vec<Todolist>, SyncError> {
        self.check("fetch_todolists")?;
        Ok(self.todolists.lock().unwrap().clone())
    }

    async fn create_todolist(&self, title: &str) -> Result<Todolist, SyncError> {
        self.check("create_todolist")?;
        let created = todolist(&self.mint_id("tl"), title);
        self.todolists.lock().unwrap().insert(0, created.clone());
        self.tasks
            .lock()
            .unwrap()
            .insert(created.id.clone(), Vec::new());
        Ok(created)
    }

    async fn rename_todolist(&self, id: &str, title: &str) -> Result<(), SyncError> {
        self.check("rename_todolist")?;
        let mut todolists = self.todolists.lock().unwrap();
        if let Some(tl) = todolists.iter_mut().find(|tl| tl.id == id) {
            tl.title = title.to_string();
        }
        Ok(())
    }

    async fn delete_todolist(&self, id: &str) -> Result<(), SyncError> {
        self.check("delete_todolist")?;
        self.todolists.lock().unwrap().retain(|tl| tl.id != id);
        self.tasks.lock().unwrap().remove(id);
        Ok(())
    }

    async fn fetch_tasks(&self, todolist_id: &str) -> Result<Vec<Task>, SyncError> {
        self.check("fetch_tasks")?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .get(todolist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_task(&self, todolist_id: &str, title: &str) -> Result<Task, SyncError> {
        self.check("create_task")?;
        let created = task(&self.mint_id("task"), todolist_id, title);
        self.tasks
            .lock()
            .unwrap()
            .entry(todolist_id.to_string())
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        _todolist_id: &str,
        _task_id: &str,
        payload: &TaskPayload,
    ) -> Result<(), SyncError> {
        *self.last_update.lock().unwrap() = Some(payload.clone());
        self.check("update_task")
    }

    async fn delete_task(&self, todolist_id: &str, task_id: &str) -> Result<(), SyncError> {
        self.check("delete_task")?;
        if let Some(bucket) = self.tasks.lock().unwrap().get_mut(todolist_id) {
            bucket.retain(|task| task.id != task_id);
        }
        Ok(())
    }

    async fn login(&self, _credentials: &LoginRequest) -> Result<(), SyncError> {
        self.check("login")
    }

    async fn logout(&self) -> Result<(), SyncError> {
        self.check("logout")
    }

    async fn me(&self) -> Result<AuthUser, SyncError> {
        self.check("me")?;
        Ok(AuthUser {
            id: 1,
            email: "user@example.test".to_string(),
            login: "user".to_string(),
        })
    }
}

fn service(stub: StubApi) -> (Arc<StubApi>, SyncService) {
    let stub = Arc::new(stub);
    let service = SyncService::new(stub.clone());
    (stub, service)
}

#[tokio::test]
async fn fetch_todolists_populates_both_stores() {
    let (_, service) = service(StubApi::with_todolists(vec![
        todolist("a", "Chores"),
        todolist("b", "Work"),
    ]));

    service.fetch_todolists().await.unwrap();

    let entries = service.todolists().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].todolist.title, "Chores");
    assert_eq!(entries[0].filter, TaskFilter::All);
    assert_eq!(service.tasks_for("a").await, Some(Vec::new()));
    assert_eq!(service.tasks_for("b").await, Some(Vec::new()));

    let (status, error) = service.status().await;
    assert_eq!(status, RequestStatus::Succeeded);
    assert!(error.is_none());
}

#[tokio::test]
async fn created_task_comes_back_first_from_fetch() {
    let (_, service) = service(StubApi::default());

    let created = service.add_todolist("Groceries").await.unwrap();
    service.add_task(&created.id, "X").await.unwrap();

    // The local bucket already has it first.
    assert_eq!(service.tasks_for(&created.id).await.unwrap()[0].title, "X");

    // And so does a fresh fetch from the stubbed server.
    service.fetch_tasks(&created.id).await.unwrap();
    let bucket = service.tasks_for(&created.id).await.unwrap();
    assert_eq!(bucket[0].title, "X");
}

#[tokio::test]
async fn update_sends_full_payload_and_patches_cache() {
    let stub = StubApi::with_todolists(vec![todolist("a", "Chores")]);
    stub.seed_tasks("a", vec![task("t1", "a", "A")]);
    let (stub, service) = service(stub);

    service.fetch_todolists().await.unwrap();
    service.fetch_tasks("a").await.unwrap();

    let patch = TaskPatch {
        status: Some(TaskStatus::Completed),
        ..TaskPatch::default()
    };
    service.update_task("a", "t1", patch).await.unwrap();

    // Wire payload carried the unchanged cached fields plus the patch.
    let sent = stub.last_update.lock().unwrap().clone().unwrap();
    assert_eq!(sent.title, "A");
    assert_eq!(sent.status, TaskStatus::Completed);
    assert_eq!(sent.priority, TaskPriority::Low);

    // The cached task got the same partial merge.
    let cached = &service.tasks_for("a").await.unwrap()[0];
    assert_eq!(cached.title, "A");
    assert_eq!(cached.status, TaskStatus::Completed);
    assert_eq!(cached.priority, TaskPriority::Low);
}

#[tokio::test]
async fn update_of_unknown_task_never_hits_the_network() {
    let stub = StubApi::with_todolists(vec![todolist("a", "Chores")]);
    let (stub, service) = service(stub);
    service.fetch_todolists().await.unwrap();
    stub.clear_calls();

    let err = service
        .update_task("a", "missing", TaskPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::TaskNotFound { .. }));
    assert!(stub.calls().is_empty());

    let (status, error) = service.status().await;
    assert_eq!(status, RequestStatus::Failed);
    assert!(error.unwrap().contains("not found locally"));
}

#[tokio::test]
async fn deleting_a_todolist_drops_its_bucket() {
    let (_, service) = service(StubApi::with_todolists(vec![
        todolist("a", "Chores"),
        todolist("b", "Work"),
    ]));
    service.fetch_todolists().await.unwrap();

    service.remove_todolist("a").await.unwrap();

    assert_eq!(service.todolists().await.len(), 1);
    // Not present at all, as opposed to present-but-empty.
    assert_eq!(service.tasks_for("a").await, None);
    assert_eq!(service.tasks_for("b").await, Some(Vec::new()));
}

#[tokio::test]
async fn rejected_create_leaves_store_unchanged() {
    let (stub, service) = service(StubApi::default());
    stub.reject_next("title required");

    let err = service.add_todolist("New list").await.unwrap_err();

    assert!(matches!(err, SyncError::Server(_)));
    assert!(service.todolists().await.is_empty());

    let (status, error) = service.status().await;
    assert_eq!(status, RequestStatus::Failed);
    assert_eq!(error.as_deref(), Some("title required"));
}

#[tokio::test]
async fn transport_failure_is_reported_and_nonfatal() {
    let (stub, service) = service(StubApi::with_todolists(vec![todolist("a", "Chores")]));
    service.fetch_todolists().await.unwrap();
    stub.disconnect();

    let err = service.rename_todolist("a", "Renamed").await.unwrap_err();

    assert!(matches!(err, SyncError::Network(_)));
    // The attempted mutation did not apply.
    assert_eq!(service.todolists().await[0].todolist.title, "Chores");
    let (status, error) = service.status().await;
    assert_eq!(status, RequestStatus::Failed);
    assert!(error.unwrap().contains("network error"));
}

#[tokio::test]
async fn set_filter_is_purely_local() {
    let (stub, service) = service(StubApi::with_todolists(vec![todolist("a", "Chores")]));
    service.fetch_todolists().await.unwrap();
    stub.clear_calls();

    service.set_filter("a", TaskFilter::Completed).await;

    assert!(stub.calls().is_empty());
    assert_eq!(service.todolists().await[0].filter, TaskFilter::Completed);
}

#[tokio::test]
async fn failed_delete_clears_the_entity_marker() {
    let (stub, service) = service(StubApi::with_todolists(vec![todolist("a", "Chores")]));
    service.fetch_todolists().await.unwrap();
    stub.reject_next("cannot delete");

    let err = service.remove_todolist("a").await.unwrap_err();
    assert!(matches!(err, SyncError::Server(_)));

    let entries = service.todolists().await;
    assert_eq!(entries.len(), 1);
    // The entry must not stay stuck in loading.
    assert_eq!(entries[0].entity_status, RequestStatus::Idle);
}

#[tokio::test]
async fn empty_titles_are_rejected_before_any_call() {
    let (stub, service) = service(StubApi::with_todolists(vec![todolist("a", "Chores")]));
    service.fetch_todolists().await.unwrap();
    stub.clear_calls();

    assert!(matches!(
        service.add_todolist("   ").await.unwrap_err(),
        SyncError::EmptyTitle
    ));
    assert!(matches!(
        service.add_task("a", "").await.unwrap_err(),
        SyncError::EmptyTitle
    ));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn logout_clears_both_stores() {
    let (_, service) = service(StubApi::with_todolists(vec![todolist("a", "Chores")]));
    service.fetch_todolists().await.unwrap();
    service.add_task("a", "X").await.unwrap();

    service.logout().await.unwrap();

    assert!(service.todolists().await.is_empty());
    assert_eq!(service.tasks_for("a").await, None);
}

#[tokio::test]
async fn reset_is_local_and_returns_to_idle() {
    let (stub, service) = service(StubApi::with_todolists(vec![todolist("a", "Chores")]));
    service.fetch_todolists().await.unwrap();
    stub.clear_calls();

    service.reset().await;

    assert!(stub.calls().is_empty());
    assert!(service.todolists().await.is_empty());
    let (status, error) = service.status().await;
    assert_eq!(status, RequestStatus::Idle);
    assert!(error.is_none());
}
