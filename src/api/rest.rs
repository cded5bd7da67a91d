//! reqwest-backed implementation of [`TodoApi`].
//!
//! Every call goes to the same base endpoint with a fixed `API-KEY` header
//! and cookies enabled for the session. Transport failures surface as
//! `SyncError::Network`, unparseable bodies as `SyncError::InvalidResponse`,
//! and non-zero envelope result codes as `SyncError::Server`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::SyncError;

use super::{
    AuthUser, ItemPayload, LoginRequest, ServerResponse, Task, TaskPage, TaskPayload, TodoApi,
    Todolist,
};

/// Public endpoint of the todolist service.
pub const DEFAULT_BASE_URL: &str = "https://social-network.samuraijs.com/api/1.1";

/// HTTP client for the remote todolist service.
#[derive(Debug, Clone)]
pub struct RestApi {
    http: reqwest::Client,
    base_url: String,
}

impl RestApi {
    /// Build a client for `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("API-KEY", HeaderValue::from_str(api_key)?);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch a plain (non-envelope) JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let response = self.http.get(self.url(path)).send().await?.error_for_status()?;
        response
            .json()
            .await
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    /// Execute a request expected to return a [`ServerResponse`] envelope
    /// and resolve its result code.
    async fn envelope<D: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<D>, SyncError> {
        let response = request.send().await?.error_for_status()?;
        let envelope: ServerResponse<D> = response
            .json()
            .await
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        envelope.into_result()
    }
}

#[async_trait]
impl TodoApi for RestApi {
    async fn fetch_todolists(&self) -> Result<Vec<Todolist>, SyncError> {
        self.get_json("todo-lists").await
    }

    async fn create_todolist(&self, title: &str) -> Result<Todolist, SyncError> {
        let request = self
            .http
            .post(self.url("todo-lists"))
            .json(&json!({ "title": title }));
        let data: Option<ItemPayload<Todolist>> = self.envelope(request).await?;
        data.map(|payload| payload.item)
            .ok_or_else(|| SyncError::InvalidResponse("missing item in create response".to_string()))
    }

    async fn rename_todolist(&self, id: &str, title: &str) -> Result<(), SyncError> {
        let request = self
            .http
            .put(self.url(&format!("todo-lists/{id}")))
            .json(&json!({ "title": title }));
        self.envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn delete_todolist(&self, id: &str) -> Result<(), SyncError> {
        let request = self.http.delete(self.url(&format!("todo-lists/{id}")));
        self.envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn fetch_tasks(&self, todolist_id: &str) -> Result<Vec<Task>, SyncError> {
        let page: TaskPage = self.get_json(&format!("todo-lists/{todolist_id}/tasks")).await?;
        if let Some(error) = page.error {
            return Err(SyncError::Server(error));
        }
        Ok(page.items)
    }

    async fn create_task(&self, todolist_id: &str, title: &str) -> Result<Task, SyncError> {
        let request = self
            .http
            .post(self.url(&format!("todo-lists/{todolist_id}/tasks")))
            .json(&json!({ "title": title }));
        let data: Option<ItemPayload<Task>> = self.envelope(request).await?;
        data.map(|payload| payload.item)
            .ok_or_else(|| SyncError::InvalidResponse("missing item in create response".to_string()))
    }

    async fn update_task(
        &self,
        todolist_id: &str,
        task_id: &str,
        payload: &TaskPayload,
    ) -> Result<(), SyncError> {
        let request = self
            .http
            .put(self.url(&format!("todo-lists/{todolist_id}/tasks/{task_id}")))
            .json(payload);
        self.envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn delete_task(&self, todolist_id: &str, task_id: &str) -> Result<(), SyncError> {
        let request = self
            .http
            .delete(self.url(&format!("todo-lists/{todolist_id}/tasks/{task_id}")));
        self.envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<(), SyncError> {
        let request = self.http.post(self.url("auth/login")).json(credentials);
        self.envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), SyncError> {
        let request = self.http.delete(self.url("auth/login"));
        self.envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn me(&self) -> Result<AuthUser, SyncError> {
        let data: Option<AuthUser> = self.envelope(self.http.get(self.url("auth/me"))).await?;
        data.ok_or_else(|| SyncError::InvalidResponse("missing user in me response".to_string()))
    }
}
