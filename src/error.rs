//! Error types for the sync layer.
//!
//! Failures reach the caller through three distinct channels: the server
//! rejected the request at the application level (`Server`), the HTTP call
//! itself could not complete (`Network`), or a local precondition failed
//! before any network traffic happened (`TaskNotFound`, `EmptyTitle`).

/// Fallback shown when the server rejects a request without a message.
pub const DEFAULT_SERVER_ERROR: &str = "Some error occurred";

/// Error type shared by the API client and the sync service.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Application-level rejection: transport succeeded but the envelope
    /// carried a non-zero result code.
    #[error("{0}")]
    Server(String),

    /// Transport-level failure: the call never produced a usable envelope.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Update was requested for a task the local store has never seen.
    /// Raised before any network call is made.
    #[error("task {task_id} not found locally in todolist {todolist_id}")]
    TaskNotFound { todolist_id: String, task_id: String },

    /// Titles must be non-empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network(err.to_string())
    }
}
