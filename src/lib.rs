//! Listling - client-side state layer for a remote todolist service
//!
//! This library keeps a normalized in-memory picture of the user's
//! todolists and tasks in sync with a remote REST service. It exposes an
//! async sync service that performs the CRUD calls, merges server
//! responses into the local store, and reports request status and errors
//! for a UI to read.
//!
//! # Modules
//!
//! * [`api`] - Remote service trait, wire types, and the reqwest client
//! * [`config`] - Application configuration management
//! * [`error`] - Error types for the sync layer
//! * [`logger`] - Logging setup
//! * [`store`] - Normalized in-memory store and status reporter
//! * [`sync`] - Sync service tying the API and the store together

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod store;
pub mod sync;

pub use api::{Task, TaskPriority, TaskStatus, TodoApi, Todolist};
pub use error::SyncError;
pub use store::{AppState, RequestStatus, TaskFilter, TaskPatch, TodolistEntry};
pub use sync::SyncService;
