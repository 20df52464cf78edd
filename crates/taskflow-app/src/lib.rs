//! Application layer for taskflow.
//!
//! This crate provides the async list and task services, configuration
//! loading, filter construction from user input, and the [`Workspace`]
//! composition root shared by frontends.

pub mod clock;
pub mod config;
pub mod error;
pub mod filter_util;
pub mod latency;
pub mod list_service;
pub mod patch;
pub mod task_service;
pub mod workspace;

// Re-exports for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, BackendKind, CONFIG_FILE, ServiceConfig, StorageConfig, ViewConfig};
pub use error::{RecordKind, ServiceError, ServiceResult};
pub use filter_util::{FilterParseError, FilterParseResult, TaskFilterBuilder};
pub use latency::Latency;
pub use list_service::ListService;
pub use patch::{ListPatch, NewList, NewTask, TaskPatch};
pub use task_service::TaskService;
pub use workspace::{BucketRows, ListView, TaskRow, TodayView, Workspace};
