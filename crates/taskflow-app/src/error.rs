use std::fmt;

use taskflow_core::{ListId, TaskId};
use thiserror::Error;

/// Kind of record a service operation addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A [`taskflow_core::List`].
    List,
    /// A [`taskflow_core::Task`].
    Task,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "List",
            Self::Task => "Task",
        })
    }
}

/// Errors surfaced by the list and task services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A by-id operation addressed a record that does not exist.
    #[error("{kind} with Id {id} not found")]
    NotFound {
        /// Collection that was searched.
        kind: RecordKind,
        /// Requested identifier.
        id: u64,
    },
}

impl ServiceError {
    /// `NotFound` for a list id.
    #[must_use]
    pub const fn list_not_found(id: ListId) -> Self {
        Self::NotFound {
            kind: RecordKind::List,
            id: id.0,
        }
    }

    /// `NotFound` for a task id.
    #[must_use]
    pub const fn task_not_found(id: TaskId) -> Self {
        Self::NotFound {
            kind: RecordKind::Task,
            id: id.0,
        }
    }
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
