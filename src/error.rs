use crate::domain::{SprintId, TaskId, TaskStatus, TimerAction, TimerState};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Sprint not found: {0}")]
    SprintNotFound(SprintId),

    #[error("Task {task_id} not found in sprint {sprint_id}")]
    TaskNotFound { sprint_id: SprintId, task_id: TaskId },

    #[error("Cannot {action} a task that is {from}")]
    InvalidTransition {
        from: TimerState,
        action: TimerAction,
    },

    #[error("Invalid task status transition from {from} to {to}")]
    InvalidStatusMove { from: TaskStatus, to: TaskStatus },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Coarse classification of a [`BoardError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidTransition,
    Storage,
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::SprintNotFound(_) | Self::TaskNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidTransition { .. } | Self::InvalidStatusMove { .. } => {
                ErrorKind::InvalidTransition
            }
            Self::StorageError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorKind::Storage
            }
        }
    }

    /// Rejected user input or workflow violations; the caller can ignore the action
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Storage)
    }
}
