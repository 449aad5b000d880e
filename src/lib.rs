//! # Sprint Board
//!
//! Core domain logic for a single-user kanban board: sprints group tasks,
//! tasks move through `ToDo -> InProgress -> Done`, and each task tracks its
//! active working time across pause and resume.
//!
//! The crate holds no timers and does no I/O of its own beyond the
//! pluggable [`Storage`] used by [`BoardSession`]. Every timer transition is
//! a function of the task and an injected `now`.

pub mod clock;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use clock::{Clock, DefaultClock, ManualClock};
pub use domain::{
    board::{Board, BoardConfig, Column, ColumnView},
    sprint::{Sprint, SprintId},
    task::{Task, TaskId, TaskStatus},
    timer::{format_elapsed, live_elapsed, TimerAction, TimerState},
};
pub use error::{BoardError, ErrorKind, Result};
pub use session::BoardSession;
pub use storage::Storage;
