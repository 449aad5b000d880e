pub mod board;
pub mod sprint;
pub mod task;
pub mod timer;

pub use board::{Board, BoardConfig, Column, ColumnView};
pub use sprint::{Sprint, SprintId};
pub use task::{Task, TaskId, TaskStatus};
pub use timer::{format_elapsed, live_elapsed, TimerAction, TimerState};
