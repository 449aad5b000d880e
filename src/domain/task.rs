use crate::domain::timer::{self, TimerAction, TimerState};
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a task, unique within its sprint (1, 2, 3, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u32);

impl TaskId {
    /// Creates a new TaskId from a counter
    pub fn new(counter: u32) -> Self {
        Self(counter)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for TaskId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(BoardError::Validation(format!("invalid task id: {}", s))),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a task, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[serde(rename = "todo")]
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::ToDo, Self::InProgress, Self::Done];

    /// Column heading for the status
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// The timer action that moves a task from this status to `target`, if any
    pub fn action_to(&self, target: &TaskStatus) -> Option<TimerAction> {
        match (self, target) {
            (Self::ToDo, Self::InProgress) => Some(TimerAction::Start),
            (Self::InProgress, Self::Done) => Some(TimerAction::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A unit of work with a workflow status and accumulated active time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    /// Sum of all closed active intervals
    #[serde(default)]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub is_paused: bool,
    /// Start of the open active interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_since: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task in `ToDo` with no tracked time
    pub fn new(id: TaskId, title: String) -> Self {
        Self {
            id,
            title,
            status: TaskStatus::ToDo,
            elapsed_seconds: 0,
            is_paused: false,
            active_since: None,
        }
    }

    pub fn timer_state(&self) -> TimerState {
        TimerState::of(self)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.apply(TimerAction::Start, now)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.apply(TimerAction::Pause, now)
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.apply(TimerAction::Resume, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.apply(TimerAction::Complete, now)
    }

    /// Pauses a running task or resumes a paused one
    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> Result<()> {
        let action = match self.timer_state() {
            TimerState::Paused => TimerAction::Resume,
            _ => TimerAction::Pause,
        };
        self.apply(action, now)
    }

    /// Moves the task to another column, driving the matching timer transition
    pub fn move_to(&mut self, target: TaskStatus, now: DateTime<Utc>) -> Result<()> {
        match self.status.action_to(&target) {
            Some(action) => self.apply(action, now),
            None => Err(BoardError::InvalidStatusMove {
                from: self.status,
                to: target,
            }),
        }
    }

    /// Applies a transition in place; the task is left untouched on error
    pub fn apply(&mut self, action: TimerAction, now: DateTime<Utc>) -> Result<()> {
        *self = timer::apply(self, action, now)?;
        Ok(())
    }

    /// Elapsed active time including the open interval, for display
    pub fn live_elapsed(&self, now: DateTime<Utc>) -> u64 {
        timer::live_elapsed(self, now)
    }

    /// Repairs timer fields that cannot occur together.
    ///
    /// Returns `true` when anything was changed.
    pub(crate) fn normalize(&mut self) -> bool {
        let before = (self.is_paused, self.active_since);
        match self.status {
            TaskStatus::ToDo | TaskStatus::Done => {
                self.is_paused = false;
                self.active_since = None;
            }
            TaskStatus::InProgress if self.is_paused => {
                self.active_since = None;
            }
            TaskStatus::InProgress => {
                // Running with no known start: nothing to fold, keep it stopped
                if self.active_since.is_none() {
                    self.is_paused = true;
                }
            }
        }
        before != (self.is_paused, self.active_since)
    }
}
