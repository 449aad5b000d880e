//! Per-task time tracking.
//!
//! Elapsed time is accumulated by folding closed intervals: each transition
//! that ends an active interval adds `now - active_since` to
//! `elapsed_seconds`. The open interval is only ever read, never stored, so
//! no background ticking is needed and nothing can be counted twice.

use crate::domain::task::{Task, TaskStatus};
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timer state of a task. `Active` and `Paused` both show as `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    ToDo,
    Active,
    Paused,
    Done,
}

impl TimerState {
    pub fn of(task: &Task) -> Self {
        match task.status {
            TaskStatus::ToDo => Self::ToDo,
            TaskStatus::InProgress if task.is_paused => Self::Paused,
            TaskStatus::InProgress => Self::Active,
            TaskStatus::Done => Self::Done,
        }
    }

    /// The external status label for this state
    pub fn status(&self) -> TaskStatus {
        match self {
            Self::ToDo => TaskStatus::ToDo,
            Self::Active | Self::Paused => TaskStatus::InProgress,
            Self::Done => TaskStatus::Done,
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToDo => write!(f, "not started"),
            Self::Active => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
    Complete,
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Pause => write!(f, "pause"),
            Self::Resume => write!(f, "resume"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Computes the task that results from applying `action` at `now`.
///
/// The input is never modified; an invalid transition returns
/// [`BoardError::InvalidTransition`].
pub fn apply(task: &Task, action: TimerAction, now: DateTime<Utc>) -> Result<Task> {
    let from = task.timer_state();
    let mut next = task.clone();

    match (from, action) {
        (TimerState::ToDo, TimerAction::Start) | (TimerState::Paused, TimerAction::Resume) => {
            next.status = TaskStatus::InProgress;
            next.is_paused = false;
            next.active_since = Some(now);
        }
        (TimerState::Active, TimerAction::Pause) => {
            fold(&mut next, now);
            next.is_paused = true;
        }
        (TimerState::Active, TimerAction::Complete) => {
            fold(&mut next, now);
            next.is_paused = false;
            next.status = TaskStatus::Done;
        }
        (TimerState::Paused, TimerAction::Complete) => {
            next.is_paused = false;
            next.active_since = None;
            next.status = TaskStatus::Done;
        }
        _ => return Err(BoardError::InvalidTransition { from, action }),
    }

    Ok(next)
}

/// Accumulated time plus the open interval, if the task is running
pub fn live_elapsed(task: &Task, now: DateTime<Utc>) -> u64 {
    match (task.timer_state(), task.active_since) {
        (TimerState::Active, Some(since)) => task
            .elapsed_seconds
            .saturating_add(interval_seconds(since, now)),
        _ => task.elapsed_seconds,
    }
}

/// Renders a duration in seconds as `HH:MM:SS`
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn fold(task: &mut Task, now: DateTime<Utc>) {
    if let Some(since) = task.active_since.take() {
        task.elapsed_seconds = task
            .elapsed_seconds
            .saturating_add(interval_seconds(since, now));
    }
}

/// Whole seconds from `since` to `now`; zero if the clock went backwards
fn interval_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - since).num_seconds()).unwrap_or(0)
}
