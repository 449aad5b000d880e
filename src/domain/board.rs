use crate::domain::sprint::{Sprint, SprintId};
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::domain::timer::TimerAction;
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for a kanban board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub status: TaskStatus,
}

impl Column {
    pub fn new(name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Sprint Board".to_string(),
            columns: TaskStatus::ALL
                .iter()
                .map(|status| Column::new(status.label(), *status))
                .collect(),
        }
    }
}

/// A column together with the sprint's tasks that belong in it
#[derive(Debug)]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

/// Kanban board state: every sprint and, through them, every task
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    pub config: BoardConfig,
    sprints: Vec<Sprint>,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            sprints: Vec::new(),
        }
    }

    /// Builds a board from a persisted snapshot, falling back to an empty
    /// board when the snapshot is absent or unreadable
    pub fn restore_or_default(config: BoardConfig, snapshot: Option<&str>) -> Self {
        let mut board = Self::new(config);
        if let Some(snapshot) = snapshot {
            if let Err(e) = board.restore(snapshot) {
                warn!(error = %e, "discarding unreadable board snapshot");
            }
        }
        board
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    pub fn sprint(&self, id: SprintId) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn task(&self, sprint_id: SprintId, task_id: TaskId) -> Option<&Task> {
        self.sprint(sprint_id).and_then(|s| s.task(task_id))
    }

    /// Generates the next sprint ID
    pub fn next_sprint_id(&self) -> SprintId {
        SprintId::new(self.sprints.len() as u32 + 1)
    }

    /// Appends a new, empty sprint
    pub fn create_sprint(&mut self, name: &str) -> Result<SprintId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::Validation(
                "sprint name must not be empty".to_string(),
            ));
        }

        let id = self.next_sprint_id();
        self.sprints.push(Sprint::new(id, name.to_string()));
        debug!(sprint_id = %id, name, "created sprint");
        Ok(id)
    }

    /// Appends a new `ToDo` task to a sprint
    pub fn add_task(&mut self, sprint_id: SprintId, title: &str) -> Result<TaskId> {
        let sprint = self.sprint_mut(sprint_id)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::Validation(
                "task title must not be empty".to_string(),
            ));
        }

        let task_id = sprint.push_task(title.to_string());
        debug!(sprint_id = %sprint_id, task_id = %task_id, title, "added task");
        Ok(task_id)
    }

    /// Tasks of one sprint with the given status, in insertion order.
    ///
    /// An unknown sprint yields no tasks.
    pub fn tasks_by_status(&self, sprint_id: SprintId, status: TaskStatus) -> Vec<&Task> {
        self.sprint(sprint_id)
            .map(|s| s.tasks_with_status(status).collect())
            .unwrap_or_default()
    }

    /// The configured columns of a sprint, each with its tasks
    pub fn columns(&self, sprint_id: SprintId) -> Vec<ColumnView<'_>> {
        self.config
            .columns
            .iter()
            .map(|column| ColumnView {
                column,
                tasks: self.tasks_by_status(sprint_id, column.status),
            })
            .collect()
    }

    pub fn start(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.apply(sprint_id, task_id, TimerAction::Start, now)
    }

    pub fn pause(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.apply(sprint_id, task_id, TimerAction::Pause, now)
    }

    pub fn resume(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.apply(sprint_id, task_id, TimerAction::Resume, now)
    }

    pub fn complete(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.apply(sprint_id, task_id, TimerAction::Complete, now)
    }

    pub fn toggle_pause(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let task = self.task_mut(sprint_id, task_id)?;
        task.toggle_pause(now)?;
        debug!(
            sprint_id = %sprint_id,
            task_id = %task_id,
            state = %task.timer_state(),
            "toggled pause"
        );
        Ok(())
    }

    /// Moves a task to another column
    pub fn move_task(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        target: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let task = self.task_mut(sprint_id, task_id)?;
        task.move_to(target, now)?;
        debug!(sprint_id = %sprint_id, task_id = %task_id, status = %target, "moved task");
        Ok(())
    }

    /// Elapsed active time of a task including its open interval
    pub fn live_elapsed(
        &self,
        sprint_id: SprintId,
        task_id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let sprint = self
            .sprint(sprint_id)
            .ok_or(BoardError::SprintNotFound(sprint_id))?;
        sprint
            .task(task_id)
            .map(|t| t.live_elapsed(now))
            .ok_or(BoardError::TaskNotFound { sprint_id, task_id })
    }

    /// Serializes the full sprint list
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.sprints)?)
    }

    /// Replaces all sprints with the ones in `snapshot`.
    ///
    /// The board is unchanged if the snapshot cannot be parsed or its ids are
    /// not `1, 2, 3, ...` in order.
    pub fn restore(&mut self, snapshot: &str) -> Result<()> {
        let mut sprints: Vec<Sprint> = serde_json::from_str(snapshot)?;
        Self::check_ids(&sprints)?;

        for sprint in &mut sprints {
            for task in &mut sprint.tasks {
                if task.normalize() {
                    warn!(
                        sprint_id = %sprint.id,
                        task_id = %task.id,
                        "repaired inconsistent timer state in snapshot"
                    );
                }
            }
        }

        self.sprints = sprints;
        debug!(sprints = self.sprints.len(), "restored board snapshot");
        Ok(())
    }

    /// Ids are handed out as `count + 1`, so a snapshot is only usable when
    /// every id equals its position + 1
    fn check_ids(sprints: &[Sprint]) -> Result<()> {
        for (pos, sprint) in sprints.iter().enumerate() {
            if sprint.id.value() as usize != pos + 1 {
                return Err(BoardError::StorageError(format!(
                    "corrupt snapshot: sprint at position {} has id {}",
                    pos + 1,
                    sprint.id
                )));
            }
            for (task_pos, task) in sprint.tasks.iter().enumerate() {
                if task.id.value() as usize != task_pos + 1 {
                    return Err(BoardError::StorageError(format!(
                        "corrupt snapshot: task at position {} of sprint {} has id {}",
                        task_pos + 1,
                        sprint.id,
                        task.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn apply(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        action: TimerAction,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.task_mut(sprint_id, task_id)?.apply(action, now)?;
        debug!(sprint_id = %sprint_id, task_id = %task_id, %action, "applied timer action");
        Ok(())
    }

    fn sprint_mut(&mut self, id: SprintId) -> Result<&mut Sprint> {
        self.sprints
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(BoardError::SprintNotFound(id))
    }

    fn task_mut(&mut self, sprint_id: SprintId, task_id: TaskId) -> Result<&mut Task> {
        self.sprint_mut(sprint_id)?
            .task_mut(task_id)
            .ok_or(BoardError::TaskNotFound { sprint_id, task_id })
    }
}
