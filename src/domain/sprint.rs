use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a sprint on the board (1, 2, 3, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SprintId(u32);

impl SprintId {
    pub fn new(counter: u32) -> Self {
        Self(counter)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for SprintId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(BoardError::Validation(format!("invalid sprint id: {}", s))),
        }
    }
}

impl fmt::Display for SprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group of tasks; task order is display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Sprint {
    pub fn new(id: SprintId, name: String) -> Self {
        Self {
            id,
            name,
            tasks: Vec::new(),
        }
    }

    /// Id the next task added to this sprint receives
    pub fn next_task_id(&self) -> TaskId {
        TaskId::new(self.tasks.len() as u32 + 1)
    }

    /// Appends a new `ToDo` task and returns its id
    pub fn push_task(&mut self, title: String) -> TaskId {
        let id = self.next_task_id();
        self.tasks.push(Task::new(id, title));
        id
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Tasks with the given status, in insertion order
    pub fn tasks_with_status(&self, status: TaskStatus) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprint_id_parsing() {
        assert_eq!(SprintId::from_str("7").unwrap(), SprintId::new(7));
        assert!(SprintId::from_str("0").is_err());
        assert!(SprintId::from_str("sprint").is_err());
    }

    #[test]
    fn test_task_ids_are_scoped_to_sprint() {
        let mut sprint = Sprint::new(SprintId::new(2), "Sprint 2".to_string());
        assert_eq!(sprint.next_task_id(), TaskId::new(1));

        let first = sprint.push_task("A".to_string());
        let second = sprint.push_task("B".to_string());

        assert_eq!(first, TaskId::new(1));
        assert_eq!(second, TaskId::new(2));
        assert_eq!(sprint.task(second).unwrap().title, "B");
        assert!(sprint.task(TaskId::new(3)).is_none());
    }

    #[test]
    fn test_tasks_with_status_preserves_order() {
        let mut sprint = Sprint::new(SprintId::new(1), "Sprint 1".to_string());
        for title in ["a", "b", "c", "d"] {
            sprint.push_task(title.to_string());
        }
        sprint.task_mut(TaskId::new(2)).unwrap().status = TaskStatus::Done;

        let todo: Vec<_> = sprint
            .tasks_with_status(TaskStatus::ToDo)
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(todo, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_deserialize_without_tasks() {
        let sprint: Sprint = serde_json::from_str(r#"{"id": 1, "name": "Old"}"#).unwrap();
        assert!(sprint.tasks.is_empty());
    }
}
