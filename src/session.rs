//! The action surface a UI drives.
//!
//! A [`BoardSession`] owns the board for the lifetime of a UI session. It
//! restores the last snapshot once when opened and writes a fresh snapshot
//! after every successful mutation. Taking `&mut self` for mutations keeps a
//! single writer.

use crate::{
    clock::Clock,
    domain::{Board, BoardConfig, ColumnView, SprintId, Task, TaskId, TaskStatus},
    error::Result,
    storage::Storage,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct BoardSession<S, C>
where
    S: Storage,
    C: Clock,
{
    board: Board,
    storage: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> BoardSession<S, C>
where
    S: Storage,
    C: Clock,
{
    /// Opens a session, restoring the last saved snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty board.
    pub async fn open(storage: Arc<S>, clock: Arc<C>) -> Result<Self> {
        storage.initialize().await?;

        let config = match storage.load_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "falling back to default board config");
                BoardConfig::default()
            }
        };

        let snapshot = match storage.load_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "could not read board snapshot");
                None
            }
        };

        let board = Board::restore_or_default(config, snapshot.as_deref());
        debug!(sprints = board.sprints().len(), "opened board session");

        Ok(Self {
            board,
            storage,
            clock,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub async fn create_sprint(&mut self, name: &str) -> Result<SprintId> {
        self.mutate(|board, _| board.create_sprint(name)).await
    }

    pub async fn add_task(&mut self, sprint_id: SprintId, title: &str) -> Result<TaskId> {
        self.mutate(|board, _| board.add_task(sprint_id, title)).await
    }

    pub async fn start(&mut self, sprint_id: SprintId, task_id: TaskId) -> Result<()> {
        self.mutate(|board, now| board.start(sprint_id, task_id, now)).await
    }

    pub async fn pause(&mut self, sprint_id: SprintId, task_id: TaskId) -> Result<()> {
        self.mutate(|board, now| board.pause(sprint_id, task_id, now)).await
    }

    pub async fn resume(&mut self, sprint_id: SprintId, task_id: TaskId) -> Result<()> {
        self.mutate(|board, now| board.resume(sprint_id, task_id, now)).await
    }

    pub async fn complete(&mut self, sprint_id: SprintId, task_id: TaskId) -> Result<()> {
        self.mutate(|board, now| board.complete(sprint_id, task_id, now)).await
    }

    pub async fn toggle_pause(&mut self, sprint_id: SprintId, task_id: TaskId) -> Result<()> {
        self.mutate(|board, now| board.toggle_pause(sprint_id, task_id, now)).await
    }

    pub async fn move_task(
        &mut self,
        sprint_id: SprintId,
        task_id: TaskId,
        target: TaskStatus,
    ) -> Result<()> {
        self.mutate(|board, now| board.move_task(sprint_id, task_id, target, now)).await
    }

    pub fn tasks_by_status(&self, sprint_id: SprintId, status: TaskStatus) -> Vec<&Task> {
        self.board.tasks_by_status(sprint_id, status)
    }

    pub fn columns(&self, sprint_id: SprintId) -> Vec<ColumnView<'_>> {
        self.board.columns(sprint_id)
    }

    /// Elapsed active time of a task as of the session clock
    pub fn live_elapsed(&self, sprint_id: SprintId, task_id: TaskId) -> Result<u64> {
        self.board.live_elapsed(sprint_id, task_id, self.clock.utc())
    }

    /// Runs a board mutation and persists the result.
    ///
    /// If saving fails the board is rolled back, so any error leaves the
    /// session as it was.
    async fn mutate<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Board, DateTime<Utc>) -> Result<T>,
    {
        let now = self.clock.utc();
        let previous = self.board.clone();

        let value = op(&mut self.board, now)?;

        if let Err(e) = self.persist().await {
            warn!(error = %e, "failed to save board snapshot, rolling back");
            self.board = previous;
            return Err(e);
        }

        Ok(value)
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.board.serialize()?;
        self.storage.save_snapshot(&snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        error::BoardError,
        storage::{FileStorage, MemoryStorage},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ))
    }

    /// Storage whose writes can be switched to fail
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl Storage for FlakyStorage {
        async fn initialize(&self) -> Result<()> {
            Ok(())
        }

        async fn save_snapshot(&self, snapshot: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(BoardError::StorageError("disk full".to_string()));
            }
            self.inner.save_snapshot(snapshot).await
        }

        async fn load_snapshot(&self) -> Result<Option<String>> {
            self.inner.load_snapshot().await
        }

        async fn is_initialized(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_open_empty() {
        let session = BoardSession::open(Arc::new(MemoryStorage::new()), clock())
            .await
            .unwrap();
        assert!(session.board().sprints().is_empty());
    }

    #[tokio::test]
    async fn test_open_with_corrupt_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::with_snapshot("{{{"));
        let session = BoardSession::open(storage, clock()).await.unwrap();
        assert!(session.board().sprints().is_empty());
    }

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = clock();
        let mut session = BoardSession::open(storage.clone(), clock.clone())
            .await
            .unwrap();

        let sprint = session.create_sprint("Sprint 1").await.unwrap();
        assert_eq!(
            storage.snapshot().await.unwrap(),
            session.board().serialize().unwrap()
        );

        let task = session.add_task(sprint, "Write tests").await.unwrap();
        session.start(sprint, task).await.unwrap();
        clock.advance_secs(3);
        session.pause(sprint, task).await.unwrap();

        let saved = storage.snapshot().await.unwrap();
        assert_eq!(saved, session.board().serialize().unwrap());
        assert!(saved.contains("\"is_paused\":true"));
    }

    #[tokio::test]
    async fn test_timing_follows_session_clock() {
        let clock = clock();
        let mut session = BoardSession::open(Arc::new(MemoryStorage::new()), clock.clone())
            .await
            .unwrap();
        let sprint = session.create_sprint("Sprint 1").await.unwrap();
        let task = session.add_task(sprint, "Task").await.unwrap();

        session.start(sprint, task).await.unwrap();
        clock.advance_secs(3);
        session.pause(sprint, task).await.unwrap();
        clock.advance_secs(7);
        session.resume(sprint, task).await.unwrap();
        clock.advance_secs(1);
        assert_eq!(session.live_elapsed(sprint, task).unwrap(), 4);

        clock.advance_secs(1);
        session.complete(sprint, task).await.unwrap();

        let done = session.tasks_by_status(sprint, TaskStatus::Done);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].elapsed_seconds, 5);
    }

    #[tokio::test]
    async fn test_toggle_and_move() {
        let clock = clock();
        let mut session = BoardSession::open(Arc::new(MemoryStorage::new()), clock.clone())
            .await
            .unwrap();
        let sprint = session.create_sprint("Sprint 1").await.unwrap();
        let task = session.add_task(sprint, "Task").await.unwrap();

        session
            .move_task(sprint, task, TaskStatus::InProgress)
            .await
            .unwrap();
        clock.advance_secs(2);
        session.toggle_pause(sprint, task).await.unwrap();
        clock.advance_secs(2);
        session.toggle_pause(sprint, task).await.unwrap();
        clock.advance_secs(2);
        session
            .move_task(sprint, task, TaskStatus::Done)
            .await
            .unwrap();

        let columns = session.columns(sprint);
        assert_eq!(columns[2].tasks.len(), 1);
        assert_eq!(columns[2].tasks[0].elapsed_seconds, 4);
    }

    #[tokio::test]
    async fn test_rejected_actions_leave_state_and_snapshot_unchanged() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = BoardSession::open(storage.clone(), clock()).await.unwrap();
        let sprint = session.create_sprint("Sprint 1").await.unwrap();
        let task = session.add_task(sprint, "Task").await.unwrap();

        let board_before = session.board().clone();
        let saved_before = storage.snapshot().await;

        assert!(session.create_sprint(" ").await.is_err());
        assert!(session.add_task(SprintId::new(8), "x").await.is_err());
        assert!(session.pause(sprint, task).await.is_err());
        assert!(session.complete(sprint, TaskId::new(5)).await.is_err());

        assert_eq!(session.board(), &board_before);
        assert_eq!(storage.snapshot().await, saved_before);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let storage = Arc::new(FlakyStorage::default());
        let mut session = BoardSession::open(storage.clone(), clock()).await.unwrap();
        let sprint = session.create_sprint("Sprint 1").await.unwrap();
        let before = session.board().clone();

        storage.fail_writes.store(true, Ordering::SeqCst);
        let err = session.add_task(sprint, "Lost").await.unwrap_err();

        assert!(matches!(err, BoardError::StorageError(_)));
        assert_eq!(session.board(), &before);
    }

    #[tokio::test]
    async fn test_reopen_restores_mid_pause_state() {
        let temp_dir = TempDir::new().unwrap();
        let clock = clock();

        let (sprint, task) = {
            let storage = Arc::new(FileStorage::new(temp_dir.path()));
            let mut session = BoardSession::open(storage, clock.clone()).await.unwrap();
            let sprint = session.create_sprint("Sprint 1").await.unwrap();
            let task = session.add_task(sprint, "Persisted").await.unwrap();
            session.start(sprint, task).await.unwrap();
            clock.advance_secs(6);
            session.pause(sprint, task).await.unwrap();
            (sprint, task)
        };

        clock.advance_secs(600);
        let storage = Arc::new(FileStorage::new(temp_dir.path()));
        let mut session = BoardSession::open(storage, clock.clone()).await.unwrap();

        let restored = session.board().task(sprint, task).unwrap();
        assert!(restored.is_paused);
        assert_eq!(restored.elapsed_seconds, 6);

        session.resume(sprint, task).await.unwrap();
        clock.advance_secs(4);
        session.complete(sprint, task).await.unwrap();
        assert_eq!(
            session.board().task(sprint, task).unwrap().elapsed_seconds,
            10
        );
    }
}
