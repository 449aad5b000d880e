use crate::{domain::BoardConfig, error::Result};
use async_trait::async_trait;

pub mod file_storage;
pub mod memory_storage;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Storage trait for persisting the board snapshot
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Replaces the stored snapshot
    async fn save_snapshot(&self, snapshot: &str) -> Result<()>;

    /// Loads the stored snapshot, `None` if nothing was saved yet
    async fn load_snapshot(&self) -> Result<Option<String>>;

    /// Loads the board configuration
    async fn load_config(&self) -> Result<BoardConfig> {
        Ok(BoardConfig::default())
    }

    /// Checks if the storage is initialized
    async fn is_initialized(&self) -> bool;
}
