use crate::{domain::BoardConfig, error::Result, storage::Storage};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process storage holding a single snapshot slot
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: RwLock<Option<String>>,
    config: BoardConfig,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing snapshot, as if saved by an earlier session
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot.into())),
            config: BoardConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn snapshot(&self) -> Option<String> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_snapshot(&self, snapshot: &str) -> Result<()> {
        *self.snapshot.write().await = Some(snapshot.to_string());
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<String>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        Ok(self.config.clone())
    }

    async fn is_initialized(&self) -> bool {
        true
    }
}
