use crate::{
    domain::BoardConfig,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const BOARD_DIR: &'static str = ".sprint-board";
    const BOARD_FILE: &'static str = "board.json";
    const CONFIG_FILE: &'static str = "config.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::BOARD_DIR),
        }
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Writes to a sibling temp file first so a crash never leaves a torn snapshot
    async fn write_atomically(&self, path: &Path, contents: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.config_file().exists() {
            let json = serde_json::to_string_pretty(&BoardConfig::default())?;
            self.write_atomically(&self.config_file(), &json).await?;
        }

        Ok(())
    }

    async fn save_snapshot(&self, snapshot: &str) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.write_atomically(&self.board_file(), snapshot).await
    }

    async fn load_snapshot(&self) -> Result<Option<String>> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&board_file).await?;
        Ok(Some(contents))
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        let config_file = self.config_file();

        if !config_file.exists() {
            return Ok(BoardConfig::default());
        }

        let contents = fs::read_to_string(&config_file).await?;
        serde_json::from_str(&contents).map_err(|e| {
            BoardError::StorageError(format!("invalid {}: {}", config_file.display(), e))
        })
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists()
    }
}
