use crate::config::{default_directory, BaseDirResolver, ConfigProvider, EnvConfig, PathResolver};
use crate::error::{Error, Result};
use crate::flusher::FlushLock;
use crate::record::Level;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves, per severity, the sink directory and the dated file inside it.
///
/// Directories are looked up on every call so that a configuration change
/// takes effect on the next flush cycle. Clones share one [`FlushLock`], so
/// loggers started from clones of the same router never interleave writes.
#[derive(Clone)]
pub struct FileRouter {
    config: Arc<dyn ConfigProvider>,
    resolver: Arc<dyn PathResolver>,
    lock: Arc<FlushLock>,
}

impl FileRouter {
    pub fn new(config: Arc<dyn ConfigProvider>, resolver: Arc<dyn PathResolver>) -> Self {
        FileRouter {
            config,
            resolver,
            lock: Arc::new(FlushLock::new()),
        }
    }

    pub fn flush_lock(&self) -> Arc<FlushLock> {
        Arc::clone(&self.lock)
    }

    /// Directories from `DAILY_LOG_*_DIR`, relative to `DAILY_LOG_ROOT`.
    pub fn from_env() -> Self {
        Self::new(Arc::new(EnvConfig), Arc::new(BaseDirResolver::from_env()))
    }

    /// Absolute directory of the sink for `level`.
    pub fn directory(&self, level: Level) -> PathBuf {
        let name = level.sink_name();
        let configured = self
            .config
            .get_path(name)
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| default_directory(name));
        self.resolver.to_physical_path(&configured)
    }

    /// `{directory}/{yyyy-MM-dd}.log`
    pub fn file_for(&self, level: Level, date: NaiveDate) -> PathBuf {
        self.directory(level)
            .join(format!("{}.log", date.format("%Y-%m-%d")))
    }

    /// Create the sink directory if missing and return the dated file path.
    pub async fn ensure_directory(&self, level: Level, date: NaiveDate) -> Result<PathBuf> {
        let directory = self.directory(level);
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| Error::io(&directory, e))?;
        Ok(directory.join(format!("{}.log", date.format("%Y-%m-%d"))))
    }
}
