//! Configuration of the logger and its external collaborators.
//!
//! Directory lookup and physical-path resolution are kept behind the
//! [`ConfigProvider`] and [`PathResolver`] traits so that applications can
//! plug in their own configuration system. The environment-backed
//! implementations here are convenience helpers.

use crate::record::LineFormat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base directory that relative log directories are resolved against.
pub const DAILY_LOG_ROOT_ENV: &str = "DAILY_LOG_ROOT";

/// Directory for the info sink.
pub const DAILY_LOG_INFO_DIR_ENV: &str = "DAILY_LOG_INFO_DIR";

/// Directory for the error sink.
pub const DAILY_LOG_ERROR_DIR_ENV: &str = "DAILY_LOG_ERROR_DIR";

/// Pause in milliseconds between flush cycles.
pub const DAILY_LOG_IDLE_PAUSE_MS_ENV: &str = "DAILY_LOG_IDLE_PAUSE_MS";

/// `json` switches the line format; anything else means text.
pub const DAILY_LOG_FORMAT_ENV: &str = "DAILY_LOG_FORMAT";

/// Directory used for a logical sink that has no configured path.
pub fn default_directory(logical_name: &str) -> String {
    format!("logs/{logical_name}")
}

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Looks up the configured directory of a logical sink (`"info"`, `"error"`).
pub trait ConfigProvider: Send + Sync {
    /// `None` (or an empty string) means "use the default".
    fn get_path(&self, logical_name: &str) -> Option<String>;
}

/// Turns a configured, possibly relative, path into an absolute one.
pub trait PathResolver: Send + Sync {
    fn to_physical_path(&self, path: &str) -> PathBuf;
}

/// Reads `DAILY_LOG_<NAME>_DIR` on every lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn get_path(&self, logical_name: &str) -> Option<String> {
        let key = format!("DAILY_LOG_{}_DIR", logical_name.to_ascii_uppercase());
        std::env::var(key).ok()
    }
}

/// Fixed in-memory mapping, mostly for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticPaths {
    paths: HashMap<String, String>,
}

impl StaticPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logical_name: impl Into<String>, path: impl Into<String>) -> Self {
        self.paths.insert(logical_name.into(), path.into());
        self
    }
}

impl ConfigProvider for StaticPaths {
    fn get_path(&self, logical_name: &str) -> Option<String> {
        self.paths.get(logical_name).cloned()
    }
}

/// Resolves relative paths against a base directory; absolute paths pass
/// through unchanged.
#[derive(Clone, Debug)]
pub struct BaseDirResolver {
    base: PathBuf,
}

impl BaseDirResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        BaseDirResolver { base: base.into() }
    }

    /// Base directory from [`DAILY_LOG_ROOT_ENV`], else the working directory.
    pub fn from_env() -> Self {
        match std::env::var_os(DAILY_LOG_ROOT_ENV) {
            Some(root) => Self::new(root),
            None => Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl PathResolver for BaseDirResolver {
    fn to_physical_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

/// Tuning knobs for a [`Logger`](crate::logger::Logger).
///
/// **Fields**
/// - `idle_pause`: pause after each flush cycle before waiting again. It
///   only keeps the flusher from spinning under bursty load; drained events
///   are always written in the cycle that drained them.
/// - `line_format`: layout of each written line.
/// - `enable_stdout`: when installed through
///   [`init_tracing_with_config`](crate::init::init_tracing_with_config),
///   also add a `fmt` layer printing events to the console.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub idle_pause: Duration,
    pub line_format: LineFormat,
    pub enable_stdout: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            idle_pause: Duration::from_millis(10),
            line_format: LineFormat::Text,
            enable_stdout: false,
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `DAILY_LOG_IDLE_PAUSE_MS` and `DAILY_LOG_FORMAT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(ms) = env_or(DAILY_LOG_IDLE_PAUSE_MS_ENV, "").parse::<u64>() {
            config.idle_pause = Duration::from_millis(ms);
        }
        if env_or(DAILY_LOG_FORMAT_ENV, "text").eq_ignore_ascii_case("json") {
            config.line_format = LineFormat::Json;
        }
        config
    }

    /// Pause with the minimal threshold applied.
    pub(crate) fn effective_idle_pause(&self) -> Duration {
        self.idle_pause.max(Duration::from_millis(1))
    }
}
