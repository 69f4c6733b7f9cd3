use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while starting the logger or writing a dated file.
///
/// Nothing in this enum ever reaches a producer calling `log_info!` or
/// `log_error!`; write failures are reported through `tracing` and the
/// [`LoggerStats`](crate::logger::LoggerStats) counters instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build the flusher runtime")]
    Runtime(#[source] std::io::Error),

    #[error("failed to spawn the flusher thread")]
    Spawn(#[source] std::io::Error),

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the process-wide logger is already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    SetTracing(#[from] tracing::dispatcher::SetGlobalDefaultError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
