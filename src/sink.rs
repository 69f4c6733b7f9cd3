use crate::flusher::FlushLock;
use crate::record::{Level, LogRecord};
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

/// Asynchronous destination for batches of [`LogRecord`]s.
///
/// The flusher calls `send` once per severity per flush cycle, from its own
/// thread, while holding the flush lock. Implementations are free to block
/// on I/O; no producer ever waits on them.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Persist one batch of records of a single severity.
    ///
    /// **Parameters**
    /// - `level`: severity shared by every record in `records`.
    /// - `records`: non-empty batch in drain order, already stamped.
    ///
    /// **Returns**
    /// - `Ok(())` if the whole batch was written.
    /// - `Err(..)` if anything failed. The flusher drops the unwritten part
    ///   of the batch, counts it and keeps running; there is no retry. Return
    ///   a [`PartialWrite`] when a prefix of the batch did reach the backend.
    async fn send(&self, level: Level, records: &[LogRecord]) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Lock shared by every flusher writing to the same destination.
    ///
    /// `None` gives each flusher a private lock.
    fn flush_lock(&self) -> Option<Arc<FlushLock>> {
        None
    }
}

/// A batch that failed after its first `written` records were persisted.
#[derive(Debug, thiserror::Error)]
#[error("batch failed after {written} records: {source}")]
pub struct PartialWrite {
    pub written: usize,
    #[source]
    pub source: Box<dyn Error + Send + Sync>,
}
