use crate::record::{Level, LogRecord};
use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;

/// Sink that accepts every batch and writes nothing.
///
/// The flusher still drains, stamps and counts each record, so the load
/// demos measure the producer path and the flush cycle without file I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _level: Level, _records: &[LogRecord]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
