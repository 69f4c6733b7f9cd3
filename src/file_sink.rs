use crate::error::Error as SinkError;
use crate::flusher::FlushLock;
use crate::record::{Level, LineFormat, LogRecord};
use crate::router::FileRouter;
use crate::sink::{LogSink, PartialWrite};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Writes each batch to `{sink directory}/{yyyy-MM-dd}.log`.
///
/// Files are opened in append mode for every batch and closed right after;
/// no handle is held between flush cycles. Records are routed by their own
/// timestamp, so a batch stamped across midnight lands in two files.
#[derive(Clone)]
pub struct DailyFileSink {
    router: FileRouter,
    format: LineFormat,
}

impl DailyFileSink {
    pub fn new(router: FileRouter, format: LineFormat) -> Self {
        DailyFileSink { router, format }
    }

    pub fn router(&self) -> &FileRouter {
        &self.router
    }

    /// Rendered text and record count per day.
    fn group_by_day(&self, records: &[LogRecord]) -> BTreeMap<NaiveDate, (String, usize)> {
        let mut days: BTreeMap<NaiveDate, (String, usize)> = BTreeMap::new();
        for record in records {
            let (text, count) = days.entry(record.timestamp.date()).or_default();
            text.push_str(&record.render(self.format));
            text.push('\n');
            *count += 1;
        }
        days
    }

    async fn write_day(&self, level: Level, day: NaiveDate, text: &str) -> Result<(), SinkError> {
        let path = self.router.ensure_directory(level, day).await?;
        append(&path, text).await
    }
}

async fn append(path: &Path, text: &str) -> Result<(), SinkError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| SinkError::io(path, e))?;
    file.write_all(text.as_bytes())
        .await
        .map_err(|e| SinkError::io(path, e))?;
    file.flush().await.map_err(|e| SinkError::io(path, e))?;
    Ok(())
}

#[async_trait]
impl LogSink for DailyFileSink {
    async fn send(&self, level: Level, records: &[LogRecord]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut written = 0;
        for (day, (text, count)) in self.group_by_day(records) {
            if let Err(e) = self.write_day(level, day, &text).await {
                if written == 0 {
                    return Err(e.into());
                }
                return Err(Box::new(PartialWrite {
                    written,
                    source: e.into(),
                }));
            }
            written += count;
        }
        Ok(())
    }

    fn flush_lock(&self) -> Option<Arc<FlushLock>> {
        Some(self.router.flush_lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BaseDirResolver, StaticPaths};
    use crate::record::LogEvent;
    use chrono::NaiveDateTime;

    fn ts(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, day)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    fn record(message: &str, at: NaiveDateTime) -> LogRecord {
        LogRecord::stamp(LogEvent::info(message.to_string(), None), at)
    }

    fn sink(root: &Path) -> DailyFileSink {
        let router = FileRouter::new(
            Arc::new(StaticPaths::new()),
            Arc::new(BaseDirResolver::new(root)),
        );
        DailyFileSink::new(router, LineFormat::Text)
    }

    #[tokio::test]
    async fn appends_across_batches() {
        let root = tempfile::tempdir().unwrap();
        let sink = sink(root.path());

        sink.send(Level::Info, &[record("one", ts(1, 9, 0, 0))]).await.unwrap();
        sink.send(Level::Info, &[record("two", ts(1, 9, 0, 1))]).await.unwrap();

        let text = std::fs::read_to_string(root.path().join("logs/info/2024-12-01.log")).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": one"));
        assert!(lines[1].ends_with(": two"));
    }

    #[tokio::test]
    async fn batch_straddling_midnight_splits_files() {
        let root = tempfile::tempdir().unwrap();
        let sink = sink(root.path());

        let batch = [record("late", ts(1, 23, 59, 59)), record("early", ts(2, 0, 0, 0))];
        sink.send(Level::Info, &batch).await.unwrap();

        let first = std::fs::read_to_string(root.path().join("logs/info/2024-12-01.log")).unwrap();
        let second = std::fs::read_to_string(root.path().join("logs/info/2024-12-02.log")).unwrap();
        assert!(first.contains("late") && !first.contains("early"));
        assert!(second.contains("early") && !second.contains("late"));
    }

    #[tokio::test]
    async fn failure_on_the_second_day_reports_the_written_prefix() {
        let root = tempfile::tempdir().unwrap();
        let sink = sink(root.path());
        std::fs::create_dir_all(root.path().join("logs/info/2024-12-02.log")).unwrap();

        let batch = [
            record("late", ts(1, 23, 59, 58)),
            record("later", ts(1, 23, 59, 59)),
            record("early", ts(2, 0, 0, 0)),
        ];
        let err = sink.send(Level::Info, &batch).await.unwrap_err();
        let partial = err.downcast_ref::<PartialWrite>().expect("partial write");
        assert_eq!(partial.written, 2);

        let first = std::fs::read_to_string(root.path().join("logs/info/2024-12-01.log")).unwrap();
        assert_eq!(first.lines().count(), 2);
    }

    #[tokio::test]
    async fn failure_before_any_write_is_not_partial() {
        let root = tempfile::tempdir().unwrap();
        let sink = sink(root.path());
        std::fs::create_dir_all(root.path().join("logs/info/2024-12-01.log")).unwrap();

        let err = sink.send(Level::Info, &[record("lost", ts(1, 9, 0, 0))]).await.unwrap_err();
        assert!(err.downcast_ref::<PartialWrite>().is_none());
    }

    #[test]
    fn shares_the_router_lock() {
        let root = tempfile::tempdir().unwrap();
        let sink = sink(root.path());
        let lock = sink.flush_lock().expect("file sinks share their router lock");
        assert!(Arc::ptr_eq(&lock, &sink.router().flush_lock()));
    }
}
