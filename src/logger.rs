use crate::callsite::{origin_of, render_error, CallSite};
use crate::clock::{Clock, SystemClock};
use crate::config::LoggerConfig;
use crate::error::{Error, Result};
use crate::file_sink::DailyFileSink;
use crate::flusher::{BackgroundFlusher, FlusherState, Shared};
use crate::queue::{ingestion_queue, QueueProducer};
use crate::record::LogEvent;
use crate::router::FileRouter;
use crate::sink::LogSink;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

/// Name of the dedicated flusher thread.
pub const FLUSHER_THREAD_NAME: &str = "daily-log-flusher";

/// `None` once a lazy start has failed, so it is not retried per call.
static GLOBAL: OnceLock<Option<Arc<Logger>>> = OnceLock::new();

/// Counters maintained by a [`Logger`] and its flusher.
#[derive(Clone, Debug, Default)]
pub struct LoggerStats {
    /// Events accepted onto the queue.
    pub enqueued: Arc<AtomicU64>,
    /// Events written by the sink.
    pub written: Arc<AtomicU64>,
    /// Events lost, either in a failed flush or after the flusher stopped.
    pub dropped: Arc<AtomicU64>,
    /// Sink writes that failed or panicked.
    pub failed_flushes: Arc<AtomicU64>,
}

/// Producer handle of a running daily logger.
///
/// Every logging call formats nothing and touches no file: it pushes the
/// event onto the queue, sets the wake signal and returns. A single
/// background thread, started by [`Logger::start`], does the writing.
///
/// Dropping the handle (or calling [`Logger::shutdown`]) flushes whatever
/// is still queued and stops that thread.
pub struct Logger {
    producer: QueueProducer,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Logger {
    /// Start a logger writing daily files into the directories of `router`.
    pub fn start(config: &LoggerConfig, router: FileRouter) -> Result<Self> {
        let sink = Arc::new(DailyFileSink::new(router, config.line_format));
        Self::start_with_sink(config, sink, Arc::new(SystemClock))
    }

    /// Start a logger with an arbitrary sink and clock.
    ///
    /// **Errors**
    /// - [`Error::Runtime`] if the flusher runtime cannot be built.
    /// - [`Error::Spawn`] if the flusher thread cannot be spawned.
    pub fn start_with_sink(
        config: &LoggerConfig,
        sink: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let (producer, consumer) = ingestion_queue();
        let shared = Arc::new(Shared::new());
        let flusher = BackgroundFlusher::new(
            consumer,
            Arc::clone(&shared),
            sink,
            clock,
            config.effective_idle_pause(),
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        let worker = std::thread::Builder::new()
            .name(FLUSHER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(flusher.run()))
            .map_err(Error::Spawn)?;

        Ok(Logger {
            producer,
            shared,
            worker: Some(worker),
        })
    }

    /// Queue an Info event.
    pub fn info(&self, call_site: CallSite, message: String) {
        self.submit(LogEvent::info(message, Some(call_site)));
    }

    /// Queue an Error event without an exception.
    pub fn error(&self, call_site: CallSite, message: String) {
        self.submit(LogEvent::error(message, None, Some(call_site)));
    }

    /// Queue an Error event carrying `err`.
    ///
    /// The event is attributed to the deepest [`Located`](crate::Located)
    /// origin in the error's source chain, falling back to `call_site`.
    pub fn error_with(&self, err: &(dyn StdError + 'static), call_site: CallSite, message: String) {
        let site = origin_of(err).unwrap_or(call_site);
        self.submit(LogEvent::error(message, Some(render_error(err)), Some(site)));
    }

    /// Queue a prepared event. Never blocks and never fails.
    pub fn submit(&self, event: LogEvent) {
        if self.producer.enqueue(event) {
            self.shared.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        } else {
            self.shared.stats.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.shared.signal.set();
    }

    pub fn stats(&self) -> &LoggerStats {
        &self.shared.stats
    }

    pub fn state(&self) -> FlusherState {
        self.shared.state()
    }

    /// Flush everything queued so far, then stop the flusher thread.
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.signal.set();
        if worker.join().is_err() {
            tracing::warn!("daily log flusher thread panicked");
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// Start the process-wide logger.
///
/// Call once during application start-up. The logger lives until the
/// process exits; its queue is never flushed on an abrupt exit.
///
/// **Errors**
/// - [`Error::AlreadyInitialized`] if `init` already ran or a logging call
///   already started (or failed to start) the logger lazily.
pub fn init(config: &LoggerConfig, router: FileRouter) -> Result<&'static Arc<Logger>> {
    if GLOBAL.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }
    let logger = Arc::new(Logger::start(config, router)?);
    GLOBAL.set(Some(logger)).map_err(|_| Error::AlreadyInitialized)?;
    GLOBAL.get().and_then(Option::as_ref).ok_or(Error::AlreadyInitialized)
}

/// The process-wide logger, started from the environment on first use
/// when [`init`] was never called.
///
/// Returns `None` if that lazy start failed; the failure is remembered and
/// later calls return `None` without trying again.
pub fn global() -> Option<&'static Arc<Logger>> {
    start_once(&GLOBAL, || {
        Logger::start(&LoggerConfig::from_env(), FileRouter::from_env())
    })
}

fn start_once(
    cell: &OnceLock<Option<Arc<Logger>>>,
    start: impl FnOnce() -> Result<Logger>,
) -> Option<&Arc<Logger>> {
    cell.get_or_init(|| match start() {
        Ok(logger) => Some(Arc::new(logger)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to start process-wide daily logger");
            None
        }
    })
    .as_ref()
}
