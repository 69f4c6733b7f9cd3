//! The single background consumer.
//!
//! One [`BackgroundFlusher`] runs per [`Logger`](crate::logger::Logger) on a
//! dedicated thread. Each flush cycle waits for the wake signal, takes the
//! flush lock, drains the whole queue, writes the info and error batches
//! through the sink, resets the signal and pauses briefly. A failed or
//! panicking write drops that batch and the loop carries on.

use crate::clock::Clock;
use crate::logger::LoggerStats;
use crate::queue::QueueConsumer;
use crate::record::{Level, LogRecord};
use crate::signal::WakeSignal;
use crate::sink::{LogSink, PartialWrite};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Where the flusher currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlusherState {
    Waiting = 0,
    Draining = 1,
    Writing = 2,
    IdleSleep = 3,
    Stopped = 4,
}

impl FlusherState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => FlusherState::Waiting,
            1 => FlusherState::Draining,
            2 => FlusherState::Writing,
            3 => FlusherState::IdleSleep,
            _ => FlusherState::Stopped,
        }
    }
}

/// Exclusive guard around the file-writing section of a flush cycle.
///
/// Anything that writes through the sink must hold this, so that two
/// writers never interleave lines in the same file. Sinks hand out a shared
/// instance through [`LogSink::flush_lock`].
#[derive(Debug, Default)]
pub struct FlushLock(Mutex<()>);

impl FlushLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }

    /// Acquire from synchronous code. Panics inside an async context.
    pub fn blocking_acquire(&self) -> MutexGuard<'_, ()> {
        self.0.blocking_lock()
    }
}

/// State shared between the producer handle and its flusher.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) signal: WakeSignal,
    pub(crate) stop: AtomicBool,
    pub(crate) stats: LoggerStats,
    state: AtomicU8,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Shared {
            signal: WakeSignal::new(),
            stop: AtomicBool::new(false),
            stats: LoggerStats::default(),
            state: AtomicU8::new(FlusherState::Waiting as u8),
        }
    }

    pub(crate) fn state(&self) -> FlusherState {
        FlusherState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: FlusherState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

pub(crate) struct BackgroundFlusher {
    consumer: QueueConsumer,
    shared: Arc<Shared>,
    lock: Arc<FlushLock>,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    idle_pause: Duration,
}

impl BackgroundFlusher {
    pub(crate) fn new(
        consumer: QueueConsumer,
        shared: Arc<Shared>,
        sink: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
        idle_pause: Duration,
    ) -> Self {
        let lock = sink.flush_lock().unwrap_or_default();
        BackgroundFlusher {
            consumer,
            shared,
            lock,
            sink,
            clock,
            idle_pause,
        }
    }

    /// Run until the owning logger asks to stop. The process-wide logger
    /// never does, so for it this loop lives as long as the process.
    pub(crate) async fn run(mut self) {
        loop {
            self.shared.set_state(FlusherState::Waiting);
            self.shared.signal.wait_until_set().await;

            loop {
                self.flush_cycle().await;
                self.shared.signal.reset();

                if self.shared.stop.load(Ordering::SeqCst) {
                    while !self.consumer.is_empty() {
                        self.flush_cycle().await;
                    }
                    self.shared.set_state(FlusherState::Stopped);
                    return;
                }

                self.shared.set_state(FlusherState::IdleSleep);
                tokio::time::sleep(self.idle_pause).await;

                // A set() that raced with reset() was cleared, so the queue
                // itself decides whether to go round again.
                if self.consumer.is_empty() {
                    break;
                }
            }
        }
    }

    /// Drain everything queued and write it. Never fails.
    pub(crate) async fn flush_cycle(&mut self) {
        let _guard = self.lock.acquire().await;

        self.shared.set_state(FlusherState::Draining);
        let events = self.consumer.drain_all();
        if events.is_empty() {
            return;
        }

        self.shared.set_state(FlusherState::Writing);
        let mut infos = Vec::new();
        let mut errors = Vec::new();
        // Wall time may step back mid-batch; stamps within a batch may not.
        let mut stamp = self.clock.now();
        for event in events {
            stamp = stamp.max(self.clock.now());
            let record = LogRecord::stamp(event, stamp);
            match record.level {
                Level::Info => infos.push(record),
                Level::Error => errors.push(record),
            }
        }

        debug!(info = infos.len(), error = errors.len(), "flushing log batch");
        if !infos.is_empty() {
            self.write(Level::Info, infos).await;
        }
        if !errors.is_empty() {
            self.write(Level::Error, errors).await;
        }
    }

    async fn write(&self, level: Level, records: Vec<LogRecord>) {
        let count = records.len() as u64;
        let sink = Arc::clone(&self.sink);
        let outcome = tokio::spawn(async move { sink.send(level, &records).await }).await;

        let stats = &self.shared.stats;
        match outcome {
            Ok(Ok(())) => {
                stats.written.fetch_add(count, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                let written = e
                    .downcast_ref::<PartialWrite>()
                    .map_or(0, |partial| partial.written as u64)
                    .min(count);
                stats.written.fetch_add(written, Ordering::Relaxed);
                stats.dropped.fetch_add(count - written, Ordering::Relaxed);
                stats.failed_flushes.fetch_add(1, Ordering::Relaxed);
                warn!(%level, written, dropped = count - written, error = %e, "log flush failed, dropping batch");
            }
            Err(e) => {
                stats.dropped.fetch_add(count, Ordering::Relaxed);
                stats.failed_flushes.fetch_add(1, Ordering::Relaxed);
                warn!(%level, dropped = count, error = %e, "log sink panicked, dropping batch");
            }
        }
    }
}
