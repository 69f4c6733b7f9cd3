use crate::record::LogEvent;
use tokio::sync::mpsc;

/// Create the unbounded multi-producer / single-consumer ingestion queue.
///
/// Producers may live on any thread (tokio or not); `enqueue` never blocks.
/// Events from one producer thread come out in the order they went in.
pub fn ingestion_queue() -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueProducer { tx }, QueueConsumer { rx })
}

#[derive(Clone, Debug)]
pub struct QueueProducer {
    tx: mpsc::UnboundedSender<LogEvent>,
}

impl QueueProducer {
    /// Append `event` to the tail. Returns `false` only when the consumer
    /// is gone, in which case the event is discarded.
    pub fn enqueue(&self, event: LogEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Debug)]
pub struct QueueConsumer {
    rx: mpsc::UnboundedReceiver<LogEvent>,
}

impl QueueConsumer {
    /// Remove and return every event queued at the time of the call.
    ///
    /// Events that arrive while draining stay queued for the next call,
    /// so a flood of producers cannot keep one drain running forever.
    pub fn drain_all(&mut self) -> Vec<LogEvent> {
        let pending = self.rx.len();
        let mut batch = Vec::with_capacity(pending);
        while batch.len() < pending {
            match self.rx.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}
