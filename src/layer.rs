use crate::callsite::{origin_of, render_error, CallSite};
use crate::logger::Logger;
use crate::record::{Level, LogEvent};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate never go back into the logger.
fn is_own_target(target: &str) -> bool {
    const CRATE: &str = env!("CARGO_CRATE_NAME");
    match target.strip_prefix(CRATE) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// `tracing_subscriber` layer that forwards events to a daily [`Logger`].
///
/// `ERROR` events go to the error sink; `WARN` and `INFO` go to the info
/// sink; `DEBUG` and `TRACE` are ignored. The enclosing span name, if any,
/// stands in for the method name of the call site.
pub struct DailyLogLayer {
    logger: Arc<Logger>,
}

impl DailyLogLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        DailyLogLayer { logger }
    }
}

impl<S> Layer<S> for DailyLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }
        let Some(level) = Level::from_tracing(meta.level()) else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let method = ctx.event_span(event).map(|span| span.name()).unwrap_or("-");
        let caller = CallSite::new(
            meta.module_path().unwrap_or(meta.target()),
            method,
            meta.file().unwrap_or("-"),
            meta.line().unwrap_or(0),
        );

        let message = visitor.message();
        let event = match level {
            Level::Info => LogEvent::info(message, Some(caller)),
            Level::Error => {
                let site = visitor.origin.unwrap_or(caller);
                LogEvent::error(message, visitor.exception, Some(site))
            }
        };
        self.logger.submit(event);
    }
}

#[derive(Default)]
pub struct FieldVisitor {
    pub fields: BTreeMap<String, serde_json::Value>,
    pub message: Option<String>,
    pub exception: Option<String>,
    pub origin: Option<CallSite>,
}

impl FieldVisitor {
    /// The `message` field followed by the other fields as `key=value`.
    pub fn message(&self) -> String {
        let mut out = self.message.clone().unwrap_or_default();
        for (key, value) in &self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            match value {
                serde_json::Value::String(s) => out.push_str(&format!("{key}={s}")),
                other => out.push_str(&format!("{key}={other}")),
            }
        }
        out
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.exception = Some(render_error(value));
        self.origin = origin_of(value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::LoggerConfig;
    use crate::located;
    use crate::record::LogRecord;
    use crate::sink::LogSink;
    use async_trait::async_trait;
    use std::error::Error;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[derive(Default)]
    struct CaptureSink {
        records: Mutex<Vec<LogRecord>>,
    }

    #[async_trait]
    impl LogSink for CaptureSink {
        async fn send(&self, _level: Level, records: &[LogRecord]) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.records.lock().unwrap().extend_from_slice(records);
            Ok(())
        }
    }

    fn capture(expected: usize, emit: impl FnOnce()) -> Vec<LogRecord> {
        let sink = Arc::new(CaptureSink::default());
        let logger = Arc::new(
            Logger::start_with_sink(&LoggerConfig::default(), sink.clone(), Arc::new(SystemClock)).unwrap(),
        );
        let subscriber = Registry::default().with(DailyLogLayer::new(Arc::clone(&logger)));
        tracing::subscriber::with_default(subscriber, emit);

        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.records.lock().unwrap().len() < expected && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        let records = sink.records.lock().unwrap().clone();
        records
    }

    #[test]
    fn own_diagnostics_are_not_forwarded() {
        assert!(is_own_target("daily_log_sink"));
        assert!(is_own_target("daily_log_sink::flusher"));
        assert!(!is_own_target("daily_log_sink_other"));
        assert!(!is_own_target("app"));
    }

    #[test]
    fn routes_tracing_levels() {
        let records = capture(3, || {
            tracing::info!(target: "app", "started");
            tracing::warn!(target: "app", "slow");
            tracing::debug!(target: "app", "ignored");
            tracing::error!(target: "app", "broken");
        });

        let seen: Vec<_> = records.iter().map(|r| (r.level, r.message.as_str())).collect();
        assert_eq!(
            seen,
            [(Level::Info, "started"), (Level::Info, "slow"), (Level::Error, "broken")]
        );
    }

    #[test]
    fn fields_are_appended_to_the_message() {
        let records = capture(1, || {
            tracing::info!(target: "app", user = "alice", attempts = 3, "logged in");
        });

        assert_eq!(records[0].message, "logged in attempts=3 user=alice");
        let site = records[0].call_site.unwrap();
        assert!(site.file.ends_with("layer.rs"));
        assert!(site.line > 0);
    }

    #[test]
    fn recorded_errors_become_exceptions_with_origin() {
        fn fetch() -> Result<(), crate::Located> {
            Err(located!("connection reset"))
        }

        let records = capture(1, || {
            let err = fetch().unwrap_err();
            tracing::error!(target: "app", error = &err as &(dyn Error + 'static), "fetch failed");
        });

        let record = &records[0];
        assert_eq!(record.level, Level::Error);
        assert!(record.exception.as_deref().unwrap().starts_with("connection reset"));
        assert_eq!(record.call_site.unwrap().method, "fetch");
    }

    #[test]
    fn span_name_stands_in_for_method() {
        let records = capture(1, || {
            let span = tracing::info_span!(target: "app", "checkout");
            let _entered = span.enter();
            tracing::info!(target: "app", "paid");
        });

        assert_eq!(records[0].call_site.unwrap().method, "checkout");
    }
}
