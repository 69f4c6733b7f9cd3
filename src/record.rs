use crate::callsite::CallSite;
use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

/// Severity of a log event. Each level is routed to its own sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    /// Logical sink name used for configuration lookup.
    pub fn sink_name(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Error => "error",
        }
    }

    /// Map a `tracing` level onto a sink. `DEBUG` and `TRACE` have none.
    pub fn from_tracing(level: &tracing::Level) -> Option<Self> {
        if *level == tracing::Level::ERROR {
            Some(Level::Error)
        } else if *level == tracing::Level::WARN || *level == tracing::Level::INFO {
            Some(Level::Info)
        } else {
            None
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "Info",
            Level::Error => "Error",
        })
    }
}

/// One log occurrence as handed over by a producer.
///
/// The message is already formatted and the exception already rendered,
/// so the flusher never runs caller code.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    level: Level,
    message: String,
    exception: Option<String>,
    call_site: Option<CallSite>,
}

impl LogEvent {
    pub fn info(message: String, call_site: Option<CallSite>) -> Self {
        LogEvent {
            level: Level::Info,
            message,
            exception: None,
            call_site,
        }
    }

    pub fn error(message: String, exception: Option<String>, call_site: Option<CallSite>) -> Self {
        LogEvent {
            level: Level::Error,
            message,
            exception,
            call_site,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    pub fn call_site(&self) -> Option<CallSite> {
        self.call_site
    }
}

/// On-disk layout of a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineFormat {
    /// `{timestamp} [{level}] [{type}] [{line}] {method} : {message}`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// A [`LogEvent`] stamped with the time it is written.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub level: Level,
    pub call_site: Option<CallSite>,
    pub message: String,
    pub exception: Option<String>,
}

impl LogRecord {
    pub fn stamp(event: LogEvent, timestamp: NaiveDateTime) -> Self {
        LogRecord {
            timestamp,
            level: event.level,
            call_site: event.call_site,
            message: event.message,
            exception: event.exception,
        }
    }

    /// Render the record as one line, without the trailing newline.
    pub fn render(&self, format: LineFormat) -> String {
        match format {
            LineFormat::Text => self.render_text(),
            LineFormat::Json => serde_json::to_string(self).unwrap_or_else(|_| self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let site = self.call_site.unwrap_or_else(CallSite::unknown);
        let mut line = format!(
            "{} [{}] [{}] [{}] {} : {}",
            format_timestamp(&self.timestamp),
            self.level,
            site.declaring_type,
            site.line,
            site.method,
            self.message
        );
        if let Some(exception) = &self.exception {
            line.push(' ');
            line.push_str(exception);
        }
        line
    }
}

/// `yyyy-MM-dd HH:mm:ss.ffff`
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    // Leap seconds report nanos past 1e9.
    let ten_thousandths = (ts.nanosecond() % 1_000_000_000) / 100_000;
    format!("{}.{:04}", ts.format("%Y-%m-%d %H:%M:%S"), ten_thousandths)
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_micro_opt(h, m, s, micro))
            .unwrap()
    }

    #[test]
    fn timestamp_has_four_fractional_digits() {
        assert_eq!(format_timestamp(&at(7, 5, 3, 123_456)), "2024-03-09 07:05:03.1234");
        assert_eq!(format_timestamp(&at(23, 59, 59, 0)), "2024-03-09 23:59:59.0000");
    }

    #[test]
    fn renders_text_line_with_call_site() {
        let site = CallSite::new("app::auth::Login", "submit", "src/auth.rs", 42);
        let event = LogEvent::info("user alice logged in".to_string(), Some(site));
        let record = LogRecord::stamp(event, at(10, 0, 0, 500));

        assert_eq!(
            record.render(LineFormat::Text),
            "2024-03-09 10:00:00.0005 [Info] [app::auth::Login] [42] submit : user alice logged in"
        );
    }

    #[test]
    fn error_lines_carry_exception_details() {
        let event = LogEvent::error("failed op".to_string(), Some("boom".to_string()), None);
        let line = LogRecord::stamp(event, at(1, 2, 3, 0)).render(LineFormat::Text);

        assert_eq!(line, "2024-03-09 01:02:03.0000 [Error] [-] [0] - : failed op boom");
    }

    #[test]
    fn json_lines_are_single_objects() {
        let event = LogEvent::error("x".to_string(), None, None);
        let line = LogRecord::stamp(event, at(1, 2, 3, 0)).render(LineFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["level"], "Error");
        assert_eq!(value["timestamp"], "2024-03-09 01:02:03.0000");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn tracing_levels_map_onto_two_sinks() {
        assert_eq!(Level::from_tracing(&tracing::Level::ERROR), Some(Level::Error));
        assert_eq!(Level::from_tracing(&tracing::Level::WARN), Some(Level::Info));
        assert_eq!(Level::from_tracing(&tracing::Level::INFO), Some(Level::Info));
        assert_eq!(Level::from_tracing(&tracing::Level::DEBUG), None);
    }
}
