//! Operator event journal.
//!
//! Distinct from the crate's `tracing` diagnostics: the journal is an
//! operator-facing product surface whose line format is pinned for
//! downstream tooling:
//!
//! ```text
//! 2025-07-15T14:23:01.001Z [WARN ] [NETWORK   ] EVT_SEQ_GAP         src_id=1 gap=3
//! ```
//!
//! Severity is padded to 5 characters, category to 10, event name truncated
//! or padded to 20. The timestamp is UTC, ISO 8601, millisecond precision.
//!
//! A mutex serializes writes to the sink; the sink itself is caller-owned
//! and swappable via [`Journal::set_output`].

use crate::events::{EventCategory, Severity};
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use std::sync::Mutex;

const EVENT_NAME_WIDTH: usize = 20;

struct JournalInner {
    level: Severity,
    out: Box<dyn Write + Send>,
}

/// Severity-filtered, mutex-serialized event log.
pub struct Journal {
    inner: Mutex<JournalInner>,
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal {
    /// A journal writing to stdout at INFO level.
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    /// A journal writing to the given sink at INFO level.
    pub fn with_output(out: Box<dyn Write + Send>) -> Self {
        Self { inner: Mutex::new(JournalInner { level: Severity::Info, out }) }
    }

    pub fn set_level(&self, level: Severity) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).level = level;
    }

    pub fn level(&self) -> Severity {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).level
    }

    /// Replace the output sink.
    pub fn set_output(&self, out: Box<dyn Write + Send>) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).out = out;
    }

    /// Write one journal line, unless filtered by the current level.
    pub fn log(&self, severity: Severity, category: EventCategory, event_name: &str, detail: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if severity < inner.level {
            return;
        }
        let line = format_line(Utc::now(), severity, category, event_name, detail);
        // A failing sink must not take the ingest path down with it.
        let _ = inner.out.write_all(line.as_bytes());
        let _ = inner.out.flush();
    }
}

/// Render one journal line. Split out from [`Journal::log`] so the format
/// can be pinned by tests with a fixed timestamp.
pub fn format_line(
    timestamp: DateTime<Utc>,
    severity: Severity,
    category: EventCategory,
    event_name: &str,
    detail: &str,
) -> String {
    let mut name = String::with_capacity(EVENT_NAME_WIDTH);
    for c in event_name.chars().take(EVENT_NAME_WIDTH) {
        name.push(c);
    }
    while name.len() < EVENT_NAME_WIDTH {
        name.push(' ');
    }

    format!(
        "{} [{}] [{}] {}{}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        severity.padded_label(),
        category.padded_label(),
        name,
        detail,
    )
}
