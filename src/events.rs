//! Detection event log
//!
//! One JSON object per line on stdout, prefixed with a bracketed tag:
//!
//! ```text
//! [bot-analysis] {"timestamp":"2024-01-01T00:00:00.000Z","ip":"1.2.3.4",...}
//! ```
//!
//! Every record carries an ISO-8601 UTC `timestamp` and the client `ip`.
//! Sink failures are swallowed; the detection pipeline never fails
//! because a log line could not be written.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Writer for tagged detection events.
///
/// Cheap to clone and share; holds no state beyond the sink choice.
#[derive(Debug, Clone, Default)]
pub struct EventLog;

impl EventLog {
    pub fn new() -> Self {
        Self
    }

    /// Emit one event line. `fields` must be a JSON object; `timestamp`
    /// and `ip` are stamped into it before writing.
    pub fn emit(&self, tag: &str, ip: &str, fields: Value) {
        let mut record = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };

        record.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert("ip".to_string(), Value::String(ip.to_string()));

        let line = Value::Object(record).to_string();

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "[{}] {}", tag, line);
    }
}
