use crate::config::LogConfig;
use crate::record::LogRecord;
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;

/// Turns [`LogRecord`]s into the JSON object text the ingestion endpoint
/// expects.
///
/// Member order is fixed: `host`, `level`, `datetime`, `message`. `host`
/// and `level` are left out entirely when they don't apply; nothing is
/// ever emitted as `null`. Members are separated by `", "` and keys from
/// values by `": "`.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: Arc<LogConfig>,
}

impl Encoder {
    pub fn new(config: Arc<LogConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn encode(&self, record: &LogRecord) -> String {
        let datetime = self.render_timestamp(record);
        let mut members: Vec<(&str, &str)> = Vec::with_capacity(4);
        if self.config.emits_host() {
            members.push(("host", &self.config.hostname));
        }
        if !record.level().is_empty() {
            members.push(("level", record.level()));
        }
        members.push(("datetime", &datetime));
        members.push(("message", record.message()));

        let mut out = String::with_capacity(64 + record.message().len());
        out.push('{');
        for (i, (key, value)) in members.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            push_json_str(&mut out, key);
            out.push_str(": ");
            push_json_str(&mut out, value);
        }
        out.push('}');
        out
    }

    fn render_timestamp(&self, record: &LogRecord) -> String {
        let mut rendered = String::new();
        // chrono reports a bad format string through fmt::Error
        if write!(rendered, "{}", record.timestamp().format(&self.config.date_format)).is_err() {
            rendered.clear();
            let _ = write!(
                rendered,
                "{}",
                record.timestamp().format(crate::config::DEFAULT_DATE_FORMAT)
            );
        }
        rendered
    }
}

fn push_json_str(out: &mut String, value: &str) {
    // Display for Value produces compact, escaped JSON and cannot fail.
    let _ = write!(out, "{}", Value::from(value));
}
