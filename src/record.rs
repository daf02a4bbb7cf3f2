use chrono::{DateTime, FixedOffset, Local};

/// Level assigned to records created without an explicit one.
pub const DEFAULT_LEVEL: &str = "INFO";

/// A single log entry waiting to be encoded and shipped.
///
/// Records are immutable once built. The timestamp is always populated:
/// when the caller does not supply one, the current local time is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    message: String,
    timestamp: DateTime<FixedOffset>,
    level: String,
}

impl LogRecord {
    /// Build a record stamped with the current time and the default level.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_parts(message, None, None)
    }

    /// Build a record from optional parts.
    ///
    /// **Parameters**
    /// - `message`: raw log message, stored as-is.
    /// - `timestamp`: event time; `None` means "now".
    /// - `level`: severity; `None` falls back to [`DEFAULT_LEVEL`]. An
    ///   explicitly empty string is kept and later omitted by the encoder.
    pub fn with_parts(
        message: impl Into<String>,
        timestamp: Option<DateTime<FixedOffset>>,
        level: Option<&str>,
    ) -> Self {
        LogRecord {
            message: message.into(),
            timestamp: timestamp.unwrap_or_else(|| Local::now().fixed_offset()),
            level: level.unwrap_or(DEFAULT_LEVEL).to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn level(&self) -> &str {
        &self.level
    }
}
