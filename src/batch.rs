use crate::dispatch::Dispatcher;
use crate::encoder::Encoder;
use crate::record::LogRecord;
use std::collections::HashSet;
use tracing::debug;

/// Ordered cache of records awaiting one combined delivery.
///
/// The batch itself does no locking; share it behind a `Mutex` if more
/// than one thread appends to it.
#[derive(Debug, Clone, Default)]
pub struct LogBatch {
    entries: Vec<LogRecord>,
}

impl LogBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: LogRecord) {
        self.entries.push(record);
    }

    /// Pending records, in insertion order.
    pub fn entries(&self) -> &[LogRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Encode, de-duplicate and dispatch every pending record, then empty
    /// the batch.
    ///
    /// Records whose encoded JSON is byte-identical are sent once; the
    /// first occurrence keeps its position. An empty batch dispatches
    /// nothing. The batch is cleared whatever happens to the send.
    pub fn flush(&mut self, encoder: &Encoder, dispatcher: &Dispatcher) {
        let payloads = dedup_encoded(self.entries.iter().map(|r| encoder.encode(r)));
        if !payloads.is_empty() {
            debug!(
                records = self.entries.len(),
                unique = payloads.len(),
                "flushing log batch"
            );
            dispatcher.send_logs(payloads);
        }
        self.entries.clear();
    }
}

fn dedup_encoded(encoded: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    encoded.filter(|e| seen.insert(e.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::noop_sink::NoopSink;
    use chrono::{DateTime, FixedOffset};
    use std::sync::Arc;

    fn t0() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-02T03:04:05.006+00:00").unwrap()
    }

    fn parts() -> (Encoder, Dispatcher) {
        (
            Encoder::new(Arc::new(LogConfig::default())),
            Dispatcher::new(Arc::new(NoopSink)),
        )
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let input = ["b", "a", "b", "c", "a"].map(String::from);
        assert_eq!(dedup_encoded(input.into_iter()), vec!["b", "a", "c"]);
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut batch = LogBatch::new();
        for msg in ["r1", "r2", "r3"] {
            batch.add(LogRecord::with_parts(msg, Some(t0()), None));
        }
        let messages: Vec<&str> = batch.entries().iter().map(|r| r.message()).collect();
        assert_eq!(messages, ["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn flush_on_empty_batch_never_dispatches() {
        let (encoder, dispatcher) = parts();
        let mut batch = LogBatch::new();
        batch.flush(&encoder, &dispatcher);
        batch.flush(&encoder, &dispatcher);
        assert_eq!(dispatcher.stats().dispatched, 0);
    }

    #[tokio::test]
    async fn flush_clears_and_dispatches_once() {
        let (encoder, dispatcher) = parts();
        let mut batch = LogBatch::new();
        batch.add(LogRecord::with_parts("a", Some(t0()), None));
        batch.add(LogRecord::with_parts("b", Some(t0()), None));

        batch.flush(&encoder, &dispatcher);

        assert!(batch.is_empty());
        assert_eq!(dispatcher.stats().dispatched, 1);
    }

    #[test]
    fn flush_clears_even_when_scheduling_fails() {
        // No tokio runtime here, so the send cannot be scheduled.
        let (encoder, dispatcher) = parts();
        let mut batch = LogBatch::new();
        batch.add(LogRecord::new("lost"));

        batch.flush(&encoder, &dispatcher);

        assert!(batch.is_empty());
        assert_eq!(dispatcher.stats().failed, 1);
    }
}
