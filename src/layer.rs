use crate::batch::LogBatch;
use crate::logger::BatchLogger;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Targets whose events are never forwarded: this crate's own diagnostics
/// and the HTTP stack underneath the sink.
pub const INTERNAL_TARGETS: &[&str] = &[
    env!("CARGO_CRATE_NAME"),
    "reqwest",
    "hyper",
    "h2",
    "rustls",
];

/// `tracing_subscriber` layer that turns events into log records and
/// routes them through a [`BatchLogger`].
///
/// With batch mode off each event is shipped on its own. With batch mode
/// on, events accumulate in a batch shared with the [`LayerHandle`] and
/// go out when it is flushed.
pub struct RemoteLogLayer {
    logger: BatchLogger,
    batch: Arc<Mutex<LogBatch>>,
    min_level: Level,
    ignored_targets: Vec<String>,
    /// Total events seen by the layer (before filtering).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to the logger.
    pub forwarded_events: Arc<AtomicU64>,
}

/// Handle for flushing the layer's shared batch.
#[derive(Clone)]
pub struct LayerHandle {
    logger: BatchLogger,
    batch: Arc<Mutex<LogBatch>>,
}

impl LayerHandle {
    /// Number of records waiting in the shared batch.
    pub fn pending(&self) -> usize {
        lock(&self.batch).len()
    }

    /// Ship everything pending. The lock is released before encoding and
    /// dispatch, so diagnostics emitted by the flush can re-enter the layer.
    pub fn flush(&self) {
        let mut pending = std::mem::take(&mut *lock(&self.batch));
        self.logger.flush(&mut pending);
    }
}

fn lock(batch: &Mutex<LogBatch>) -> MutexGuard<'_, LogBatch> {
    // A panic mid-append leaves the Vec consistent, so poisoning is ignored.
    batch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RemoteLogLayer {
    /// Create a layer forwarding events at `min_level` or more severe.
    ///
    /// Events whose target starts with any of `ignored_targets` are
    /// skipped; pass [`INTERNAL_TARGETS`] unless there is a reason not to.
    /// This crate's own target is always skipped.
    pub fn new<I, S>(logger: BatchLogger, min_level: Level, ignored_targets: I) -> (Self, LayerHandle)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch = Arc::new(Mutex::new(LogBatch::new()));
        let handle = LayerHandle {
            logger: logger.clone(),
            batch: Arc::clone(&batch),
        };

        (
            Self {
                logger,
                batch,
                min_level,
                ignored_targets: ignored_targets.into_iter().map(Into::into).collect(),
                total_events: Arc::new(AtomicU64::new(0)),
                forwarded_events: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }

    fn is_ignored(&self, target: &str) -> bool {
        target.starts_with(env!("CARGO_CRATE_NAME"))
            || self.ignored_targets.iter().any(|t| target.starts_with(t.as_str()))
    }
}

impl<S> Layer<S> for RemoteLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.min_level || self.is_ignored(meta.target()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let level = meta.level().as_str();
        // Only hold the lock when appending: a direct send may itself emit
        // diagnostics that come back through this layer.
        if self.logger.batch_mode() {
            let mut batch = lock(&self.batch);
            self.logger
                .single_log(visitor.finish(), None, Some(level), Some(&mut *batch));
        } else {
            self.logger.single_log(visitor.finish(), None, Some(level), None);
        }
        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
    }
}

/// Collects the `message` field plus any other fields rendered as
/// trailing `key=value` pairs.
#[derive(Default)]
pub struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    pub fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, field: &Field, value: &dyn std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field, &value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field, &value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field, &value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field, &value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field, &format_args!("{:?}", value));
        }
    }
}
