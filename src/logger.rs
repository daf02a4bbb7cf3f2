use crate::batch::LogBatch;
use crate::config::LogConfig;
use crate::dispatch::Dispatcher;
use crate::encoder::Encoder;
use crate::record::LogRecord;
use chrono::{DateTime, FixedOffset};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// What [`BatchLogger::single_log`] did with a record.
///
/// This describes routing only. Whether a sent record reached the
/// endpoint is never observable by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Encoded and handed to the dispatcher on its own.
    Sent,
    /// Appended to the caller's batch; delivered on the next flush.
    Batched,
    /// Batching is on but no batch was supplied, so the record was
    /// discarded.
    Dropped,
}

/// Entry point tying a resolved [`LogConfig`] to an [`Encoder`] and a
/// [`Dispatcher`].
///
/// Cheap to clone; clones share the dispatcher and the batch-mode flag.
#[derive(Clone)]
pub struct BatchLogger {
    encoder: Encoder,
    dispatcher: Dispatcher,
    batch_mode: Arc<AtomicBool>,
}

impl BatchLogger {
    pub fn new(config: Arc<LogConfig>, dispatcher: Dispatcher) -> Self {
        let batch_mode = Arc::new(AtomicBool::new(config.batch_mode_enabled));
        BatchLogger {
            encoder: Encoder::new(config),
            dispatcher,
            batch_mode,
        }
    }

    /// Logger posting to the configured endpoint over HTTP.
    #[cfg(feature = "http")]
    pub fn with_http(config: Arc<LogConfig>) -> Self {
        let sink = crate::http::HttpSink::new(config.endpoint_url.clone());
        Self::new(config, Dispatcher::new(Arc::new(sink)))
    }

    /// Resolve `config` (once) and build an HTTP logger from it.
    #[cfg(feature = "http")]
    pub fn from_lazy(config: &crate::config::LazyConfig) -> Self {
        Self::with_http(config.get())
    }

    pub fn config(&self) -> &LogConfig {
        self.encoder.config()
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn batch_mode(&self) -> bool {
        self.batch_mode.load(Ordering::SeqCst)
    }

    /// Switch batching on or off for subsequent calls. Records already
    /// sitting in a batch are unaffected.
    pub fn set_batch_mode(&self, enabled: bool) {
        self.batch_mode.store(enabled, Ordering::SeqCst);
    }

    /// Build a record, applying the configured default level when `level`
    /// is `None`.
    pub fn record(
        &self,
        message: impl Into<String>,
        timestamp: Option<DateTime<FixedOffset>>,
        level: Option<&str>,
    ) -> LogRecord {
        let level = level.unwrap_or(self.config().default_level.as_str());
        LogRecord::with_parts(message, timestamp, Some(level))
    }

    pub fn new_session(&self) -> Session {
        Session {
            logger: self.clone(),
            batch: LogBatch::new(),
        }
    }

    /// Log one record outside of a session.
    ///
    /// With batching off the record is sent immediately and `batch` is
    /// ignored. With batching on it is appended to `batch`, or dropped
    /// when there is no batch to append to.
    pub fn single_log(
        &self,
        message: impl Into<String>,
        timestamp: Option<DateTime<FixedOffset>>,
        level: Option<&str>,
        batch: Option<&mut LogBatch>,
    ) -> Disposition {
        let record = self.record(message, timestamp, level);
        if !self.batch_mode() {
            self.dispatcher.send_logs([self.encoder.encode(&record)]);
            return Disposition::Sent;
        }

        match batch {
            Some(batch) => {
                batch.add(record);
                Disposition::Batched
            }
            None => {
                debug!("batch mode enabled but no batch supplied, dropping log record");
                Disposition::Dropped
            }
        }
    }

    /// Flush a caller-held batch through this logger.
    pub fn flush(&self, batch: &mut LogBatch) {
        batch.flush(&self.encoder, &self.dispatcher);
    }
}

/// Caller-owned handle holding one [`LogBatch`].
///
/// Records accumulate until [`Session::flush`]; dropping a session
/// discards whatever was not flushed.
pub struct Session {
    logger: BatchLogger,
    batch: LogBatch,
}

impl Session {
    pub fn add(
        &mut self,
        message: impl Into<String>,
        timestamp: Option<DateTime<FixedOffset>>,
        level: Option<&str>,
    ) {
        let record = self.logger.record(message, timestamp, level);
        self.batch.add(record);
    }

    /// Route a record through [`BatchLogger::single_log`] with this
    /// session's batch.
    pub fn single_log(
        &mut self,
        message: impl Into<String>,
        timestamp: Option<DateTime<FixedOffset>>,
        level: Option<&str>,
    ) -> Disposition {
        self.logger
            .single_log(message, timestamp, level, Some(&mut self.batch))
    }

    pub fn flush(&mut self) {
        self.logger.flush(&mut self.batch);
    }

    pub fn batch(&self) -> &LogBatch {
        &self.batch
    }

    pub fn batch_mut(&mut self) -> &mut LogBatch {
        &mut self.batch
    }

    pub fn logger(&self) -> &BatchLogger {
        &self.logger
    }
}
