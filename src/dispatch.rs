use crate::error::DispatchError;
use crate::fault::{FaultInjector, NoFaults};
use crate::sink::LogSink;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error};

/// Fire-and-forget sender for encoded log records.
///
/// Every [`Dispatcher::send_logs`] call with at least one record results
/// in exactly one [`LogSink::send`] on a detached tokio task. The caller
/// gets no completion signal: failures are logged through `tracing` and
/// dropped, and nothing is retried.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn LogSink>,
    faults: Arc<dyn FaultInjector>,
    runtime: Option<Handle>,
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of the dispatcher counters.
///
/// `dispatched` is bumped synchronously inside `send_logs`; `delivered`
/// and `failed` once the background send settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl DispatchStats {
    pub fn settled(&self) -> u64 {
        self.delivered + self.failed
    }
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Dispatcher {
            sink,
            faults: Arc::new(NoFaults),
            runtime: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Replace the fault injector consulted before each send.
    pub fn with_fault_injector(mut self, faults: Arc<dyn FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    /// Spawn sends on `runtime` instead of the ambient one, so callers
    /// outside any tokio context can still log.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Ship `payloads` as one JSON array.
    ///
    /// Each item must already be an encoded JSON object. An empty input
    /// sends nothing. Returns as soon as the send is scheduled.
    pub fn send_logs<I>(&self, payloads: I)
    where
        I: IntoIterator<Item = String>,
    {
        let payloads: Vec<String> = payloads.into_iter().collect();
        if payloads.is_empty() {
            return;
        }

        let records = payloads.len();
        let body = json_array(&payloads);
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            report_failure(&self.counters, records, DispatchError::NoRuntime);
            return;
        };

        let sink = Arc::clone(&self.sink);
        let faults = Arc::clone(&self.faults);
        let counters = Arc::clone(&self.counters);
        runtime.spawn(async move {
            let result = if faults.should_fail() {
                Err(DispatchError::InjectedFailure)
            } else {
                sink.send(&body).await.map_err(into_dispatch_error)
            };

            match result {
                Ok(()) => {
                    counters.delivered.fetch_add(1, Ordering::Relaxed);
                    debug!(records, "log batch delivered");
                }
                Err(e) => report_failure(&counters, records, e),
            }
        });
    }
}

/// Join encoded objects into a JSON array literal: `[a,b,c]`.
///
/// This is plain text concatenation; items are not re-parsed.
pub fn json_array(payloads: &[String]) -> String {
    let inner: usize = payloads.iter().map(String::len).sum();
    let mut body = String::with_capacity(inner + payloads.len() + 1);
    body.push('[');
    body.push_str(&payloads.join(","));
    body.push(']');
    body
}

fn into_dispatch_error(e: Box<dyn Error + Send + Sync>) -> DispatchError {
    match e.downcast::<DispatchError>() {
        Ok(e) => *e,
        Err(other) => DispatchError::Transport(other),
    }
}

fn report_failure(counters: &Counters, records: usize, e: DispatchError) {
    counters.failed.fetch_add(1, Ordering::Relaxed);
    error!(records, error = %e, "dropping log batch");
}
