use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for encoded log payloads produced by the
/// [`Dispatcher`](crate::dispatch::Dispatcher).
///
/// Implementations are responsible for transporting one JSON array body
/// to a concrete backend (the HTTP ingestion endpoint, a test recorder,
/// nothing at all). The dispatcher calls `send` from a detached task and
/// never awaits it on the application thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Deliver a single payload.
    ///
    /// **Parameters**
    /// - `payload`: a JSON array literal such as `[{...},{...}]`, already
    ///   built by the dispatcher. It must be sent verbatim.
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the payload.
    /// - `Err(..)` if the backend failed (network error, HTTP status,
    ///   etc.). The dispatcher logs the error and drops the payload; it
    ///   never retries.
    async fn send(&self, payload: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}
