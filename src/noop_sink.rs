use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops all payloads.
///
/// Useful for measuring the overhead of encoding and batching without any
/// external I/O, and for unit tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _payload: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
