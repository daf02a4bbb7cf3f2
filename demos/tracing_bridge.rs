use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use http_log_batch::init::{init_tracing_with_config, LayerConfig};
use http_log_batch::noop_sink::NoopSink;
use http_log_batch::{BatchLogger, Dispatcher, LogConfig};

/// Routes ordinary `tracing` macros through the batching logger. Uses
/// [`NoopSink`] so it runs without an endpoint.
#[tokio::main]
async fn main() {
    let config = LogConfig {
        batch_mode_enabled: true,
        ..LogConfig::default()
    };
    let logger = BatchLogger::new(Arc::new(config), Dispatcher::new(Arc::new(NoopSink)));

    let handle = init_tracing_with_config(
        logger.clone(),
        LayerConfig {
            flush_interval: Some(Duration::from_millis(200)),
            ..LayerConfig::default()
        },
    )
    .expect("install global subscriber");

    info!("starting service");
    warn!(queue_depth = 917, "queue is backing up");
    error!(user_id = 42, reason = "invalid password", "authentication failed");

    sleep(Duration::from_millis(500)).await;
    handle.flush();
    println!("{:?}", logger.dispatcher().stats());
}
