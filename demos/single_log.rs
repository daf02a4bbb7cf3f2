use std::sync::Arc;
use tokio::time::{sleep, Duration};

use http_log_batch::env::{env_or, profile_var, ENDPOINT_URL_SUFFIX};
use http_log_batch::{BatchLogger, LogConfig};

/// Ships each record on its own. Point it at any endpoint accepting JSON:
///
/// LOG_BATCH_DEMO_ENDPOINT_URL=http://127.0.0.1:8080/ingest cargo run --example single_log
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = LogConfig {
        endpoint_url: env_or(
            &profile_var("demo", ENDPOINT_URL_SUFFIX),
            "http://127.0.0.1:8080/ingest",
        ),
        ..LogConfig::default()
    };
    let logger = BatchLogger::with_http(Arc::new(config));

    logger.single_log("service started", None, None, None);
    logger.single_log("authentication failed", None, Some("ERROR"), None);

    // Sends are detached; give them a moment before the runtime shuts down.
    sleep(Duration::from_secs(1)).await;
    println!("{:?}", logger.dispatcher().stats());
}
