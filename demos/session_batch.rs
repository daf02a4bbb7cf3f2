use std::time::Instant;
use tokio::time::{sleep, Duration};

use http_log_batch::env::EnvConfigProvider;
use http_log_batch::{BatchLogger, LazyConfig};

/// Accumulates a request's worth of records and ships them in one POST.
///
/// LOG_BATCH_DEMO_ENDPOINT_URL=http://127.0.0.1:8080/ingest \
/// LOG_BATCH_DEMO_BATCH_MODE=true cargo run --example session_batch
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = LazyConfig::new(EnvConfigProvider, "demo");
    let logger = BatchLogger::from_lazy(&config);
    logger.set_batch_mode(true);

    let n: u64 = 10_000;
    let start = Instant::now();
    let mut session = logger.new_session();
    for i in 0..n {
        session.add(format!("handled item {i}"), None, None);
    }
    session.flush();

    let elapsed = start.elapsed();
    println!(
        "encoded and scheduled {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    sleep(Duration::from_secs(2)).await;
    println!("{:?}", logger.dispatcher().stats());
}
