use chrono::{DateTime, FixedOffset};
use http_log_batch::dispatch::DispatchStats;
use http_log_batch::fault::FaultSwitch;
use http_log_batch::http::HttpSink;
use http_log_batch::{
    BatchLogger, Dispatcher, Disposition, LazyConfig, LogConfig, ProfileSettings,
    StaticConfigProvider,
};
use mockito::{Matcher, Server};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

fn t0() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-02T03:04:05.006+00:00").unwrap()
}

async fn wait_settled(logger: &BatchLogger, n: u64) -> DispatchStats {
    for _ in 0..400 {
        let stats = logger.dispatcher().stats();
        if stats.settled() >= n {
            return stats;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("sends did not settle: {:?}", logger.dispatcher().stats());
}

fn profile(endpoint_url: String, batch_mode_enabled: bool) -> StaticConfigProvider {
    StaticConfigProvider::new().with_profile(
        "default",
        ProfileSettings {
            endpoint_url,
            include_hostname: true,
            hostname: "web-1".to_string(),
            batch_mode_enabled,
            ..ProfileSettings::default()
        },
    )
}

#[tokio::test]
async fn session_flush_posts_one_deduplicated_array() {
    let mut server = Server::new_async().await;
    let expected = concat!(
        r#"[{"host": "web-1", "level": "INFO", "datetime": "2024-01-02 03:04:05.006+0000", "message": "boot complete"},"#,
        r#"{"host": "web-1", "level": "WARN", "datetime": "2024-01-02 03:04:05.006+0000", "message": "He said \"hi\""}]"#
    );
    let mock = server
        .mock("POST", "/ingest")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Exact(expected.to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let lazy = LazyConfig::new(profile(format!("{}/ingest", server.url()), true), "default");
    let logger = BatchLogger::from_lazy(&lazy);
    let mut session = logger.new_session();
    session.add("boot complete", Some(t0()), None);
    session.add("boot complete", Some(t0()), None);
    session.add(r#"He said "hi""#, Some(t0()), Some("WARN"));
    session.flush();

    assert!(session.batch().is_empty());
    let stats = wait_settled(&logger, 1).await;
    assert_eq!(stats, DispatchStats { dispatched: 1, delivered: 1, failed: 0 });
    mock.assert_async().await;
}

#[tokio::test]
async fn single_log_without_batching_posts_immediately() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ingest")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Regex(r#"^\[\{"host": "web-1", "level": "ERROR", .*"message": "disk full"\}\]$"#.to_string()))
        .with_status(202)
        .expect(1)
        .create_async()
        .await;

    let config = Arc::new(LogConfig::resolve(
        &profile(format!("{}/ingest", server.url()), false),
        "default",
    ));
    let logger = BatchLogger::with_http(config);

    assert_eq!(
        logger.single_log("disk full", None, Some("ERROR"), None),
        Disposition::Sent
    );

    wait_settled(&logger, 1).await;
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_are_swallowed() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ingest")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let config = Arc::new(LogConfig {
        endpoint_url: format!("{}/ingest", server.url()),
        ..LogConfig::default()
    });
    let logger = BatchLogger::with_http(config);
    logger.single_log("ignored failure", Some(t0()), None, None);

    let stats = wait_settled(&logger, 1).await;
    assert_eq!(stats, DispatchStats { dispatched: 1, delivered: 0, failed: 1 });
    mock.assert_async().await;
}

#[tokio::test]
async fn injected_fault_prevents_any_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ingest")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let url = format!("{}/ingest", server.url());
    let switch = FaultSwitch::new();
    switch.trip();
    let dispatcher = Dispatcher::new(Arc::new(HttpSink::new(url.clone())))
        .with_fault_injector(Arc::new(switch));
    let config = Arc::new(LogConfig {
        endpoint_url: url,
        ..LogConfig::default()
    });
    let logger = BatchLogger::new(config, dispatcher);

    logger.single_log("never leaves", Some(t0()), None, None);

    let stats = wait_settled(&logger, 1).await;
    assert_eq!(stats.failed, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_profile_fails_quietly_at_the_transport() {
    let lazy = LazyConfig::new(StaticConfigProvider::new(), "absent");
    let logger = BatchLogger::from_lazy(&lazy);
    assert_eq!(logger.config().endpoint_url, "");

    assert_eq!(
        logger.single_log("nowhere to go", None, None, None),
        Disposition::Sent
    );

    let stats = wait_settled(&logger, 1).await;
    assert_eq!(stats, DispatchStats { dispatched: 1, delivered: 0, failed: 1 });
}

#[tokio::test]
async fn batching_without_a_batch_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = Arc::new(LogConfig::resolve(
        &profile(format!("{}/ingest", server.url()), true),
        "default",
    ));
    let logger = BatchLogger::with_http(config);

    assert_eq!(
        logger.single_log("dropped", Some(t0()), None, None),
        Disposition::Dropped
    );
    let mut session = logger.new_session();
    session.flush();

    sleep(Duration::from_millis(50)).await;
    assert_eq!(logger.dispatcher().stats(), DispatchStats::default());
    mock.assert_async().await;
}
