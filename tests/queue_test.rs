//! Integration tests for the fetch queue's concurrency and rate limits.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use hn_api::config::Config;
use hn_api::queue::FetchQueue;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn queue_for(
    server: &MockServer,
    concurrency: usize,
    rate_limit: usize,
    window: Duration,
) -> FetchQueue {
    let config = Config {
        api_base: server.uri(),
        site_base: server.uri(),
        fetch_concurrency: concurrency,
        fetch_rate_limit: rate_limit,
        fetch_rate_window: window,
        ..Config::for_testing()
    };
    FetchQueue::new(&config).expect("Failed to build queue")
}

async fn mount_slow_endpoint(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/u/\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Serve each connection its response headers immediately, then stall
/// before sending the body. Distinguishes holding a concurrency slot for
/// the whole unit from releasing it as soon as headers arrive.
async fn spawn_slow_body_server(body_delay: Duration) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read test address");
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0_u8; 1024];
                let _ = socket.read(&mut buf).await;
                let body = br#"{"ok":true}"#;
                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(body_delay).await;
                let _ = socket.write_all(body).await;
                let _ = socket.flush().await;
            });
        }
    });
    addr
}

#[tokio::test]
async fn test_concurrency_limit_forces_batches() {
    let server = MockServer::start().await;
    mount_slow_endpoint(&server, Duration::from_millis(200)).await;
    let queue = queue_for(&server, 2, 100, Duration::from_secs(1));

    let urls: Vec<String> = (0..4).map(|i| format!("{}/u/{i}", server.uri())).collect();
    let started = Instant::now();
    let results = join_all(
        urls.iter()
            .map(|url| queue.fetch_json::<serde_json::Value>(url)),
    )
    .await;
    let elapsed = started.elapsed();

    assert!(results.iter().all(Result::is_ok));
    // Four 200ms requests through two permits need at least two rounds.
    assert!(
        elapsed >= Duration::from_millis(390),
        "elapsed only {elapsed:?}"
    );
}

#[tokio::test]
async fn test_concurrency_permit_covers_body_read() {
    let addr = spawn_slow_body_server(Duration::from_millis(200)).await;
    let config = Config {
        api_base: format!("http://{addr}"),
        site_base: format!("http://{addr}"),
        fetch_concurrency: 1,
        fetch_rate_limit: 100,
        fetch_rate_window: Duration::from_secs(1),
        ..Config::for_testing()
    };
    let queue = FetchQueue::new(&config).expect("Failed to build queue");

    let urls: Vec<String> = (0..3).map(|i| format!("http://{addr}/u/{i}")).collect();
    let started = Instant::now();
    let results = join_all(
        urls.iter()
            .map(|url| queue.fetch_json::<serde_json::Value>(url)),
    )
    .await;
    let elapsed = started.elapsed();

    assert!(results.iter().all(Result::is_ok));
    // One permit and three 200ms bodies: units must stay serialized until
    // their bodies are read, not just until response headers arrive.
    assert!(
        elapsed >= Duration::from_millis(590),
        "elapsed only {elapsed:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_spaces_out_start_times() {
    let server = MockServer::start().await;
    mount_slow_endpoint(&server, Duration::ZERO).await;
    // Two starts allowed per 300ms; six requests need three windows.
    let queue = queue_for(&server, 100, 2, Duration::from_millis(300));

    let urls: Vec<String> = (0..6).map(|i| format!("{}/u/{i}", server.uri())).collect();
    let started = Instant::now();
    let results = join_all(
        urls.iter()
            .map(|url| queue.fetch_json::<serde_json::Value>(url)),
    )
    .await;
    let elapsed = started.elapsed();

    assert!(results.iter().all(Result::is_ok));
    assert!(
        elapsed >= Duration::from_millis(590),
        "elapsed only {elapsed:?}"
    );
}

#[tokio::test]
async fn test_requests_start_in_submission_order() {
    let server = MockServer::start().await;
    mount_slow_endpoint(&server, Duration::from_millis(10)).await;
    let queue = queue_for(&server, 1, 100, Duration::from_secs(1));

    let urls: Vec<String> = (0..5).map(|i| format!("{}/u/{i}", server.uri())).collect();
    join_all(
        urls.iter()
            .map(|url| queue.fetch_json::<serde_json::Value>(url)),
    )
    .await;

    let seen: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    let expected: Vec<String> = (0..5).map(|i| format!("/u/{i}")).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_page_fetch_forwards_client_ip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path("/newcomments"))
        .and(wiremock::matchers::header("X-Forwarded-For", "203.0.113.7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let queue = queue_for(&server, 2, 100, Duration::from_secs(1));
    let body = queue
        .fetch_page(&format!("{}/newcomments", server.uri()), Some("203.0.113.7"))
        .await
        .unwrap();
    assert_eq!(body, "<html></html>");
}

#[tokio::test]
async fn test_page_fetch_reports_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path("/active"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let queue = queue_for(&server, 2, 100, Duration::from_secs(1));
    let err = queue
        .fetch_page(&format!("{}/active", server.uri()), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        hn_api::error::HnError::UpstreamStatus { status: 503, .. }
    ));
}
