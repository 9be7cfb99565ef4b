use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use serde_json::json;

use visitor_gate::challenge::ChallengeStore;
use visitor_gate::events::EventLog;
use visitor_gate::server::{AppState, Server};
use visitor_gate::tracker::VisitTracker;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

async fn static_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gate-ui-{}-{}",
        std::process::id(),
        rand::random::<u32>()
    ));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("index.html"), "<html><body>gate</body></html>")
        .await
        .unwrap();
    tokio::fs::write(dir.join("app.js"), "// collector stub")
        .await
        .unwrap();
    dir
}

async fn setup_server(deadline: Duration) -> SocketAddr {
    let events = EventLog::new();
    let state = AppState {
        challenges: Arc::new(ChallengeStore::new(Duration::from_secs(60))),
        tracker: Arc::new(VisitTracker::new(
            deadline,
            Duration::from_secs(60),
            events.clone(),
        )),
        events,
        static_dir: static_dir().await,
        max_body_bytes: 1024 * 1024,
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = Server::bind(addr, state).await.unwrap();
    let addr = server.addr();
    tokio::spawn(async move { server.run().await });
    addr
}

fn http_client() -> Client<HttpConnector, Full<Bytes>> {
    Client::builder(hyper_util::rt::TokioExecutor::new()).build_http()
}

async fn open_document(client: &Client<HttpConnector, Full<Bytes>>, addr: SocketAddr) {
    let req = hyper::Request::builder()
        .uri(format!("http://{}/", addr))
        .header("User-Agent", BROWSER_UA)
        .header("Accept", "text/html,application/xhtml+xml")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "text/html; charset=utf-8"
    );
}

async fn visit_status(
    client: &Client<HttpConnector, Full<Bytes>>,
    addr: SocketAddr,
) -> serde_json::Value {
    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/visit-status", addr))
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_status_without_visit_is_unknown() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    let status = visit_status(&client, addr).await;
    assert_eq!(status["verdict"], "unknown");
}

#[tokio::test]
async fn test_document_fetch_opens_pending_session() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    open_document(&client, addr).await;

    let status = visit_status(&client, addr).await;
    assert_eq!(status["verdict"], "pending");
    assert!(status["reason"]
        .as_str()
        .unwrap()
        .contains("s remaining"));
}

#[tokio::test]
async fn test_document_without_analysis_times_out_with_1006() {
    let addr = setup_server(Duration::from_millis(300)).await;
    let client = http_client();

    open_document(&client, addr).await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let status = visit_status(&client, addr).await;
    assert_eq!(status["verdict"], "bot");
    assert_eq!(status["code"], 1006);
    assert_eq!(status["reason"], "Never called /api/bot - no JS execution");
    assert_eq!(status["score"], 100);
    assert_eq!(status["signals"][0]["name"], "noJsExecution");

    // The frozen verdict is stable across repeated queries.
    let again = visit_status(&client, addr).await;
    assert_eq!(again["code"], 1006);
}

#[tokio::test]
async fn test_analysis_call_cancels_deadline() {
    let addr = setup_server(Duration::from_millis(300)).await;
    let client = http_client();

    open_document(&client, addr).await;

    // Empty bundle: the analysis itself early-rejects, but the deadline
    // verdict (1006) must not appear afterwards.
    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/bot", addr))
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from("{}")))
        .unwrap();
    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(600)).await;

    let status = visit_status(&client, addr).await;
    assert_eq!(status["code"], 1005);
}

#[tokio::test]
async fn test_repeat_document_fetch_resets_session() {
    let addr = setup_server(Duration::from_millis(500)).await;
    let client = http_client();

    open_document(&client, addr).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    open_document(&client, addr).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    // 600ms after the first fetch, but only 300ms after the replacement:
    // the replaced session's timer must not have produced a verdict.
    let status = visit_status(&client, addr).await;
    assert_eq!(status["verdict"], "pending");
}

#[tokio::test]
async fn test_visit_metrics_endpoint_returns_204() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/visit", addr))
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(
            json!({"loadTime": 321, "referrer": ""}).to_string(),
        )))
        .unwrap();

    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_oversize_body_is_rejected() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    let oversized = format!("{{\"padding\":\"{}\"}}", "x".repeat(2 * 1024 * 1024));
    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/visit", addr))
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(oversized)))
        .unwrap();

    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_static_asset_is_served_without_tracking() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    let req = hyper::Request::builder()
        .uri(format!("http://{}/app.js", addr))
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Asset fetches never open a session.
    let status = visit_status(&client, addr).await;
    assert_eq!(status["verdict"], "unknown");
}

#[tokio::test]
async fn test_missing_static_asset_is_404() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    let req = hyper::Request::builder()
        .uri(format!("http://{}/missing.css", addr))
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unmatched_get_serves_ui_fallback() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    // A GET without browser document hints is not tracked, but still
    // lands on the UI fallback.
    let req = hyper::Request::builder()
        .uri(format!("http://{}/some/client/route", addr))
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("gate"));
}

#[tokio::test]
async fn test_forwarded_for_scopes_sessions_per_client() {
    let addr = setup_server(Duration::from_secs(5)).await;
    let client = http_client();

    let req = hyper::Request::builder()
        .uri(format!("http://{}/", addr))
        .header("Accept", "text/html")
        .header("X-Forwarded-For", "198.51.100.4")
        .body(Full::new(Bytes::new()))
        .unwrap();
    client.request(req).await.unwrap();

    // Same server, different forwarded client: no session.
    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/visit-status", addr))
        .header("X-Forwarded-For", "198.51.100.99")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = client.request(req).await.unwrap();
    let body = response.collect().await.unwrap().to_bytes();
    let status: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status["verdict"], "unknown");

    // The forwarded client that fetched the document is pending.
    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/visit-status", addr))
        .header("X-Forwarded-For", "198.51.100.4")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = client.request(req).await.unwrap();
    let body = response.collect().await.unwrap().to_bytes();
    let status: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status["verdict"], "pending");
}
