use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use serde_json::{json, Value};

use visitor_gate::challenge::ChallengeStore;
use visitor_gate::events::EventLog;
use visitor_gate::server::{AppState, Server};
use visitor_gate::tracker::VisitTracker;

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const HEADLESS_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                           (KHTML, like Gecko) HeadlessChrome/120.0.0.0 Safari/537.36";

async fn setup_server() -> SocketAddr {
    let events = EventLog::new();
    let state = AppState {
        challenges: Arc::new(ChallengeStore::new(Duration::from_secs(60))),
        tracker: Arc::new(VisitTracker::new(
            Duration::from_secs(5),
            Duration::from_secs(60),
            events.clone(),
        )),
        events,
        static_dir: PathBuf::from("/nonexistent"),
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

fn clean_bundle() -> Value {
    json!({
        "screen": {"width": 2560, "height": 1440, "colorDepth": 24, "devicePixelRatio": 2},
        "window": {"innerWidth": 2560, "innerHeight": 1305, "outerWidth": 2560, "outerHeight": 1415},
        "navigator": {
            "userAgent": CHROME_UA,
            "language": "en-US",
            "languages": ["en-US", "en"],
            "platform": "Win32",
            "vendor": "Google Inc.",
            "product": "Gecko",
            "appName": "Netscape",
            "webdriver": false,
        },
        "userAgentData": {"platform": "Windows"},
        "timezone": {"timezone": "America/New_York", "offset": 300},
        "performance": {
            "navigationStart": 1_700_000_000_000.0_f64,
            "loadEventEnd": 1_700_000_000_850.0_f64,
            "jsHeapSizeLimit": 4_294_705_152_u64,
        },
        "webgl": {
            "unmaskedRenderer": "ANGLE (NVIDIA GeForce RTX 3060 Direct3D11)",
            "unmaskedVendor": "Google Inc. (NVIDIA)",
            "renderer": "WebKit WebGL",
            "vendor": "WebKit",
            "extensions": 31,
        },
        "webgl2": {"contextAvailable": true},
        "canvas": {"hash": "6d1c9e4a"},
        "audio": {"fingerprint": 124.0434},
        "battery": {"level": 0.82, "charging": true},
        "mediaDevices": {"audioinput": 1, "audiooutput": 2, "videoinput": 1},
        "speechVoices": {"count": 22},
        "plugins": {"length": 5},
        "fonts": {"length": 42},
        "touch": {"maxTouchPoints": 0, "touchEvent": false},
        "gamepads": {"supported": true},
        "keyboard": {"supported": true},
        "document": {"hidden": false},
        "math": {"acos": 1.047_197_551_196_597_9_f64},
        "connection": {"effectiveType": "4g"},
        "features": {
            "webdriver": false,
            "phantom": false,
            "nightmare": false,
            "selenium": false,
            "domAutomation": false,
            "windowChrome": true,
            "permissionsQuery": true,
            "pluginsLength": 5,
            "notifications": true,
            "webRTC": true,
            "indexedDB": true,
            "localStorage": true,
            "sessionStorage": true,
            "serviceWorker": true,
            "WebAssembly": true,
            "bluetooth": true,
            "usb": true,
            "credentials": true,
        },
        "jsChallenge": {"valid": true, "solveTime": 120},
    })
}

async fn post_analysis(
    client: &Client<HttpConnector, Full<Bytes>>,
    addr: SocketAddr,
    bundle: Value,
    browser_headers: bool,
) -> Value {
    let mut builder = hyper::Request::builder()
        .uri(format!("http://{}/api/bot", addr))
        .method(Method::POST)
        .header("Content-Type", "application/json");

    if browser_headers {
        builder = builder
            .header("User-Agent", CHROME_UA)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header("Sec-CH-UA", "\"Chromium\";v=\"120\"")
            .header("Connection", "keep-alive")
            .header("Cache-Control", "no-cache");
    }

    let req = builder
        .body(Full::new(Bytes::from(bundle.to_string())))
        .unwrap();

    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn detected_names(verdict: &Value) -> Vec<String> {
    verdict["signals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_empty_bundle_early_rejects_with_1005() {
    let addr = setup_server().await;
    let client = http_client();

    let verdict = post_analysis(&client, addr, json!({}), false).await;

    assert_eq!(verdict["verdict"], "bot");
    assert_eq!(verdict["score"], 100);
    assert_eq!(verdict["maxScore"], 100);
    assert_eq!(verdict["code"], 1005);
    assert_eq!(verdict["confidence"], "high");
    assert_eq!(verdict["signals"][0]["name"], "jsExecutionFailed");
    assert_eq!(verdict["signals"][0]["weight"], 100);
    assert_eq!(verdict["signals"][0]["category"], "automation");
    assert_eq!(verdict["summary"]["totalChecks"], 1);
}

#[tokio::test]
async fn test_rich_bundle_without_challenge_early_rejects() {
    let addr = setup_server().await;
    let client = http_client();

    let mut bundle = clean_bundle();
    bundle.as_object_mut().unwrap().remove("jsChallenge");

    // The early-reject takes precedence over the (low) weighted score.
    let verdict = post_analysis(&client, addr, bundle, true).await;

    assert_eq!(verdict["verdict"], "bot");
    assert_eq!(verdict["code"], 1005);
    assert_eq!(verdict["signals"][0]["name"], "jsExecutionFailed");
}

#[tokio::test]
async fn test_failed_challenge_early_rejects() {
    let addr = setup_server().await;
    let client = http_client();

    let mut bundle = clean_bundle();
    bundle["jsChallenge"] = json!({"valid": false, "reason": "wrong answer"});

    let verdict = post_analysis(&client, addr, bundle, true).await;
    assert_eq!(verdict["code"], 1005);
}

#[tokio::test]
async fn test_clean_browser_bundle_is_human() {
    let addr = setup_server().await;
    let client = http_client();

    let verdict = post_analysis(&client, addr, clean_bundle(), true).await;

    assert_eq!(verdict["verdict"], "human", "flags: {:?}", detected_names(&verdict));
    assert!(verdict["score"].as_u64().unwrap() < 25);
    assert_eq!(verdict["confidence"], "low");
    assert!(verdict.get("code").is_none());

    let summary = &verdict["summary"];
    let total = summary["totalChecks"].as_u64().unwrap();
    let flagged = summary["flagged"].as_u64().unwrap();
    let passed = summary["passed"].as_u64().unwrap();
    assert_eq!(flagged + passed, total);
    assert_eq!(
        verdict["allSignals"].as_array().unwrap().len() as u64,
        total
    );
}

#[tokio::test]
async fn test_headless_chrome_bundle_is_bot() {
    let addr = setup_server().await;
    let client = http_client();

    let bundle = json!({
        "screen": {"width": 800, "height": 600},
        "window": {"innerWidth": 800, "innerHeight": 600, "outerWidth": 800, "outerHeight": 600},
        "navigator": {"userAgent": HEADLESS_UA, "webdriver": true, "languages": []},
        "webgl": {"unmaskedRenderer": "Google SwiftShader"},
        "plugins": {"length": 0},
        "jsChallenge": {"valid": true, "solveTime": 40},
    });

    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/bot", addr))
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("User-Agent", HEADLESS_UA)
        .body(Full::new(Bytes::from(bundle.to_string())))
        .unwrap();
    let response = client.request(req).await.unwrap();
    let body = response.collect().await.unwrap().to_bytes();
    let verdict: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(verdict["verdict"], "bot");
    assert_eq!(verdict["score"], 100);
    assert_eq!(verdict["confidence"], "high");

    let flagged = detected_names(&verdict);
    for expected in [
        "webdriver",
        "headlessUA",
        "softwareRenderer",
        "missingChrome",
        "noPlugins",
        "botUserAgent",
    ] {
        assert!(flagged.iter().any(|f| f == expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_analysis_without_document_leaves_no_session() {
    let addr = setup_server().await;
    let client = http_client();

    let _ = post_analysis(&client, addr, clean_bundle(), true).await;

    // The frozen verdict is returned by the status endpoint.
    let req = hyper::Request::builder()
        .uri(format!("http://{}/api/visit-status", addr))
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = client.request(req).await.unwrap();
    let body = response.collect().await.unwrap().to_bytes();
    let status: Value = serde_json::from_slice(&body).unwrap();

    // No document fetch preceded the analysis, so there is no session
    // to freeze; the status stays unknown for this IP.
    assert_eq!(status["verdict"], "unknown");
}

#[tokio::test]
async fn test_verdict_groups_signals_by_category() {
    let addr = setup_server().await;
    let client = http_client();

    let verdict = post_analysis(&client, addr, clean_bundle(), true).await;
    let by_category = verdict["signalsByCategory"].as_object().unwrap();

    let grouped: usize = by_category
        .values()
        .map(|signals| signals.as_array().unwrap().len())
        .sum();
    assert_eq!(
        grouped,
        verdict["allSignals"].as_array().unwrap().len(),
        "every signal appears in exactly one category group"
    );

    for category in ["automation", "browser-features", "headers", "consistency"] {
        assert!(by_category.contains_key(category), "missing {}", category);
    }
}
