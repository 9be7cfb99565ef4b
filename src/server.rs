//! HTTP surface
//!
//! Responsibilities:
//! - Accept TCP connections
//! - HTTP/1.1 parsing via hyper
//! - Spawn per-connection tasks
//! - Client IP extraction
//! - Request triage and route dispatch

pub mod classify;
pub mod routes;
pub mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::analysis::headers::evaluate_headers;
use crate::challenge::ChallengeStore;
use crate::error::{GateError, Result};
use crate::events::EventLog;
use crate::tracker::VisitTracker;

use classify::{classify, RequestKind};

/// Shared services injected into every handler.
pub struct AppState {
    pub challenges: Arc<ChallengeStore>,
    pub tracker: Arc<VisitTracker>,
    pub events: EventLog,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

/// Main server struct owning the listener and shared state
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl Server {
    pub async fn bind(addr: SocketAddr, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GateError::Bind { addr, source: e })?;

        let actual_addr = listener
            .local_addr()
            .map_err(|e| GateError::Config(format!("Failed to get local address: {}", e)))?;

        info!(%actual_addr, "Server bound successfully");

        Ok(Self {
            listener,
            addr: actual_addr,
            state: Arc::new(state),
        })
    }

    pub async fn run(self) -> Result<()> {
        info!(addr = %self.addr, "Starting server");

        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!(%e, "Failed to accept connection");
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let state = self.state.clone();

            tokio::spawn(async move {
                let service =
                    service_fn(move |req| handle_request(req, remote_addr, state.clone()));
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%remote_addr, %e, "Connection error");
                }
            });
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Client IP: first element of X-Forwarded-For, else the socket peer,
/// else the literal "unknown".
pub fn client_ip(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    match remote_addr {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

/// Handle a single HTTP request.
///
/// Flow:
/// 1. Classify: static assets bypass everything.
/// 2. Document fetches open a visit session and serve the UI.
/// 3. Everything else is header-analyzed for logging (except the
///    analysis endpoint itself), then dispatched.
async fn handle_request(
    req: Request<Incoming>,
    remote_addr: SocketAddr,
    state: Arc<AppState>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let ip = client_ip(req.headers(), Some(remote_addr));

    let response = match classify(&method, &path, req.headers()) {
        RequestKind::StaticAsset => static_files::serve_asset(&state.static_dir, &path).await,

        RequestKind::Document => {
            state.tracker.open(&ip);
            state.events.emit(
                "header-analysis",
                &ip,
                json!({
                    "method": method.as_str(),
                    "path": path,
                    "verdict": "pending",
                }),
            );
            static_files::serve_document(&state.static_dir, &path).await
        }

        RequestKind::Other => {
            // The analysis endpoint carries its own evaluation; header
            // triage would only double-log it.
            if path != "/api/bot" {
                let verdict = evaluate_headers(req.headers());
                let flagged: Vec<&str> = verdict.signals.iter().map(|s| s.name).collect();
                state.events.emit(
                    "header-analysis",
                    &ip,
                    json!({
                        "method": method.as_str(),
                        "path": path,
                        "verdict": verdict.verdict.as_str(),
                        "score": verdict.score,
                        "signals": flagged,
                    }),
                );
            }

            dispatch(req, &method, &path, &ip, &state).await
        }
    };

    Ok(response)
}

async fn dispatch(
    req: Request<Incoming>,
    method: &Method,
    path: &str,
    ip: &str,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match (method.as_str(), path) {
        ("GET", "/api/challenge") => routes::issue_challenge(state, ip),
        ("POST", "/api/challenge/verify") => routes::verify_challenge(state, ip, req).await,
        ("POST", "/api/visit") => routes::record_visit(state, ip, req).await,
        ("POST", "/api/bot") => routes::analyze(state, ip, req).await,
        ("GET", "/api/visit-status") => routes::visit_status(state, ip),
        ("GET", _) => static_files::serve_document(&state.static_dir, path).await,
        _ => static_files::not_found(),
    }
}
