//! Static UI serving
//!
//! Files are read from the configured static dir; document requests
//! fall back to `index.html` so the single-page UI handles routing.

use std::path::{Path, PathBuf};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

fn content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("wasm") => "application/wasm",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Resolve a request path inside the static dir, rejecting traversal.
fn resolve(dir: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == ".." || segment == ".")
    {
        return None;
    }
    Some(dir.join(trimmed))
}

fn file_response(contents: Vec<u8>, extension: Option<&str>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type(extension))
        .body(Full::new(Bytes::from(contents)))
        .unwrap()
}

pub fn not_found() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Not Found")))
        .unwrap()
}

/// Serve one static asset; 404 when it does not exist.
pub async fn serve_asset(dir: &Path, request_path: &str) -> Response<Full<Bytes>> {
    let Some(file) = resolve(dir, request_path) else {
        return not_found();
    };

    match tokio::fs::read(&file).await {
        Ok(contents) => {
            let ext = file.extension().and_then(|e| e.to_str());
            file_response(contents, ext)
        }
        Err(_) => not_found(),
    }
}

/// Serve a document request: the named .html file when it exists,
/// otherwise the `index.html` fallback.
pub async fn serve_document(dir: &Path, request_path: &str) -> Response<Full<Bytes>> {
    if let Some(file) = resolve(dir, request_path) {
        if let Ok(contents) = tokio::fs::read(&file).await {
            return file_response(contents, Some("html"));
        }
    }

    match tokio::fs::read(dir.join("index.html")).await {
        Ok(contents) => file_response(contents, Some("html")),
        Err(_) => not_found(),
    }
}
