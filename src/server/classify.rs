//! Per-request triage
//!
//! Every request is classified before routing:
//! - static assets bypass all tracking and logging,
//! - document fetches open a visit session,
//! - everything else gets lightweight header analysis for logging.

use hyper::{HeaderMap, Method};

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Path has a non-.html extension; bypass tracking and logging.
    StaticAsset,
    /// Navigation-level fetch of the UI document.
    Document,
    /// API call or any other request.
    Other,
}

/// File extension of the path's final segment, if any.
pub fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or("");
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

pub fn classify(method: &Method, path: &str, headers: &HeaderMap) -> RequestKind {
    if let Some(ext) = path_extension(path) {
        if !ext.eq_ignore_ascii_case("html") {
            return RequestKind::StaticAsset;
        }
    }

    let is_api = path.starts_with("/api/");
    if *method == Method::GET && !is_api {
        let navigation = headers
            .get("sec-fetch-dest")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "document")
            .unwrap_or(false);
        let accepts_html = headers
            .get("accept")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/html"))
            .unwrap_or(false);

        if navigation || accepts_html {
            return RequestKind::Document;
        }
    }

    RequestKind::Other
}
