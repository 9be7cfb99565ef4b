//! API route handlers
//!
//! Domain outcomes are always 2xx with a JSON answer; only transport
//! problems (malformed JSON, oversize bodies) produce a 4xx.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analysis::browser::{evaluate_bundle, prerequisites_met};
use crate::analysis::bundle::BrowserBundle;
use crate::analysis::Verdict;
use crate::server::AppState;
use crate::tracker::VisitStatus;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct VerifyRequest {
    challenge_id: Option<String>,
    answer: Option<i64>,
    timing_proof: Option<f64>,
    execution_time: Option<f64>,
}

pub fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &json!({ "error": message }))
}

/// Collect a JSON body under the configured size cap.
async fn read_json(
    req: Request<Incoming>,
    max_bytes: usize,
) -> Result<Value, Response<Full<Bytes>>> {
    let body = Limited::new(req.into_body(), max_bytes);
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.is::<LengthLimitError>() => {
            return Err(error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
            ));
        }
        Err(_) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON: {}", e))
    })
}

/// GET /api/challenge
pub fn issue_challenge(state: &AppState, ip: &str) -> Response<Full<Bytes>> {
    let issued = state.challenges.issue(ip);

    json_response(
        StatusCode::OK,
        &json!({
            "challengeId": issued.id,
            "challenge": issued.expression,
            "timingChallenge": issued.issued_at_ms,
        }),
    )
}

/// POST /api/challenge/verify
pub async fn verify_challenge(
    state: &AppState,
    ip: &str,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    let body = match read_json(req, state.max_body_bytes).await {
        Ok(value) => value,
        Err(response) => return response,
    };
    let verify: VerifyRequest = serde_json::from_value(body).unwrap_or_default();

    let challenge_id = verify.challenge_id.unwrap_or_default();
    let outcome = state.challenges.verify(
        &challenge_id,
        verify.answer.unwrap_or(i64::MIN),
        verify.timing_proof,
        verify.execution_time,
    );

    state.events.emit(
        "challenge-verify",
        ip,
        json!({
            "challengeId": challenge_id,
            "valid": outcome.valid,
            "timingValid": outcome.timing_valid,
            "solveTime": outcome.solve_time_ms,
            "issuerIp": outcome.issuer_ip,
        }),
    );

    let mut body = json!({
        "valid": outcome.valid,
        "timingValid": outcome.timing_valid,
        "executionTime": verify.execution_time,
        "solveTime": outcome.solve_time_ms,
    });
    if let Some(reason) = outcome.reason {
        body["reason"] = json!(reason);
    }

    json_response(StatusCode::OK, &body)
}

/// POST /api/visit
pub async fn record_visit(
    state: &AppState,
    ip: &str,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    let metrics = match read_json(req, state.max_body_bytes).await {
        Ok(value) => value,
        Err(response) => return response,
    };

    state.events.emit("visit", ip, json!({ "metrics": metrics }));

    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// POST /api/bot
pub async fn analyze(
    state: &AppState,
    ip: &str,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    // Cancel the visit deadline before touching the body; a slow upload
    // must not race the timer.
    state.tracker.mark_analysis_requested(ip);

    let headers = req.headers().clone();
    let body = match read_json(req, state.max_body_bytes).await {
        Ok(value) => value,
        Err(response) => return response,
    };

    let bundle = BrowserBundle::new(body);
    let verdict = if prerequisites_met(&bundle) {
        evaluate_bundle(&bundle, &headers)
    } else {
        Verdict::js_execution_failed()
    };

    state.tracker.complete(ip, &verdict);

    state.events.emit(
        "bot-analysis",
        ip,
        json!({
            "verdict": verdict.verdict.as_str(),
            "score": verdict.score,
            "confidence": verdict.confidence,
            "flagged": verdict.summary.flagged,
            "code": verdict.code,
        }),
    );

    json_response(
        StatusCode::OK,
        &serde_json::to_value(&verdict).unwrap_or_else(|_| json!({})),
    )
}

/// GET /api/visit-status
pub fn visit_status(state: &AppState, ip: &str) -> Response<Full<Bytes>> {
    let status = state.tracker.status(ip);

    let body = match status {
        VisitStatus::Unknown => json!({
            "verdict": "unknown",
            "reason": "No visit recorded for this IP",
        }),
        VisitStatus::Pending { remaining_secs } => json!({
            "verdict": "pending",
            "reason": format!("Waiting for analysis - {}s remaining", remaining_secs),
        }),
        VisitStatus::PendingAnalysis => json!({ "verdict": "pending-analysis" }),
        VisitStatus::TimedOut => json!({
            "verdict": "bot",
            "code": crate::analysis::CODE_SESSION_TIMEOUT,
            "reason": "Never called /api/bot - no JS execution",
        }),
        VisitStatus::Finalized(verdict) => {
            serde_json::to_value(&verdict).unwrap_or_else(|_| json!({}))
        }
    };

    state.events.emit(
        "visit-status",
        ip,
        json!({ "verdict": body.get("verdict").cloned().unwrap_or(Value::Null) }),
    );

    json_response(StatusCode::OK, &body)
}
