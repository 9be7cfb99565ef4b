//! Visit tracker
//!
//! Per-IP session state machine tying a document fetch to the analysis
//! call that should follow it. A session opens when a document is
//! served and arms a deadline timer; if the analysis endpoint is never
//! invoked before the deadline, the absence of JS execution is itself
//! the verdict (code 1006).
//!
//! States: NONE -> OPEN -> {ANALYSIS_BEGAN -> COMPLETED} or {TIMED_OUT}.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::analysis::Verdict;
use crate::events::EventLog;

struct Session {
    /// Distinguishes this session from a replacement on the same IP, so
    /// a fired timer can recognise a stale target.
    id: u64,
    started_at: Instant,
    completed: bool,
    analysis_requested: bool,
    timer: Option<JoinHandle<()>>,
    final_verdict: Option<Verdict>,
}

impl Drop for Session {
    fn drop(&mut self) {
        // Replacement and eviction both cancel the pending deadline.
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Answer to a status query.
#[derive(Debug, Clone)]
pub enum VisitStatus {
    /// No session recorded for this IP.
    Unknown,
    /// Session open, deadline not yet reached.
    Pending { remaining_secs: u64 },
    /// Analysis endpoint was invoked; evaluator result not yet frozen.
    PendingAnalysis,
    /// Deadline elapsed but the timer has not fired yet.
    TimedOut,
    /// A frozen verdict exists (timeout or completed analysis).
    Finalized(Verdict),
}

/// Tracks one live session per client IP.
pub struct VisitTracker {
    sessions: Arc<DashMap<String, Session>>,
    next_id: AtomicU64,
    deadline: Duration,
    session_ttl: Duration,
    events: EventLog,
}

impl VisitTracker {
    pub fn new(deadline: Duration, session_ttl: Duration, events: EventLog) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
            deadline,
            session_ttl,
            events,
        }
    }

    /// Open a session for `ip`, replacing any prior one (and its timer),
    /// and arm the deadline.
    pub fn open(&self, ip: &str) {
        self.evict_stale();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sessions = Arc::clone(&self.sessions);
        let events = self.events.clone();
        let deadline = self.deadline;
        let timer_ip = ip.to_string();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            fire_deadline(&sessions, &events, deadline, &timer_ip, id);
        });

        // Inserting drops the replaced session, which aborts its timer.
        self.sessions.insert(
            ip.to_string(),
            Session {
                id,
                started_at: Instant::now(),
                completed: false,
                analysis_requested: false,
                timer: Some(timer),
                final_verdict: None,
            },
        );
    }

    /// Record that the analysis endpoint was invoked; cancels the
    /// deadline but does not complete the session.
    pub fn mark_analysis_requested(&self, ip: &str) {
        self.evict_stale();

        if let Some(mut entry) = self.sessions.get_mut(ip) {
            let session = entry.value_mut();
            session.analysis_requested = true;
            if let Some(timer) = session.timer.take() {
                timer.abort();
            }
        }
    }

    /// Freeze the session with the evaluator's verdict. A verdict that
    /// is already frozen (deadline won the race) is never overwritten.
    pub fn complete(&self, ip: &str, verdict: &Verdict) {
        if let Some(mut entry) = self.sessions.get_mut(ip) {
            let session = entry.value_mut();
            session.completed = true;
            if session.final_verdict.is_none() {
                session.final_verdict = Some(verdict.clone());
            }
        }
    }

    /// Current state of the session for `ip`.
    pub fn status(&self, ip: &str) -> VisitStatus {
        self.evict_stale();

        let Some(entry) = self.sessions.get(ip) else {
            return VisitStatus::Unknown;
        };
        let session = entry.value();

        if let Some(verdict) = &session.final_verdict {
            return VisitStatus::Finalized(verdict.clone());
        }

        if session.analysis_requested {
            return VisitStatus::PendingAnalysis;
        }

        let elapsed = session.started_at.elapsed();
        if elapsed > self.deadline {
            return VisitStatus::TimedOut;
        }

        let remaining = self.deadline.saturating_sub(elapsed);
        VisitStatus::Pending {
            remaining_secs: remaining.as_secs_f64().ceil() as u64,
        }
    }

    fn evict_stale(&self) {
        self.sessions
            .retain(|_, session| session.started_at.elapsed() < self.session_ttl);
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Deadline callback. Re-checks session identity because a replacement
/// may have been installed between arming and firing; `completed` is
/// the sole guard against double verdict delivery.
fn fire_deadline(
    sessions: &DashMap<String, Session>,
    events: &EventLog,
    deadline: Duration,
    ip: &str,
    session_id: u64,
) {
    let verdict = {
        let Some(mut entry) = sessions.get_mut(ip) else {
            return;
        };
        let session = entry.value_mut();
        if session.id != session_id || session.completed || session.analysis_requested {
            return;
        }
        session.completed = true;
        let verdict = Verdict::visit_timed_out(deadline.as_secs());
        session.final_verdict = Some(verdict.clone());
        verdict
    };

    events.emit(
        "bot-verdict",
        ip,
        json!({
            "verdict": verdict.verdict.as_str(),
            "score": verdict.score,
            "code": verdict.code,
            "reason": verdict.reason,
        }),
    );
}
