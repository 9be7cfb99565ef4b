//! Challenge store
//!
//! Issues short-lived arithmetic challenges and redeems them at most
//! once. The challenge is a JavaScript expression the client must
//! evaluate in its own environment; the server never executes it, only
//! the eagerly computed answer matters here.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 13;

/// Echoed issue timestamp must be within this many ms of the stored one.
const TIMING_PROOF_TOLERANCE_MS: i64 = 1_000;

/// Reported client-side execution time must fall strictly inside
/// (0, 5000) ms to be plausible.
const MAX_EXECUTION_TIME_MS: f64 = 5_000.0;

#[derive(Debug, Clone)]
struct StoredChallenge {
    expected_answer: i64,
    issued_at_ms: u64,
    /// Recorded for logging only; not enforced on verify.
    issuer_ip: String,
}

/// Challenge handed to the client.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub id: String,
    pub expression: String,
    pub issued_at_ms: u64,
}

/// Result of redeeming a challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub timing_valid: bool,
    pub solve_time_ms: u64,
    /// IP the challenge was issued to; surfaced in the verify log.
    pub issuer_ip: Option<String>,
    pub reason: Option<&'static str>,
}

impl VerifyOutcome {
    fn not_found() -> Self {
        Self {
            valid: false,
            timing_valid: false,
            solve_time_ms: 0,
            issuer_ip: None,
            reason: Some("Challenge not found or expired"),
        }
    }
}

/// In-process store of outstanding challenges, keyed by opaque id.
pub struct ChallengeStore {
    entries: DashMap<String, StoredChallenge>,
    ttl: Duration,
}

impl ChallengeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn random_id() -> String {
        let mut rng = rand::thread_rng();
        (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }

    /// Issue a fresh challenge for `ip`, sweeping stale entries first.
    pub fn issue(&self, ip: &str) -> IssuedChallenge {
        self.sweep_expired();

        let mut rng = rand::thread_rng();
        let a: i64 = rng.gen_range(0..100);
        let b: i64 = rng.gen_range(0..100);
        let (op, answer) = match rng.gen_range(0..3) {
            0 => ('+', a + b),
            1 => ('-', a - b),
            _ => ('*', a * b),
        };

        let id = Self::random_id();
        let issued_at_ms = Self::now_ms();

        self.entries.insert(
            id.clone(),
            StoredChallenge {
                expected_answer: answer,
                issued_at_ms,
                issuer_ip: ip.to_string(),
            },
        );

        IssuedChallenge {
            id,
            expression: format!("(function(){{return {} {} {};}})()", a, op, b),
            issued_at_ms,
        }
    }

    /// Redeem a challenge. The entry is consumed whether or not the
    /// answer checks out, so a second call with the same id always
    /// reports it as absent.
    pub fn verify(
        &self,
        id: &str,
        answer: i64,
        timing_proof_ms: Option<f64>,
        execution_time_ms: Option<f64>,
    ) -> VerifyOutcome {
        let Some((_, stored)) = self.entries.remove(id) else {
            return VerifyOutcome::not_found();
        };

        let now = Self::now_ms();
        if now.saturating_sub(stored.issued_at_ms) > self.ttl.as_millis() as u64 {
            return VerifyOutcome::not_found();
        }

        let valid = answer == stored.expected_answer;

        let proof_ok = timing_proof_ms
            .map(|proof| {
                let drift = proof as i64 - stored.issued_at_ms as i64;
                drift.abs() <= TIMING_PROOF_TOLERANCE_MS
            })
            .unwrap_or(false);
        let execution_ok = execution_time_ms
            .map(|t| t > 0.0 && t < MAX_EXECUTION_TIME_MS)
            .unwrap_or(false);

        VerifyOutcome {
            valid,
            timing_valid: proof_ok && execution_ok,
            solve_time_ms: now.saturating_sub(stored.issued_at_ms),
            issuer_ip: Some(stored.issuer_ip),
            reason: None,
        }
    }

    fn sweep_expired(&self) {
        let now = Self::now_ms();
        let ttl_ms = self.ttl.as_millis() as u64;
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.issued_at_ms) <= ttl_ms);
    }

    #[cfg(test)]
    fn expected_answer(&self, id: &str) -> Option<i64> {
        self.entries.get(id).map(|e| e.expected_answer)
    }

    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        if let Some(mut entry) = self.entries.get_mut(id) {
            entry.issued_at_ms -= by.as_millis() as u64;
        }
    }
}
