//! Signal evaluation value objects and verdict assembly
//!
//! A [`Signal`] is one named, weighted rule outcome; a [`Verdict`] is the
//! classification assembled from a full rule run. The score is always
//! `min(100, sum of detected weights)` and the verdict label follows the
//! fixed thresholds (>=50 bot, >=25 suspicious, else human).

pub mod bundle;
pub mod browser;
pub mod headers;

use std::collections::BTreeMap;

use serde::Serialize;

/// Maximum normalised score.
pub const MAX_SCORE: u32 = 100;

/// Score at or above which a request is labelled a bot.
pub const BOT_THRESHOLD: u32 = 50;

/// Score at or above which a request is labelled suspicious.
pub const SUSPICIOUS_THRESHOLD: u32 = 25;

/// Analysis was requested without the prerequisite client evidence.
pub const CODE_NO_CLIENT_DATA: u32 = 1005;

/// The session deadline elapsed without an analysis call.
pub const CODE_SESSION_TIMEOUT: u32 = 1006;

/// Tri-valued classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    Human,
    Suspicious,
    Bot,
}

impl VerdictLabel {
    /// Map a normalised score onto the verdict thresholds.
    pub fn from_score(score: u32) -> Self {
        if score >= BOT_THRESHOLD {
            VerdictLabel::Bot
        } else if score >= SUSPICIOUS_THRESHOLD {
            VerdictLabel::Suspicious
        } else {
            VerdictLabel::Human
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Human => "human",
            VerdictLabel::Suspicious => "suspicious",
            VerdictLabel::Bot => "bot",
        }
    }
}

/// Confidence derived from the normalised score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_score(score: u32) -> Self {
        if score >= 50 {
            Confidence::High
        } else if score >= 25 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Category tag for grouping signals in the verdict output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalCategory {
    Automation,
    BrowserFeatures,
    Screen,
    Webgl,
    Consistency,
    Timing,
    Headers,
    Fingerprint,
    General,
}

impl SignalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::Automation => "automation",
            SignalCategory::BrowserFeatures => "browser-features",
            SignalCategory::Screen => "screen",
            SignalCategory::Webgl => "webgl",
            SignalCategory::Consistency => "consistency",
            SignalCategory::Timing => "timing",
            SignalCategory::Headers => "headers",
            SignalCategory::Fingerprint => "fingerprint",
            SignalCategory::General => "general",
        }
    }
}

/// One named rule outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub name: &'static str,
    pub weight: u32,
    pub detected: bool,
    pub reason: String,
    pub category: SignalCategory,
}

impl Signal {
    /// Build a signal, picking the detected or not-detected reason text.
    pub fn new(
        name: &'static str,
        weight: u32,
        category: SignalCategory,
        detected: bool,
        detected_reason: impl Into<String>,
        clear_reason: impl Into<String>,
    ) -> Self {
        Self {
            name,
            weight,
            detected,
            reason: if detected {
                detected_reason.into()
            } else {
                clear_reason.into()
            },
            category,
        }
    }
}

/// Counts over a completed rule run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_checks: usize,
    pub flagged: usize,
    pub passed: usize,
}

/// The classification returned to clients and written to the event log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub verdict: VerdictLabel,
    pub score: u32,
    pub max_score: u32,
    pub confidence: Confidence,
    pub signals: Vec<Signal>,
    pub all_signals: Vec<Signal>,
    pub signals_by_category: BTreeMap<&'static str, Vec<Signal>>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// Assemble a verdict from an executed rule set.
    pub fn from_signals(all_signals: Vec<Signal>) -> Self {
        let raw: u32 = all_signals
            .iter()
            .filter(|s| s.detected)
            .map(|s| s.weight)
            .sum();
        let score = raw.min(MAX_SCORE);

        let detected: Vec<Signal> = all_signals.iter().filter(|s| s.detected).cloned().collect();

        let mut by_category: BTreeMap<&'static str, Vec<Signal>> = BTreeMap::new();
        for signal in &all_signals {
            by_category
                .entry(signal.category.as_str())
                .or_default()
                .push(signal.clone());
        }

        let summary = Summary {
            total_checks: all_signals.len(),
            flagged: detected.len(),
            passed: all_signals.len() - detected.len(),
        };

        Self {
            verdict: VerdictLabel::from_score(score),
            score,
            max_score: MAX_SCORE,
            confidence: Confidence::from_score(score),
            signals: detected,
            all_signals,
            signals_by_category: by_category,
            summary,
            code: None,
            reason: None,
        }
    }

    /// Synthetic bot verdict for an analysis call made without the
    /// prerequisite client evidence (code 1005). The weighted sum of an
    /// empty bundle might not reach 100, but the semantics demand a
    /// definite bot label.
    pub fn js_execution_failed() -> Self {
        let signal = Signal::new(
            "jsExecutionFailed",
            100,
            SignalCategory::Automation,
            true,
            "No usable browser data or JS challenge result was submitted",
            "Browser data and JS challenge result present",
        );

        let mut verdict = Verdict::from_signals(vec![signal]);
        verdict.code = Some(CODE_NO_CLIENT_DATA);
        verdict.reason = Some("JavaScript execution could not be verified".to_string());
        verdict
    }

    /// Frozen bot verdict recorded when the visit deadline fires without
    /// an analysis call (code 1006).
    pub fn visit_timed_out(deadline_secs: u64) -> Self {
        let signal = Signal::new(
            "noJsExecution",
            100,
            SignalCategory::Automation,
            true,
            format!(
                "Fetched page but never called /api/bot within {} seconds (no JS execution)",
                deadline_secs
            ),
            "Analysis endpoint was called in time",
        );

        let mut verdict = Verdict::from_signals(vec![signal]);
        verdict.code = Some(CODE_SESSION_TIMEOUT);
        verdict.reason = Some("Never called /api/bot - no JS execution".to_string());
        verdict
    }
}
