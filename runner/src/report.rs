use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::runner::Stage;

/// Compute SHA-256 of raw bytes, return hex-encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Pass/fail result for one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    pub diagnostic: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Verdict {
            passed: true,
            diagnostic: None,
        }
    }

    pub fn fail(diagnostic: String) -> Self {
        Verdict {
            passed: false,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Everything recorded about one spec's run.
#[derive(Debug, Clone, Serialize)]
pub struct SpecOutcome {
    pub spec: PathBuf,
    pub app: Option<String>,
    /// Last stage entered; for failures, the stage that failed.
    pub stage: Stage,
    pub verdict: Verdict,
    pub error_kind: Option<&'static str>,
    /// Digest of the produced trace file, once it was read.
    pub trace_sha256: Option<String>,
}

impl SpecOutcome {
    pub fn passed(&self) -> bool {
        self.verdict.passed
    }
}

/// Outcomes of every spec in one run, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<SpecOutcome>,
}

impl RunSummary {
    pub fn new() -> Self {
        RunSummary {
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: SpecOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// True only when at least one spec ran and none failed.
    pub fn all_passed(&self) -> bool {
        !self.outcomes.is_empty() && self.failed() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Human-readable totals line.
    pub fn totals_line(&self) -> String {
        format!(
            "Trace tests: {} passed, {} failed",
            self.passed(),
            self.failed()
        )
    }

    /// Machine-readable report.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "started_at": self.started_at.to_rfc3339(),
            "total": self.outcomes.len(),
            "passed": self.passed(),
            "failed": self.failed(),
            "results": self.outcomes,
        })
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
