use std::path::PathBuf;

use thiserror::Error;

use fri3d_trace_assert::AssertionFailure;

/// Why one spec failed. Fatal to that spec only, never to the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to load spec: {0}")]
    Spec(String),

    #[error("app binary not found for {app}")]
    TargetNotFound { app: String },

    #[error("{0}")]
    Harness(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("trace output missing: {}", .0.display())]
    TraceMissing(PathBuf),

    #[error("failed to load trace: {0}")]
    TraceParse(String),

    #[error("expected trace not found: {}", .0.display())]
    ExpectedMissing(PathBuf),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
}

impl RunError {
    /// Stable identifier for machine-readable reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Spec(_) => "spec_error",
            RunError::TargetNotFound { .. } => "target_not_found",
            RunError::Harness(_) => "harness_error",
            RunError::Io(_) => "io_error",
            RunError::TraceMissing(_) => "trace_missing",
            RunError::TraceParse(_) => "trace_parse_error",
            RunError::ExpectedMissing(_) => "expected_missing",
            RunError::Assertion(_) => "assertion_failure",
        }
    }
}
