use thiserror::Error;

use crate::event::Pattern;

/// Failure to load a trace or spec document into the typed model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("trace document must be a JSON object")]
    NotAnObject,

    #[error("`events` must be an array")]
    EventsNotArray,

    #[error("invalid event at index {index}: {source}")]
    InvalidEvent {
        index: usize,
        source: serde_json::Error,
    },

    #[error("frame regressed at event {index}: {frame} after {previous}")]
    FrameRegression {
        index: usize,
        frame: u64,
        previous: u64,
    },
}

/// The first violation a verifier found in an otherwise well-formed trace.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertionFailure {
    #[error("missing required event: {pattern}")]
    MissingEvent { pattern: Pattern },

    #[error("expected at least {expected} calls to {function}, got {got}")]
    TooFewCalls {
        function: String,
        expected: u64,
        got: u64,
    },

    #[error("trace does not match expected output")]
    TraceMismatch,
}
