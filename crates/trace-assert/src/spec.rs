use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::event::Pattern;

/// How the produced trace is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedMode {
    /// Byte-for-byte structural equality with a recorded baseline.
    Exact,
    /// Required patterns plus minimum call counts.
    #[default]
    Contains,
}

/// Render schedule the harness uses for the guest program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Fixed,
    Event,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Fixed => "fixed",
            RenderMode::Event => "event",
        }
    }
}

/// A `{fn, min}` minimum-count rule.
///
/// Both fields are optional on disk; a rule missing either is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountRule {
    #[serde(rename = "fn", default)]
    pub function: Option<String>,
    #[serde(default)]
    pub min: Option<u64>,
}

impl CountRule {
    pub fn new(function: &str, min: u64) -> Self {
        CountRule {
            function: Some(function.to_string()),
            min: Some(min),
        }
    }

    /// The `(fn, min)` pair, or `None` when the rule is incomplete.
    pub fn resolved(&self) -> Option<(&str, u64)> {
        match (self.function.as_deref(), self.min) {
            (Some(function), Some(min)) if !function.is_empty() => Some((function, min)),
            _ => None,
        }
    }
}

fn default_frames() -> u32 {
    1
}

fn default_seed() -> u64 {
    42
}

fn default_frame_ms() -> u32 {
    16
}

fn default_ordered() -> bool {
    true
}

/// Declarative expected behavior for one app run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSpec {
    /// App id. Falls back to the spec's directory name when absent.
    #[serde(default)]
    pub app: Option<String>,

    // Execution parameters
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub scene: Option<i64>,
    /// Inline input script, written to a file before the run.
    #[serde(default)]
    pub input: Option<Value>,
    /// Input script path, relative to the spec file.
    #[serde(default)]
    pub input_file: Option<PathBuf>,

    // Assertions
    #[serde(default)]
    pub expected_mode: ExpectedMode,
    #[serde(default)]
    pub required: Vec<Pattern>,
    #[serde(default = "default_ordered")]
    pub ordered: bool,
    #[serde(default)]
    pub min_calls: Vec<CountRule>,
}

/// The assertion a spec asks for, with its spec fragment borrowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assertion<'a> {
    Exact,
    Contains {
        required: &'a [Pattern],
        ordered: bool,
        min_calls: &'a [CountRule],
    },
}

impl TraceSpec {
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn assertion(&self) -> Assertion<'_> {
        match self.expected_mode {
            ExpectedMode::Exact => Assertion::Exact,
            ExpectedMode::Contains => Assertion::Contains {
                required: &self.required,
                ordered: self.ordered,
                min_calls: &self.min_calls,
            },
        }
    }
}

impl Default for TraceSpec {
    fn default() -> Self {
        TraceSpec {
            app: None,
            frames: default_frames(),
            seed: default_seed(),
            frame_ms: default_frame_ms(),
            mode: RenderMode::default(),
            duration_ms: None,
            scene: None,
            input: None,
            input_file: None,
            expected_mode: ExpectedMode::default(),
            required: Vec::new(),
            ordered: default_ordered(),
            min_calls: Vec::new(),
        }
    }
}
