use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use fri3d_trace_assert::{verify, verify_exact, Assertion, AssertionFailure, Trace, TraceSpec};

use crate::config::RunnerConfig;
use crate::discovery::{resolve_target, spec_dir_name};
use crate::error::RunError;
use crate::harness::{CommandHarness, Harness, Invocation};
use crate::report::{sha256_hex, RunSummary, SpecOutcome, Verdict};

/// Lifecycle of one spec run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loading,
    Invoking,
    Verifying,
    Done,
}

/// A parsed spec with everything derived from its location.
#[derive(Debug, Clone)]
struct LoadedSpec {
    /// File stem; names the trace, input and baseline files.
    name: String,
    dir: PathBuf,
    app_id: String,
    target: PathBuf,
    spec: TraceSpec,
}

/// Runs specs one at a time: load, invoke the harness, verify the trace.
///
/// Specs share no state; each produces exactly one verdict.
pub struct Runner {
    config: RunnerConfig,
    harness: Box<dyn Harness>,
}

impl Runner {
    pub fn new(config: RunnerConfig, harness: Box<dyn Harness>) -> Self {
        Runner { config, harness }
    }

    /// Runner driving the harness executable named in `config`.
    pub fn with_command_harness(config: RunnerConfig) -> Self {
        let harness = Box::new(CommandHarness::new(config.harness.clone()));
        Runner::new(config, harness)
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every spec in order and collect the outcomes.
    pub fn run_all(&self, specs: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary::new();
        for spec in specs {
            summary.push(self.run_spec(spec));
        }
        summary
    }

    /// Run one spec to completion.
    pub fn run_spec(&self, spec_path: &Path) -> SpecOutcome {
        let mut outcome = SpecOutcome {
            spec: spec_path.to_path_buf(),
            app: None,
            stage: Stage::Loading,
            verdict: Verdict::pass(),
            error_kind: None,
            trace_sha256: None,
        };

        match self.execute(spec_path, &mut outcome) {
            Ok(()) => {
                outcome.stage = Stage::Done;
                info!("{}: pass", self.config.display_path(spec_path));
            }
            Err(e) => {
                info!(
                    "{}: fail during {:?}: {e}",
                    self.config.display_path(spec_path),
                    outcome.stage
                );
                outcome.error_kind = Some(e.kind());
                outcome.verdict = Verdict::fail(e.to_string());
            }
        }

        outcome
    }

    fn execute(&self, spec_path: &Path, outcome: &mut SpecOutcome) -> Result<(), RunError> {
        let loaded = self.load(spec_path)?;
        outcome.app = Some(loaded.app_id.clone());

        enter(outcome, Stage::Invoking, spec_path);
        let trace_path = self.invoke(&loaded)?;

        enter(outcome, Stage::Verifying, spec_path);
        let bytes = fs::read(&trace_path)
            .map_err(|e| RunError::TraceParse(format!("{}: {e}", trace_path.display())))?;
        outcome.trace_sha256 = Some(sha256_hex(&bytes));
        let document: Value = serde_json::from_slice(&bytes)
            .map_err(|e| RunError::TraceParse(format!("{}: {e}", trace_path.display())))?;

        self.check(&loaded, document, &trace_path)
    }

    // ─── Loading ──────────────────────────────────────────────

    fn load(&self, spec_path: &Path) -> Result<LoadedSpec, RunError> {
        let text = fs::read_to_string(spec_path).map_err(|e| RunError::Spec(e.to_string()))?;
        let spec = TraceSpec::from_json(&text).map_err(|e| RunError::Spec(e.to_string()))?;

        let name = spec_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| RunError::Spec(format!("no file name: {}", spec_path.display())))?;
        let dir = spec_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let app_id = spec
            .app
            .clone()
            .filter(|app| !app.is_empty())
            .or_else(|| spec_dir_name(spec_path))
            .ok_or_else(|| RunError::Spec("cannot determine app id".into()))?;

        let target = resolve_target(&self.config.apps_dir, &app_id).ok_or_else(|| {
            RunError::TargetNotFound {
                app: app_id.clone(),
            }
        })?;

        Ok(LoadedSpec {
            name,
            dir,
            app_id,
            target,
            spec,
        })
    }

    // ─── Invoking ─────────────────────────────────────────────

    /// Prepare the per-spec output files, run the harness, and return the
    /// trace path.
    fn invoke(&self, loaded: &LoadedSpec) -> Result<PathBuf, RunError> {
        let output_dir = self.config.output_dir.join(&loaded.app_id);
        fs::create_dir_all(&output_dir).map_err(|e| {
            RunError::Io(format!("cannot create {}: {e}", output_dir.display()))
        })?;

        let trace_path = output_dir.join(format!("{}.json", loaded.name));
        // A trace left over from an earlier run must not pass for this one.
        match fs::remove_file(&trace_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(RunError::Io(format!(
                    "cannot clear {}: {e}",
                    trace_path.display()
                )))
            }
        }

        let spec = &loaded.spec;
        let input = if let Some(input_file) = &spec.input_file {
            Some(loaded.dir.join(input_file))
        } else if let Some(payload) = &spec.input {
            let input_path = output_dir.join(format!("{}_input.json", loaded.name));
            let json = serde_json::to_string_pretty(payload)
                .map_err(|e| RunError::Spec(format!("cannot serialize input: {e}")))?;
            fs::write(&input_path, json).map_err(|e| {
                RunError::Io(format!("cannot write {}: {e}", input_path.display()))
            })?;
            Some(input_path)
        } else {
            None
        };

        let invocation = Invocation {
            app: loaded.target.clone(),
            out: trace_path.clone(),
            frames: spec.frames,
            seed: spec.seed,
            frame_ms: spec.frame_ms,
            app_id: loaded.app_id.clone(),
            mode: spec.mode,
            duration_ms: spec.duration_ms,
            input,
            scene: spec.scene,
        };

        self.harness.run(&invocation).map_err(RunError::Harness)?;

        if !trace_path.is_file() {
            return Err(RunError::TraceMissing(trace_path));
        }
        Ok(trace_path)
    }

    // ─── Verifying ────────────────────────────────────────────

    /// Exact mode compares raw documents; only contains mode builds the
    /// typed event list.
    fn check(
        &self,
        loaded: &LoadedSpec,
        document: Value,
        trace_path: &Path,
    ) -> Result<(), RunError> {
        let assertion = loaded.spec.assertion();
        if assertion != Assertion::Exact {
            let trace =
                Trace::from_value(document).map_err(|e| RunError::TraceParse(e.to_string()))?;
            verify(&trace, assertion, None)?;
            return Ok(());
        }

        let expected_path = self
            .config
            .expected_dir
            .join(&loaded.app_id)
            .join(format!("{}.json", loaded.name));

        if self.config.update_expected {
            return record_baseline(trace_path, &expected_path);
        }

        if !expected_path.is_file() {
            return Err(RunError::ExpectedMissing(expected_path));
        }
        let text = fs::read_to_string(&expected_path).map_err(|e| {
            RunError::TraceParse(format!("expected trace {}: {e}", expected_path.display()))
        })?;
        let expected: Value = serde_json::from_str(&text).map_err(|e| {
            RunError::TraceParse(format!("expected trace {}: {e}", expected_path.display()))
        })?;

        if !verify_exact(&document, &expected) {
            return Err(AssertionFailure::TraceMismatch.into());
        }
        Ok(())
    }
}

fn enter(outcome: &mut SpecOutcome, stage: Stage, spec_path: &Path) {
    debug!("{}: {:?} -> {:?}", spec_path.display(), outcome.stage, stage);
    outcome.stage = stage;
}

/// Copy a produced trace into the baseline location.
fn record_baseline(trace_path: &Path, expected_path: &Path) -> Result<(), RunError> {
    if let Some(parent) = expected_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RunError::Io(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    fs::copy(trace_path, expected_path).map_err(|e| {
        RunError::Io(format!("cannot write {}: {e}", expected_path.display()))
    })?;
    info!("recorded baseline {}", expected_path.display());
    Ok(())
}
