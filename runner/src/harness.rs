use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use log::debug;

use fri3d_trace_assert::RenderMode;

/// One harness run, as passed on its command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub app: PathBuf,
    pub out: PathBuf,
    pub frames: u32,
    pub seed: u64,
    pub frame_ms: u32,
    pub app_id: String,
    pub mode: RenderMode,
    pub duration_ms: Option<u64>,
    pub input: Option<PathBuf>,
    pub scene: Option<i64>,
}

impl Invocation {
    /// Command-line arguments in the harness's expected order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--app".into(),
            self.app.clone().into(),
            "--out".into(),
            self.out.clone().into(),
            "--frames".into(),
            self.frames.to_string().into(),
            "--seed".into(),
            self.seed.to_string().into(),
            "--frame-ms".into(),
            self.frame_ms.to_string().into(),
            "--app-id".into(),
            self.app_id.clone().into(),
            "--mode".into(),
            self.mode.as_str().into(),
        ];
        if let Some(duration_ms) = self.duration_ms {
            args.push("--duration-ms".into());
            args.push(duration_ms.to_string().into());
        }
        if let Some(input) = &self.input {
            args.push("--input".into());
            args.push(input.clone().into());
        }
        if let Some(scene) = self.scene {
            args.push("--scene".into());
            args.push(scene.to_string().into());
        }
        args
    }
}

/// The instrumented runtime that turns a guest app into a trace file.
///
/// `run` blocks until the harness finishes. On failure it returns the
/// harness's own diagnostic output.
pub trait Harness {
    fn run(&self, invocation: &Invocation) -> Result<(), String>;
}

/// Runs an external harness executable as a subprocess.
///
/// No timeout is imposed; callers that need one wrap the whole run.
pub struct CommandHarness {
    program: PathBuf,
}

impl CommandHarness {
    pub fn new(program: PathBuf) -> Self {
        CommandHarness { program }
    }
}

impl Harness for CommandHarness {
    fn run(&self, invocation: &Invocation) -> Result<(), String> {
        if !self.program.exists() {
            return Err(format!(
                "trace harness not found at {}",
                self.program.display()
            ));
        }

        let args = invocation.args();
        debug!(
            "running {} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| format!("failed to run trace harness: {e}"))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("trace harness failed");
        Err(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        Invocation {
            app: PathBuf::from("build/apps/circles/circles.wasm"),
            out: PathBuf::from("out/circles/basic.json"),
            frames: 3,
            seed: 42,
            frame_ms: 16,
            app_id: "circles".into(),
            mode: RenderMode::Fixed,
            duration_ms: None,
            input: None,
            scene: None,
        }
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_args_required_only() {
        assert_eq!(
            strings(invocation().args()),
            vec![
                "--app", "build/apps/circles/circles.wasm",
                "--out", "out/circles/basic.json",
                "--frames", "3",
                "--seed", "42",
                "--frame-ms", "16",
                "--app-id", "circles",
                "--mode", "fixed",
            ]
        );
    }

    #[test]
    fn test_args_optional_tail() {
        let inv = Invocation {
            mode: RenderMode::Event,
            duration_ms: Some(2000),
            input: Some(PathBuf::from("out/circles/basic_input.json")),
            scene: Some(1),
            ..invocation()
        };
        let args = strings(inv.args());
        assert_eq!(
            &args[12..],
            &[
                "--mode", "event",
                "--duration-ms", "2000",
                "--input", "out/circles/basic_input.json",
                "--scene", "1",
            ]
        );
    }

    #[test]
    fn test_missing_harness_binary() {
        let harness = CommandHarness::new(PathBuf::from("/nonexistent/trace_harness"));
        let err = harness.run(&invocation()).unwrap_err();
        assert_eq!(err, "trace harness not found at /nonexistent/trace_harness");
    }
}
