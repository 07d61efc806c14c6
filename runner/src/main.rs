use std::path::PathBuf;
use std::process;

use clap::Parser;

use fri3d_trace_runner::cli;
use fri3d_trace_runner::{Runner, RunnerConfig};

#[derive(Parser)]
#[command(name = "fri3d-trace-tests", about = "Trace-based integration tests for guest apps")]
struct Cli {
    /// Run tests only for a specific app id.
    #[arg(long)]
    app: Option<String>,

    /// Project root directory (default: current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Trace harness binary (default: <root>/build/trace/bin/trace_harness)
    #[arg(long)]
    harness: Option<PathBuf>,

    /// Built apps directory (default: <root>/build/apps)
    #[arg(long)]
    apps_dir: Option<PathBuf>,

    /// Spec directory (default: <root>/tests/trace/specs)
    #[arg(long)]
    specs_dir: Option<PathBuf>,

    /// Baseline traces for exact specs (default: <root>/tests/trace/expected)
    #[arg(long)]
    expected_dir: Option<PathBuf>,

    /// Where traces and input scripts are written (default: <root>/tests/trace/output)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Record produced traces as baselines for exact specs.
    #[arg(long)]
    update_expected: bool,

    /// Print a machine-readable JSON report instead of progress lines.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::from_root(&self.root);
        if let Some(harness) = &self.harness {
            config.harness = harness.clone();
        }
        if let Some(dir) = &self.apps_dir {
            config.apps_dir = dir.clone();
        }
        if let Some(dir) = &self.specs_dir {
            config.specs_dir = dir.clone();
        }
        if let Some(dir) = &self.expected_dir {
            config.expected_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.update_expected = self.update_expected;
        config
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let runner = Runner::with_command_harness(cli.config());

    match cli::cmd_run(&runner, cli.app.as_deref(), cli.json) {
        Ok(summary) => process::exit(summary.exit_code()),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
