use crate::discovery::{discover_specs, select_for_app};
use crate::report::RunSummary;
use crate::runner::Runner;

/// `fri3d-trace-tests [--app <id>] [--json]`: discover specs, run them in
/// order, and print per-spec results plus totals.
///
/// Returns the summary; the caller turns it into the process exit code.
pub fn cmd_run(runner: &Runner, app: Option<&str>, json: bool) -> Result<RunSummary, String> {
    let config = runner.config();
    let mut specs = discover_specs(&config.specs_dir)?;
    if let Some(app) = app {
        specs = select_for_app(specs, app);
    }

    let mut summary = RunSummary::new();

    if specs.is_empty() {
        if json {
            print_json(&summary)?;
        } else {
            println!("No trace specs found.");
        }
        return Ok(summary);
    }

    for spec in &specs {
        if !json {
            println!("Running {}...", config.display_path(spec));
        }
        let outcome = runner.run_spec(spec);
        if !json {
            match &outcome.verdict.diagnostic {
                None => println!("  PASS"),
                Some(diagnostic) => println!("  FAIL: {diagnostic}"),
            }
        }
        summary.push(outcome);
    }

    if json {
        print_json(&summary)?;
    } else {
        println!();
        println!("{}", summary.totals_line());
    }

    Ok(summary)
}

fn print_json(summary: &RunSummary) -> Result<(), String> {
    let report = serde_json::to_string_pretty(&summary.to_json())
        .map_err(|e| format!("serialize error: {e}"))?;
    println!("{report}");
    Ok(())
}
