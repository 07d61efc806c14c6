use std::path::{Path, PathBuf};

/// Harness binary, relative to the project root.
const HARNESS_PATH: &str = "build/trace/bin/trace_harness";
/// Built guest apps, one directory per app id.
const APPS_DIR: &str = "build/apps";
const SPECS_DIR: &str = "tests/trace/specs";
const EXPECTED_DIR: &str = "tests/trace/expected";
const OUTPUT_DIR: &str = "tests/trace/output";

/// Filesystem layout and options for a trace test run.
///
/// Passed to the runner at construction; library code never looks up
/// locations on its own.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Project root. Only used to shorten paths in output.
    pub root: PathBuf,
    pub harness: PathBuf,
    pub apps_dir: PathBuf,
    pub specs_dir: PathBuf,
    /// Recorded baselines for `exact` specs: `<expected_dir>/<app>/<name>.json`.
    pub expected_dir: PathBuf,
    /// Produced traces and written input scripts, per app.
    pub output_dir: PathBuf,
    /// Record produced traces as baselines instead of comparing against them.
    pub update_expected: bool,
}

impl RunnerConfig {
    /// Default project layout under `root`.
    pub fn from_root(root: &Path) -> Self {
        RunnerConfig {
            root: root.to_path_buf(),
            harness: root.join(HARNESS_PATH),
            apps_dir: root.join(APPS_DIR),
            specs_dir: root.join(SPECS_DIR),
            expected_dir: root.join(EXPECTED_DIR),
            output_dir: root.join(OUTPUT_DIR),
            update_expected: false,
        }
    }

    /// `path` relative to the project root when it lies under it.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root_layout() {
        let config = RunnerConfig::from_root(Path::new("/work/badge"));
        assert_eq!(config.harness, Path::new("/work/badge/build/trace/bin/trace_harness"));
        assert_eq!(config.apps_dir, Path::new("/work/badge/build/apps"));
        assert_eq!(config.specs_dir, Path::new("/work/badge/tests/trace/specs"));
        assert_eq!(config.expected_dir, Path::new("/work/badge/tests/trace/expected"));
        assert_eq!(config.output_dir, Path::new("/work/badge/tests/trace/output"));
        assert!(!config.update_expected);
    }

    #[test]
    fn test_display_path_strips_root() {
        let config = RunnerConfig::from_root(Path::new("/work/badge"));
        let spec = Path::new("/work/badge/tests/trace/specs/circles/basic.json");
        assert_eq!(
            config.display_path(spec).to_string(),
            "tests/trace/specs/circles/basic.json"
        );
        let outside = Path::new("/tmp/other.json");
        assert_eq!(config.display_path(outside).to_string(), "/tmp/other.json");
    }
}
