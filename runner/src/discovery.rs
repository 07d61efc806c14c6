use std::fs;
use std::path::{Path, PathBuf};

use fri3d_trace_assert::TraceSpec;

/// All `*.json` spec files under `specs_dir`, recursively, sorted by path.
///
/// A missing directory has no specs.
pub fn discover_specs(specs_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut specs = Vec::new();
    if specs_dir.is_dir() {
        collect_json(specs_dir, &mut specs)?;
    }
    specs.sort();
    Ok(specs)
}

fn collect_json(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries =
        fs::read_dir(dir).map_err(|e| format!("cannot read {}: {e}", dir.display()))?;
    for entry in entries {
        let entry = entry.map_err(|e| format!("entry error in {}: {e}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_json(&path, out)?;
        } else if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Name of the directory holding a spec file.
pub fn spec_dir_name(spec_path: &Path) -> Option<String> {
    spec_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

/// Keep the specs that belong to `app_id`: by directory name, or by the
/// spec's own `app` field. Unreadable specs are kept only on a directory
/// match, so they still surface as failures when run.
pub fn select_for_app(specs: Vec<PathBuf>, app_id: &str) -> Vec<PathBuf> {
    specs
        .into_iter()
        .filter(|path| {
            if spec_dir_name(path).as_deref() == Some(app_id) {
                return true;
            }
            fs::read_to_string(path)
                .ok()
                .and_then(|text| TraceSpec::from_json(&text).ok())
                .is_some_and(|spec| spec.app.as_deref() == Some(app_id))
        })
        .collect()
}

/// Locate the built guest binary for `app_id` under `apps_dir`.
///
/// Tries `<app>.wasm`, then `<app>`, then the first `*.wasm` in the app's
/// directory.
pub fn resolve_target(apps_dir: &Path, app_id: &str) -> Option<PathBuf> {
    let dir = apps_dir.join(app_id);
    if !dir.is_dir() {
        return None;
    }

    for name in [format!("{app_id}.wasm"), app_id.to_string()] {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let mut wasm: Vec<PathBuf> = fs::read_dir(&dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "wasm"))
        .collect();
    wasm.sort();
    wasm.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let specs = discover_specs(&dir.path().join("nope")).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_discover_recursive_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("snake/b.json"), "{}");
        touch(&root.join("circles/z.json"), "{}");
        touch(&root.join("circles/a.json"), "{}");
        touch(&root.join("circles/notes.txt"), "");
        touch(&root.join("circles/input/script.json"), "[]");

        let specs = discover_specs(root).unwrap();
        let rel: Vec<String> = specs
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            rel,
            vec!["circles/a.json", "circles/input/script.json", "circles/z.json", "snake/b.json"]
        );
    }

    #[test]
    fn test_select_by_dir_or_app_field() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("circles/basic.json"), "{}");
        touch(&root.join("shared/circles_seed.json"), r#"{"app":"circles"}"#);
        touch(&root.join("shared/snake.json"), r#"{"app":"snake"}"#);
        touch(&root.join("shared/broken.json"), "{");

        let specs = discover_specs(root).unwrap();
        let selected = select_for_app(specs, "circles");
        assert_eq!(
            selected,
            vec![root.join("circles/basic.json"), root.join("shared/circles_seed.json")]
        );
    }

    #[test]
    fn test_resolve_prefers_named_wasm() {
        let dir = tempfile::tempdir().unwrap();
        let apps = dir.path();
        touch(&apps.join("circles/aaa.wasm"), "");
        touch(&apps.join("circles/circles"), "");
        touch(&apps.join("circles/circles.wasm"), "");
        assert_eq!(resolve_target(apps, "circles"), Some(apps.join("circles/circles.wasm")));
    }

    #[test]
    fn test_resolve_falls_back_to_bare_name_then_any_wasm() {
        let dir = tempfile::tempdir().unwrap();
        let apps = dir.path();
        touch(&apps.join("snake/snake"), "");
        touch(&apps.join("snake/other.wasm"), "");
        assert_eq!(resolve_target(apps, "snake"), Some(apps.join("snake/snake")));

        touch(&apps.join("dots/zeta.wasm"), "");
        touch(&apps.join("dots/alpha.wasm"), "");
        assert_eq!(resolve_target(apps, "dots"), Some(apps.join("dots/alpha.wasm")));
    }

    #[test]
    fn test_resolve_missing() {
        let dir = tempfile::tempdir().unwrap();
        let apps = dir.path();
        assert_eq!(resolve_target(apps, "ghost"), None);
        fs::create_dir_all(apps.join("empty")).unwrap();
        assert_eq!(resolve_target(apps, "empty"), None);
    }
}
