//! Fixture discovery and pipeline helpers for the golden-file harness.
//!
//! Fixtures live under `tests/fixtures/` at the workspace root:
//! - `golden/**/NAME.input.zs` with a sibling `NAME.expected.ts`
//! - `roundtrip/**/NAME.input.zs`, whose output must parse as TypeScript

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zs_ast::TranspileOptions;

pub const INPUT_SUFFIX: &str = ".input.zs";
pub const EXPECTED_SUFFIX: &str = ".expected.ts";

pub fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/zs_test/, so go up two levels to workspace root.
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
}

/// Every `*.input.zs` file below `dir`, sorted.
pub fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir(dir)
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(INPUT_SUFFIX))
        })
        .collect();
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

/// `foo.input.zs` → `foo.expected.ts`.
pub fn expected_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(INPUT_SUFFIX))
        .unwrap_or_default();
    input.with_file_name(format!("{name}{EXPECTED_SUFFIX}"))
}

/// Transpile with default options.
pub fn run_pipeline(source: &str) -> Result<String> {
    Ok(zs_desugar::transpile(source, &TranspileOptions::default())?)
}

/// Parse `output` as TypeScript.
pub fn verify_valid_typescript(output: &str, filename: &str) -> Result<()> {
    zs_parser::parse_typescript(output, filename)
        .with_context(|| format!("{filename} is not valid TypeScript"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_path_swaps_suffix() {
        assert_eq!(
            expected_path(Path::new("a/b/pipes.input.zs")),
            PathBuf::from("a/b/pipes.expected.ts")
        );
    }
}
