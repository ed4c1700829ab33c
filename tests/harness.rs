//! Golden-file test harness for zenoscript.
//!
//! Discovers `.input.zs` files under `tests/fixtures/golden/`, transpiles
//! them, and compares the result against the sibling `.expected.ts` file.
//! Files under `tests/fixtures/roundtrip/` only need to produce TypeScript
//! that SWC accepts.
//!
//! Set `ZS_UPDATE_FIXTURES=1` to overwrite expected files with actual output.

use zs_test::{
    collect_input_files, expected_path, fixtures_dir, run_pipeline, verify_valid_typescript,
};

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir().join("golden");
    let input_files = collect_input_files(&fixtures);

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("ZS_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let expected_path = expected_path(input_path);
        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap()
            .display()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read input: {e}"));
                continue;
            }
        };

        let actual = match run_pipeline(&source) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if update_mode {
            if let Err(e) = std::fs::write(&expected_path, &actual) {
                failures.push(format!("{test_name}: failed to write expected: {e}"));
            }
            continue;
        }

        let expected = match std::fs::read_to_string(&expected_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!(
                    "{test_name}: failed to read {}: {e}",
                    expected_path.display()
                ));
                continue;
            }
        };
        if actual.trim() != expected.trim() {
            failures.push(format!(
                "{test_name}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            ));
            continue;
        }

        if let Err(e) = verify_valid_typescript(&actual, &format!("{test_name}.ts")) {
            failures.push(format!("{test_name}: {e:#}"));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

#[test]
fn roundtrip_tests() {
    let fixtures = fixtures_dir().join("roundtrip");
    let input_files = collect_input_files(&fixtures);

    assert!(
        !input_files.is_empty(),
        "No roundtrip fixtures found in {}",
        fixtures.display()
    );

    let mut failures = Vec::new();

    for input_path in &input_files {
        let test_name = input_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let output = match run_pipeline(&source) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if let Err(e) = verify_valid_typescript(&output, &format!("{test_name}.ts")) {
            failures.push(format!(
                "{test_name}: {e:#}\n--- output ---\n{}",
                output.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} roundtrip test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}
