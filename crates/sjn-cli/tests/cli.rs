// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Integration tests for the `sjn` binary. Each test runs the built
//! executable with colors off and checks stdout/stderr.

use std::io::Write;
use std::process::{Command, Output};

fn sjn(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sjn"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("SJN_UNIT_MS")
        .env_remove("SJN_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sjn")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Index of `needle` in `haystack`, failing loudly if absent.
fn pos(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{}` not in output:\n{}", needle, haystack))
}

#[test]
fn run_admits_default_cast_shortest_first() {
    let out = sjn(&["run", "--unit-ms", "5"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = stdout(&out);

    let w4 = pos(&text, "Writer 4 is writing for 1 unit.");
    let r3 = pos(&text, "Reader 3 is reading for 2 units.");
    let r1 = pos(&text, "Reader 1 is reading for 3 units.");
    let w2 = pos(&text, "Writer 2 is writing for 5 units.");
    assert!(w4 < r3 && r3 < r1 && r1 < w2);
    assert!(text.contains("Writer 2 finished writing."));
    assert!(text.contains("Admission order: W4 R3 R1 W2"));
}

#[test]
fn show_prints_expected_order() {
    let out = sjn(&["show"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("\"unit_ms\": 1000"));
    assert!(text.contains("Expected admission order: W4 R3 R1 W2"));
}

#[test]
fn scenario_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "unit_ms": 3,
            "participants": [
                {{ "id": 1, "role": "reader", "duration": 3 }},
                {{ "id": 2, "role": "writer", "duration": 1 }},
                {{ "id": 3, "role": "reader", "duration": 2 }}
            ]
        }}"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap();

    let out = sjn(&["run", "--scenario", path]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Admission order: W2 R3 R1"));
}

#[test]
fn env_unit_applies_when_no_flag() {
    let out = Command::new(env!("CARGO_BIN_EXE_sjn"))
        .arg("show")
        .env("NO_COLOR", "1")
        .env("SJN_UNIT_MS", "40")
        .output()
        .unwrap();
    assert!(stdout(&out).contains("\"unit_ms\": 40"));
}

#[test]
fn invalid_scenario_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "participants": [ {{ "id": 1, "role": "reader", "duration": 0 }} ] }}"#
    )
    .unwrap();
    let out = sjn(&["run", "-s", file.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("participant 1 has a zero duration"));
}

#[test]
fn unknown_flag_is_usage_error() {
    let out = sjn(&["--fast"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown command or flag: --fast"));
}

#[test]
fn version_prints_package_version() {
    let out = sjn(&["version"]);
    assert_eq!(stdout(&out).trim(), format!("sjn {}", env!("CARGO_PKG_VERSION")));
}
