use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn interactive_reduce_follows_answers() {
    let temp = TempDir::new().expect("tmp dir");
    let elements = temp.path().join("mods.txt");
    fs::write(&elements, "A\nB\nC\n").expect("write elements");

    // Full set, then [C] after dropping the leading chunk [A, B].
    let output = cargo_bin_cmd!("ddmin")
        .arg("reduce")
        .arg(&elements)
        .arg("--interactive")
        .write_stdin("y\ny\n")
        .output()
        .expect("run ddmin");
    assert_eq!(output.status.code(), Some(0));

    let json: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(json["status"], "reduced");
    assert_eq!(json["invocation"]["oracle"], "interactive");
    assert_eq!(json["reduction"]["elements"], serde_json::json!(["C"]));
    assert_eq!(json["reduction"]["stats"]["oracle_calls"], 2);

    let prompts = String::from_utf8(output.stderr).expect("utf8 stderr");
    assert!(prompts.contains("Testing (3 elements):"));
    assert!(prompts.contains("Testing (1 elements):\n  C\n"));
}

#[test]
fn interactive_no_on_full_set_is_nothing_to_reduce() {
    let temp = TempDir::new().expect("tmp dir");
    let elements = temp.path().join("mods.txt");
    fs::write(&elements, "A\nB\n").expect("write elements");

    cargo_bin_cmd!("ddmin")
        .arg("reduce")
        .arg(&elements)
        .args(["--interactive", "--format", "text"])
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stdout(contains("status=nothing_to_reduce exit_code=1"));
}

#[test]
fn interactive_end_of_input_is_a_tool_error() {
    let temp = TempDir::new().expect("tmp dir");
    let elements = temp.path().join("mods.txt");
    fs::write(&elements, "A\nB\n").expect("write elements");

    cargo_bin_cmd!("ddmin")
        .arg("reduce")
        .arg(&elements)
        .arg("--interactive")
        .write_stdin("y\n")
        .assert()
        .code(2)
        .stderr(contains("tool error: interactive oracle: unexpected end of input"));
}
