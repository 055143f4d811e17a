use std::path::Path;
use std::process::Command;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use rstest::rstest;

fn jq_available() -> bool {
    Command::new("jq")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn sample_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sample")
}

#[rstest]
#[case::no_arguments(&[])]
#[case::help(&["--help"])]
#[case::verbose_only(&["-v"])]
fn test_prints_usage(#[case] args: &[&str]) {
    cargo_bin_cmd!("starq")
        .args(args)
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--append-rule"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("starq")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load transformers"))
        .stderr(predicate::str::contains("absent.yaml"));
}

#[cfg(unix)]
#[test]
fn test_stdin_yaml_through_identity_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("passthrough.yaml");
    std::fs::write(&config, "output:\n  format: json\nrules: []\n").unwrap();

    cargo_bin_cmd!("starq")
        .args(["--jq", "cat"])
        .arg(&config)
        .write_stdin("name: starq\ncount: 2\n")
        .assert()
        .success()
        .stdout("{\"name\":\"starq\",\"count\":2}\n");
}

#[cfg(unix)]
#[test]
fn test_engine_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("passthrough.yaml");
    std::fs::write(&config, "rules: []\n").unwrap();

    cargo_bin_cmd!("starq")
        .env("STARQ_JQ", "cat")
        .arg(&config)
        .write_stdin("a: 1\n---\nb: 2\n")
        .assert()
        .success()
        .stdout("a: 1\n---\nb: 2\n");
}

#[cfg(unix)]
#[test]
fn test_verbose_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("passthrough.yaml");
    std::fs::write(&config, "output:\n  format: json\nrules: []\n").unwrap();

    cargo_bin_cmd!("starq")
        .args(["-v", "--jq", "cat"])
        .arg(&config)
        .write_stdin("a: 1\n")
        .assert()
        .success()
        .stdout("{\"a\":1}\n")
        .stderr(predicate::str::contains("Engine: cat"))
        .stderr(predicate::str::contains("Running 1 config files"));
}

#[test]
fn test_missing_engine_fails() {
    cargo_bin_cmd!("starq")
        .args(["--jq", "starq-no-such-engine", "-r", "."])
        .write_stdin("a: 1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to start starq-no-such-engine"));
}

#[test]
fn test_rule_over_stdin() {
    if !jq_available() {
        eprintln!("jq not found, skipping");
        return;
    }
    let petstore = std::fs::read(sample_dir().join("input/petstore-openapi.json")).unwrap();

    cargo_bin_cmd!("starq")
        .args(["-r", ".info.title"])
        .write_stdin(petstore)
        .assert()
        .success()
        .stdout("Swagger Petstore\n");
}

#[test]
fn test_invalid_rule_exits_with_engine_failure() {
    if !jq_available() {
        eprintln!("jq not found, skipping");
        return;
    }

    cargo_bin_cmd!("starq")
        .args(["-a", "invalid"])
        .write_stdin("a: 1\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("compile error"))
        .stderr(predicate::str::contains("failed to run jq: exit status: 3"));
}

#[test]
fn test_readonly_sample_project() {
    if !jq_available() {
        eprintln!("jq not found, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::create_dir_all(dir.path().join("input")).unwrap();
    std::fs::copy(
        sample_dir().join("config/petstore-json-to-readonly.yaml"),
        dir.path().join("config/petstore-json-to-readonly.yaml"),
    )
    .unwrap();
    std::fs::copy(
        sample_dir().join("input/petstore-openapi.json"),
        dir.path().join("input/petstore-openapi.json"),
    )
    .unwrap();

    cargo_bin_cmd!("starq")
        .arg(dir.path().join("config/petstore-json-to-readonly.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let output = dir.path().join("output/petstore-openapi-readonly.json");
    let doc: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output).unwrap()).unwrap();
    assert!(doc["paths"]["/pets"].get("get").is_some());
    assert!(doc["paths"]["/pets"].get("post").is_none());
    assert!(doc["paths"]["/pets/{petId}"].get("get").is_some());
}
