//! Process-level tests for the heron binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn heron() -> Command {
    Command::cargo_bin("heron").expect("heron binary builds")
}

fn base_args(cmd: &mut Command) -> &mut Command {
    cmd.args([
        "--mode",
        "trial",
        "--business",
        "acme",
        "--artifact-id",
        "ACME-MARKET",
        "--before-sha",
        "aaa1111",
        "--after-sha",
        "bbb2222",
        "--path",
        "market.md",
    ])
}

#[test]
fn t1_section_dispatches_fact_find_packet() {
    let mut cmd = heron();
    base_args(&mut cmd)
        .args(["--section", "Target Customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\": true"))
        .stdout(predicate::str::contains("fact_find_ready"))
        .stdout(predicate::str::contains("lp-do-fact-find"));
}

#[test]
fn non_t1_section_dispatches_briefing_packet() {
    let mut cmd = heron();
    base_args(&mut cmd)
        .args(["--section", "Competitor Table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("briefing_ready"))
        .stdout(predicate::str::contains("lp-do-briefing"));
}

#[test]
fn metadata_only_section_is_a_noop() {
    let mut cmd = heron();
    base_args(&mut cmd)
        .args(["--section", "Last Updated"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dispatched\": []"))
        .stdout(predicate::str::contains("\"noop\": 1"))
        .stdout(predicate::str::contains("\"non_material_delta\": 1"));
}

#[test]
fn live_mode_fails_with_json_error() {
    let mut cmd = heron();
    cmd.args([
        "--mode",
        "live",
        "--business",
        "acme",
        "--artifact-id",
        "ACME-MARKET",
        "--after-sha",
        "bbb2222",
        "--path",
        "market.md",
    ])
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::contains("\"ok\": false"))
    .stdout(predicate::str::contains("live"));
}

#[test]
fn missing_required_flags_exit_with_usage_error() {
    heron()
        .args(["--mode", "trial"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unknown_phase_is_an_invocation_error() {
    let mut cmd = heron();
    base_args(&mut cmd)
        .args(["--section", "Pricing", "--phase", "P9"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("unknown cutover phase"));
}

#[test]
fn registry_file_gates_unknown_artifacts() {
    let mut registry = tempfile::NamedTempFile::new().expect("temp registry");
    write!(
        registry,
        r#"{{"artifacts": [{{
            "artifact_id": "OTHER-DOC",
            "path": null,
            "active": true,
            "artifact_class": "source_process",
            "trigger_policy": "eligible"
        }}]}}"#
    )
    .expect("write registry");

    let mut cmd = heron();
    base_args(&mut cmd)
        .args(["--section", "Pricing"])
        .arg("--registry")
        .arg(registry.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dispatched\": []"))
        .stdout(predicate::str::contains("\"unknown_artifact\": 1"));
}

#[test]
fn malformed_registry_file_fails_closed() {
    let mut registry = tempfile::NamedTempFile::new().expect("temp registry");
    write!(registry, "{{ not json }}").expect("write registry");

    let mut cmd = heron();
    base_args(&mut cmd)
        .args(["--section", "Pricing"])
        .arg("--registry")
        .arg(registry.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"ok\": false"));
}

#[test]
fn first_registration_is_a_noop() {
    heron()
        .args([
            "--mode",
            "trial",
            "--business",
            "acme",
            "--artifact-id",
            "ACME-MARKET",
            "--after-sha",
            "bbb2222",
            "--path",
            "market.md",
            "--section",
            "Pricing",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"noop\": 1"))
        .stdout(predicate::str::contains("\"first_registration\": 1"));
}
