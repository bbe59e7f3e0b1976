use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SKILLS_YAML: &str = r#"
version: "1.0"
skills:
  - name: tdd
    provides: [test_written, test_green]
    risk: low
    cost: low
    tier: hard
    tool_policy:
      deny_until:
        write_impl:
          until: test_written
          reason: Write test first
        commit:
          until: test_green
          reason: Tests must pass
"#;

const PROFILES_YAML: &str = r#"
version: "1.0"
profiles:
  - name: bug-fix
    description: Fix a bug test-first
    capabilities_required: [test_written, test_green]
    strictness: strict
  - name: wishful
    capabilities_required: [nonexistent_cap]
"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let claude = dir.path().join(".claude");
    std::fs::create_dir_all(&claude).unwrap();
    std::fs::write(claude.join("skills.yaml"), SKILLS_YAML).unwrap();
    std::fs::write(claude.join("profiles.yaml"), PROFILES_YAML).unwrap();
    dir
}

fn sc(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sc").unwrap();
    cmd.arg("--workspace").arg(dir.path());
    // isolate from any enclosing agent session or operator config
    cmd.env_remove("CLAUDE_SESSION_ID");
    cmd.env_remove("SC_CONFIG");
    cmd.env_remove("SC_SKILLS_CATALOG");
    cmd.env_remove("SC_PROFILES_CATALOG");
    cmd.env_remove("SC_STATE_DIR");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sc").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sc").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn resolve_prints_chain() {
    let dir = workspace();
    sc(&dir)
        .args(["resolve", "bug-fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tdd"));
}

#[test]
fn resolve_with_warnings_exits_nonzero() {
    let dir = workspace();
    sc(&dir)
        .args(["resolve", "wishful"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No skill provides"));
}

#[test]
fn resolve_unknown_profile_is_an_error() {
    let dir = workspace();
    sc(&dir)
        .args(["resolve", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn robot_error_output_is_json() {
    let dir = workspace();
    let output = sc(&dir)
        .args(["--robot", "resolve", "ghost"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["error"], true);
    assert_eq!(parsed["code"], "PROFILE_NOT_FOUND");
    assert_eq!(parsed["numeric_code"], 102);
}

#[test]
fn activate_then_status_reports_progress() {
    let dir = workspace();
    sc(&dir)
        .args(["activate", "bug-fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bug-fix"));

    sc(&dir)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0/2"))
        .stdout(predicate::str::contains("tdd"));
}

#[test]
fn status_without_session_fails() {
    let dir = workspace();
    sc(&dir)
        .args(["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active session"));
}

#[test]
fn status_json_is_machine_readable() {
    let dir = workspace();
    sc(&dir).args(["activate", "bug-fix"]).assert().success();

    let output = sc(&dir)
        .args(["status", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["data"]["complete"], false);
    assert_eq!(parsed["data"]["current_skill"], "tdd");
}

#[test]
fn satisfy_advances_the_chain() {
    let dir = workspace();
    sc(&dir).args(["activate", "bug-fix"]).assert().success();

    sc(&dir)
        .args(["satisfy", "test_written"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test_written"));
    sc(&dir)
        .args(["satisfy", "test_green"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPLETE"));
}

#[test]
fn hook_denies_then_allows_after_evidence() {
    let dir = workspace();
    sc(&dir).args(["activate", "bug-fix"]).assert().success();

    let payload = r#"{"tool_name":"Write","tool_input":{"file_path":"src/foo.ts"}}"#;
    let output = sc(&dir)
        .args(["hook", "pre-tool-use"])
        .write_stdin(payload)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["hookSpecificOutput"]["permissionDecision"], "deny");
    assert!(
        parsed["hookSpecificOutput"]["permissionDecisionReason"]
            .as_str()
            .unwrap()
            .contains("Write test first")
    );

    sc(&dir).args(["satisfy", "test_written"]).assert().success();

    let output = sc(&dir)
        .args(["hook", "pre-tool-use"])
        .write_stdin(payload)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["hookSpecificOutput"]["permissionDecision"], "allow");
}

#[test]
fn hook_with_malformed_payload_allows() {
    let dir = workspace();
    let output = sc(&dir)
        .args(["hook", "pre-tool-use"])
        .write_stdin("not json at all")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["hookSpecificOutput"]["permissionDecision"], "allow");
}

#[test]
fn sessions_list_and_clear() {
    let dir = workspace();
    sc(&dir).args(["activate", "bug-fix"]).assert().success();

    sc(&dir)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());

    sc(&dir)
        .args(["sessions", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));

    sc(&dir)
        .args(["status"])
        .assert()
        .failure();
}

#[test]
fn mermaid_renders_flowchart() {
    let dir = workspace();
    sc(&dir)
        .args(["mermaid", "bug-fix"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("flowchart TD"));
}

#[test]
fn explain_lists_selection_reasons() {
    let dir = workspace();
    sc(&dir)
        .args(["explain", "bug-fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provides"));
}

#[test]
fn malformed_catalog_refuses_to_operate() {
    let dir = workspace();
    std::fs::write(
        dir.path().join(".claude/skills.yaml"),
        "skills:\n  - name: a\n  - name: a\n",
    )
    .unwrap();
    sc(&dir)
        .args(["resolve", "bug-fix"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid catalog"));
}
