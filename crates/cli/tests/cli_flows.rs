use predicates::prelude::*;
use std::fs;
use std::path::Path;
use assert_cmd::Command;
use tempfile::TempDir;

fn context_patch(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("context-patch"));
    cmd.env_remove("CONTEXT_PATCH_CONFIG")
        .env("XDG_CONFIG_HOME", root.join(".no-user-config"))
        .env("RUST_LOG", "warn")
        .arg("--root")
        .arg(root);
    cmd
}

fn project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    fs::write(temp.path().join("a.py"), "x=1").expect("seed a.py");
    fs::create_dir_all(temp.path().join("node_modules")).expect("node_modules");
    fs::write(temp.path().join("node_modules/b.js"), "module.exports = 1").expect("seed b.js");
    temp
}

#[test]
fn context_json_lists_admitted_files() {
    let temp = project();

    let output = context_patch(temp.path())
        .args(["context", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let files = json["files"].as_object().expect("files map");
    assert_eq!(files.len(), 1);
    assert_eq!(files["a.py"], "x=1");
    assert_eq!(json["stats"]["admitted"], 1);
}

#[test]
fn apply_with_yes_writes_and_backs_up() {
    let temp = project();
    let response = temp.path().join("response.md");
    fs::write(&response, "Here you go.\n\nFILE: a.py\n```python\nx=2\n```\n").unwrap();

    context_patch(temp.path())
        .arg("apply")
        .arg(&response)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "created 0, overwritten 1, skipped 0, failed 0",
        ));

    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=2\n");
    assert_eq!(fs::read_to_string(temp.path().join("a.py.bak")).unwrap(), "x=1");
}

#[test]
fn apply_reads_stdin_and_reports_json() {
    let temp = project();

    let output = context_patch(temp.path())
        .args(["apply", "-", "--yes", "--json"])
        .write_stdin("FILE: docs/new.md\n```\n# Title\n```\n")
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["summary"]["created"], 1);
    assert_eq!(report["outcomes"][0]["status"], "created");
    assert_eq!(
        fs::read_to_string(temp.path().join("docs/new.md")).unwrap(),
        "# Title\n"
    );
}

#[test]
fn response_without_blocks_is_not_a_failure() {
    let temp = project();
    let response = temp.path().join("response.md");
    fs::write(&response, "I don't think anything needs to change.").unwrap();

    context_patch(temp.path())
        .arg("apply")
        .arg(&response)
        .arg("--yes")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "No file changes were specified in the response.",
        ));
    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=1");
}

#[test]
fn without_terminal_confirmation_is_declined() {
    let temp = project();
    let response = temp.path().join("response.md");
    fs::write(&response, "FILE: a.py\n```\nx=2\n```\nFILE: c.py\n```\nc\n```\n").unwrap();

    context_patch(temp.path())
        .arg("apply")
        .arg(&response)
        .assert()
        .success()
        .stdout(predicate::str::contains("Note: c.py will be created."))
        .stderr(predicate::str::contains("No changes applied."));

    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=1");
    assert!(!temp.path().join("c.py").exists());
}

#[test]
fn declined_json_report_lists_every_proposal() {
    let temp = project();
    let response = temp.path().join("response.md");
    fs::write(&response, "FILE: a.py\n```\nx=2\n```\nFILE: c.py\n```\nc\n```\n").unwrap();

    let output = context_patch(temp.path())
        .arg("apply")
        .arg(&response)
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let outcomes = report["outcomes"].as_array().expect("outcomes");
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["path"], "a.py");
    assert_eq!(outcomes[1]["path"], "c.py");
    for outcome in outcomes {
        assert_eq!(outcome["status"], "skipped");
        assert_eq!(outcome["skip_reason"], "declined");
    }
    assert_eq!(report["summary"]["skipped"], 2);

    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=1");
    assert!(!temp.path().join("c.py").exists());
}

#[test]
fn json_confirmation_shows_plan_on_stderr() {
    let temp = project();

    let output = context_patch(temp.path())
        .args(["apply", "-", "--json"])
        .write_stdin("FILE: a.py\n```\nx=2\n```\nFILE: c.py\n```\nc\n```\n")
        .output()
        .expect("run");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Changes affect 2 file(s):"));
    assert!(stderr.contains("Note: c.py will be created."));
    assert!(stderr.contains("+x=2"));

    // stdout carries nothing but the report
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["summary"]["skipped"], 2);
}

#[test]
fn traversal_fails_the_run_but_not_siblings() {
    let temp = project();
    let response = temp.path().join("response.md");
    fs::write(
        &response,
        "FILE: ../escape.py\n```\nbad\n```\nFILE: ok.py\n```\nok\n```\n",
    )
    .unwrap();

    context_patch(temp.path())
        .arg("apply")
        .arg(&response)
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 change(s) failed"));

    assert!(temp.path().join("ok.py").exists());
    assert!(!temp.path().parent().unwrap().join("escape.py").exists());
}

#[test]
fn edit_uses_saved_response() {
    let temp = project();
    let response = temp.path().join("reply.txt");
    fs::write(&response, "```python\nx=3\n```").unwrap();

    context_patch(temp.path())
        .args(["edit", "a.py", "set x to 3", "--yes", "--no-backup"])
        .arg("--response-file")
        .arg(&response)
        .assert()
        .success()
        .stdout(predicate::str::contains("+x=3"))
        .stdout(predicate::str::contains("Updated a.py"));

    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=3\n");
    assert!(!temp.path().join("a.py.bak").exists());
}

#[test]
fn generate_test_writes_next_to_source() {
    let temp = project();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/app.py"), "def one():\n    return 1\n").unwrap();
    let response = temp.path().join("reply.txt");
    fs::write(
        &response,
        "Tests:\n```python\ndef test_one():\n    assert one() == 1\n```\n",
    )
    .unwrap();

    context_patch(temp.path())
        .args(["generate-test", "src/app.py", "--yes"])
        .arg("--response-file")
        .arg(&response)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Note: Creating new test file at src/test_app.py",
        ));

    assert_eq!(
        fs::read_to_string(temp.path().join("src/test_app.py")).unwrap(),
        "def test_one():\n    assert one() == 1\n"
    );
}

#[test]
fn generate_test_without_terminal_saves_nothing() {
    let temp = project();
    let response = temp.path().join("reply.txt");
    fs::write(&response, "```\ndef test_x():\n    pass\n```\n").unwrap();

    context_patch(temp.path())
        .args(["generate-test", "a.py", "--framework", "unittest"])
        .arg("--response-file")
        .arg(&response)
        .assert()
        .success()
        .stdout(predicate::str::contains("test_a.py"));

    assert!(!temp.path().join("test_a.py").exists());
}

#[test]
fn generate_test_requires_existing_source() {
    let temp = project();

    context_patch(temp.path())
        .args(["generate-test", "missing.py", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File missing.py does not exist"));
}

#[test]
fn ask_without_generator_fails() {
    let temp = project();

    context_patch(temp.path())
        .args(["ask", "what is x?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No generator configured"));
}

#[cfg(unix)]
#[test]
fn generator_failure_is_distinct_from_no_changes() {
    let temp = project();
    let config = temp.path().join("cfg.toml");
    fs::write(
        &config,
        "[generator]\ncommand = [\"sh\", \"-c\", \"echo boom >&2; exit 3\"]\n",
    )
    .unwrap();

    context_patch(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["refactor", "rename x", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("boom"))
        .stderr(predicate::str::contains("No file changes").not());
    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=1");
}

#[cfg(unix)]
#[test]
fn refactor_applies_generated_blocks() {
    let temp = project();
    let config = temp.path().join("cfg.toml");
    fs::write(
        &config,
        "[generator]\ncommand = [\"sh\", \"-c\", \"cat >/dev/null; printf 'FILE: a.py\\\\n```\\\\nx=9\\\\n```\\\\n'\"]\n",
    )
    .unwrap();

    context_patch(temp.path())
        .env("CONTEXT_PATCH_CONFIG", &config)
        .args(["refactor", "set x to 9", "--yes"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(temp.path().join("a.py")).unwrap(), "x=9\n");
}

#[test]
fn config_prints_effective_toml() {
    let temp = project();
    fs::write(
        temp.path().join(".context-patch.toml"),
        "backup_files = false\n",
    )
    .unwrap();

    context_patch(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup_files = false"))
        .stdout(predicate::str::contains("[exclusions]"));
}
