//! CLI integration tests for taskmark
//!
//! These tests drive the binary against Markdown files in a temporary
//! directory, checking both what is reported and what ends up on disk.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the taskmark binary
fn taskmark_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskmark"));
    cmd.env_remove("TASKMARK_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory holding default settings
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    taskmark_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

fn write_doc(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn read_doc(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

const PLAN: &str = "# Plan\n- [ ] Parent\n  - [x] a\n  - [ ] b\n- [x] Solo\n";

/// Parent propagation on, marker cycling off
const PROPAGATE_ONLY: &str = "[behavior]\nauto_complete_parent = true\ncycle_complete_status = false\n";

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_writes_settings() {
    let dir = TempDir::new().unwrap();

    taskmark_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".taskmark.toml"));

    let settings = read_doc(dir.path(), ".taskmark.toml");
    assert!(settings.contains("[behavior]"));
    assert!(settings.contains("auto_complete_parent = false"));
    assert!(settings.contains("hide_based_on_conditions = false"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = setup_project();

    taskmark_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// =============================================================================
// Progress Tests
// =============================================================================

#[test]
fn test_progress_lists_parents() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "plan.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2 (50%)"))
        .stdout(predicate::str::contains("Parent"))
        .stdout(predicate::str::contains("Solo").not())
        .stdout(predicate::str::contains("# Plan").not());
}

#[test]
fn test_progress_with_headings() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "plan.md", "--headings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Plan"))
        .stdout(predicate::str::contains("2/4 (50%)"));
}

#[test]
fn test_progress_json() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    let output = taskmark_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "progress", "plan.md"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["hidden"], false);

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["line"], 2);
    assert_eq!(entries[0]["kind"], "bullet");
    assert_eq!(entries[0]["label"], "Parent");
    assert_eq!(entries[0]["completed"], 1);
    assert_eq!(entries[0]["not_started"], 1);
    assert_eq!(entries[0]["total"], 2);
}

#[test]
fn test_progress_direct_children_only() {
    let dir = TempDir::new().unwrap();
    write_doc(
        dir.path(),
        "custom.toml",
        "[progress]\ncount_sub_levels = false\n\n[editor]\ntab_size = 2\n",
    );
    write_doc(dir.path(), "deep.md", "- [ ] P\n  - [x] a\n    - [ ] deep\n  - [ ] b\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["--config", "custom.toml", "progress", "deep.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2 (50%)"));

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["--config", "custom.toml", "progress", "deep.md", "--all-levels"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3 (33%)"));
}

#[test]
fn test_progress_uses_tab_size_for_direct_children() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), ".taskmark.toml", "[progress]\ncount_sub_levels = false\n");
    write_doc(dir.path(), "deep.md", "- [ ] P\n  - [x] A\n    - [ ] B\n");

    // Four columns per level: B, not A, is the direct child
    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "deep.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0/1 (0%)"))
        .stdout(predicate::str::contains("1/1").not());
}

#[test]
fn test_progress_ignores_code_blocks() {
    let dir = setup_project();
    write_doc(
        dir.path(),
        "code.md",
        "- [ ] P\n  - [x] a\n  ```\n  - [ ] not a task\n  ```\n",
    );

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "code.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 (100%)"));
}

#[test]
fn test_progress_hidden_by_frontmatter() {
    let dir = TempDir::new().unwrap();
    write_doc(
        dir.path(),
        ".taskmark.toml",
        "[visibility]\nhide_based_on_conditions = true\n",
    );
    write_doc(
        dir.path(),
        "hidden.md",
        "---\nhide-progress-bar: true\n---\n- [ ] P\n  - [x] a\n",
    );

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "hidden.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress is hidden"));
}

#[test]
fn test_progress_shown_when_hiding_is_off() {
    let dir = setup_project();
    write_doc(
        dir.path(),
        "tagged.md",
        "---\nhide-progress-bar: true\n---\n- [ ] P\n  - [x] a\n",
    );

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "tagged.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 (100%)"));
}

#[test]
fn test_progress_survives_malformed_frontmatter() {
    let dir = TempDir::new().unwrap();
    write_doc(
        dir.path(),
        ".taskmark.toml",
        "[visibility]\nhide_based_on_conditions = true\n",
    );
    write_doc(dir.path(), "broken.md", "---\n: : bad: [\n---\n- [ ] P\n  - [x] A\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "broken.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 (100%)"))
        .stderr(predicate::str::contains("ignoring frontmatter"));
}

#[test]
fn test_progress_missing_file() {
    let dir = setup_project();

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["progress", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read document"));
}

// =============================================================================
// Inspect Tests
// =============================================================================

#[test]
fn test_inspect_child() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["inspect", "plan.md", "--line", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marker: [x]"))
        .stdout(predicate::str::contains("Category: completed"))
        .stdout(predicate::str::contains("Status: DONE"))
        .stdout(predicate::str::contains("Parent: line 2"));
}

#[test]
fn test_inspect_parent() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["inspect", "plan.md", "--line", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Children: 1/2 (50%)"));
}

#[test]
fn test_inspect_line_out_of_range() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["inspect", "plan.md", "--line", "40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["inspect", "plan.md", "--line", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line numbers start at 1"));
}

// =============================================================================
// Edit Tests
// =============================================================================

#[test]
fn test_edit_completes_parent() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), ".taskmark.toml", PROPAGATE_ONLY);
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["edit", "plan.md", "--line", "4", "--mark", "x", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    assert_eq!(
        read_doc(dir.path(), "plan.md"),
        "# Plan\n- [x] Parent\n  - [x] a\n  - [x] b\n- [x] Solo\n"
    );
}

#[test]
fn test_edit_cycles_typed_marker() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    // Typing over a blank box advances it to the next status (DOING)
    taskmark_cmd()
        .current_dir(dir.path())
        .args(["edit", "plan.md", "--line", "4", "--mark", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- [-] b"))
        .stdout(predicate::str::contains("dry run"));

    assert_eq!(read_doc(dir.path(), "plan.md"), PLAN);
}

#[test]
fn test_edit_reverts_completed_parent_to_in_progress() {
    let dir = TempDir::new().unwrap();
    write_doc(
        dir.path(),
        ".taskmark.toml",
        "[behavior]\nauto_complete_parent = true\ncycle_complete_status = false\n\
         mark_parent_in_progress_when_partially_complete = true\n",
    );
    write_doc(dir.path(), "done.md", "- [x] Parent\n  - [x] a\n  - [x] b\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["edit", "done.md", "--line", "3", "--mark", " ", "--write"])
        .assert()
        .success();

    assert_eq!(read_doc(dir.path(), "done.md"), "- [>] Parent\n  - [x] a\n  - [ ] b\n");
}

#[test]
fn test_edit_leaves_parent_by_default() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), ".taskmark.toml", "[behavior]\ncycle_complete_status = false\n");
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["edit", "plan.md", "--line", "4", "--mark", "x", "--write"])
        .assert()
        .success();

    assert_eq!(
        read_doc(dir.path(), "plan.md"),
        "# Plan\n- [ ] Parent\n  - [x] a\n  - [x] b\n- [x] Solo\n"
    );
}

#[test]
fn test_edit_rejects_non_task() {
    let dir = setup_project();
    write_doc(dir.path(), "notes.md", "- [ ] a\nprose\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["edit", "notes.md", "--line", "2", "--mark", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line 2 is not a task"));
}

#[test]
fn test_edit_json_reports_changes() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), ".taskmark.toml", PROPAGATE_ONLY);
    write_doc(dir.path(), "plan.md", PLAN);

    let output = taskmark_cmd()
        .current_dir(dir.path())
        .args(["-f", "json", "edit", "plan.md", "--line", "4", "--mark", "x"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["written"], false);
    let changes = json["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["line"], 2);
    assert_eq!(changes[0]["after"], "- [x] Parent");
    assert_eq!(changes[1]["after"], "  - [x] b");
}

// =============================================================================
// Cycle and Set Tests
// =============================================================================

#[test]
fn test_cycle_forward_and_backward() {
    let dir = setup_project();
    write_doc(dir.path(), "one.md", "- [ ] a\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["cycle", "one.md", "--line", "1", "--write"])
        .assert()
        .success();
    assert_eq!(read_doc(dir.path(), "one.md"), "- [-] a\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["cycle", "one.md", "--line", "1", "--backward", "--write"])
        .assert()
        .success();
    assert_eq!(read_doc(dir.path(), "one.md"), "- [ ] a\n");

    // Backward from the first status wraps to the last
    taskmark_cmd()
        .current_dir(dir.path())
        .args(["cycle", "one.md", "--line", "1", "--backward", "--write"])
        .assert()
        .success();
    assert_eq!(read_doc(dir.path(), "one.md"), "- [x] a\n");
}

#[test]
fn test_cycle_extreme_toggles() {
    let dir = setup_project();
    write_doc(dir.path(), "one.md", "- [ ] a\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["cycle", "one.md", "--line", "1", "--extreme", "--write"])
        .assert()
        .success();
    assert_eq!(read_doc(dir.path(), "one.md"), "- [x] a\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["cycle", "one.md", "--line", "1", "--extreme", "--write"])
        .assert()
        .success();
    assert_eq!(read_doc(dir.path(), "one.md"), "- [ ] a\n");
}

#[test]
fn test_set_status_propagates_to_parent() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), ".taskmark.toml", "[behavior]\nauto_complete_parent = true\n");
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["set", "plan.md", "--line", "4", "--status", "DONE", "--write"])
        .assert()
        .success();

    assert_eq!(
        read_doc(dir.path(), "plan.md"),
        "# Plan\n- [x] Parent\n  - [x] a\n  - [x] b\n- [x] Solo\n"
    );
}

#[test]
fn test_set_unknown_status() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["set", "plan.md", "--line", "4", "--status", "SHIPPED"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown status: SHIPPED"));
}

#[test]
fn test_set_same_status_is_a_no_op() {
    let dir = setup_project();
    write_doc(dir.path(), "plan.md", PLAN);

    taskmark_cmd()
        .current_dir(dir.path())
        .args(["set", "plan.md", "--line", "3", "--status", "DONE", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));

    assert_eq!(read_doc(dir.path(), "plan.md"), PLAN);
}

// =============================================================================
// Settings and Theme Tests
// =============================================================================

#[test]
fn test_config_shows_source_and_cycle() {
    let dir = setup_project();

    taskmark_cmd()
        .current_dir(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Loaded from"))
        .stdout(predicate::str::contains("[x] DONE -> completed"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), ".taskmark.toml", "[switcher.marks]\nTODO = \"ab\"\n");

    taskmark_cmd()
        .current_dir(dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("single character"));
}

#[test]
fn test_themes_list_and_show() {
    taskmark_cmd()
        .arg("themes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Minimal"))
        .stdout(predicate::str::contains("Things"));

    taskmark_cmd()
        .args(["themes", "minimal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x]"));

    taskmark_cmd()
        .args(["themes", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown theme"));
}
