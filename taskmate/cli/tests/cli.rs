use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn bare_taskmate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taskmate").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("TASKMATE_DATA_DIR")
        .env_remove("TASKMATE_STORAGE_KEY");
    cmd
}

fn taskmate(dir: &TempDir) -> Command {
    let mut cmd = bare_taskmate(dir);
    cmd.arg("--data-dir").arg(dir.path().join("data"));
    cmd
}

/// Adds a task and returns its id.
fn add(dir: &TempDir, args: &[&str]) -> String {
    let output = taskmate(dir).arg("add").args(args).output().unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .trim()
        .strip_prefix("Task added with ID ")
        .unwrap_or_else(|| panic!("unexpected add output: {stdout}"))
        .to_string()
}

#[test]
fn list_without_tasks_says_so() {
    let dir = TempDir::new().unwrap();

    taskmate(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));
}

#[test]
fn added_task_is_listed_and_stored() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let id = add(&dir, &["Pay electricity bill", "--priority", "high", "--due", "2024-01-03"]);

    // Assert
    taskmate(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pay electricity bill").and(predicate::str::contains(id.as_str())));
    dir.child("data/tasks.json").assert(
        predicate::str::contains(r#""priority":"high""#)
            .and(predicate::str::contains(r#""dueDate":"#))
            .and(predicate::str::contains(r#""completed":false"#)),
    );
}

#[test]
fn toggled_task_is_hidden_by_completed_filter() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Call the dentist"]);

    // Act
    taskmate(&dir)
        .args(["toggle", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now completed"));

    // Assert
    taskmate(&dir)
        .args(["list", "--hide-completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found"));
    dir.child("data/tasks.json")
        .assert(predicate::str::contains(r#""completedAt":"#));
}

#[test]
fn search_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["Pay electricity bill"]);
    add(&dir, &["Website redesign"]);

    taskmate(&dir)
        .args(["list", "--search", "BILL"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Pay electricity bill")
                .and(predicate::str::contains("Website redesign").not()),
        );
}

#[test]
fn priority_sort_lists_high_first() {
    // Arrange
    let dir = TempDir::new().unwrap();
    add(&dir, &["Alpha chore", "--priority", "low"]);
    add(&dir, &["Bravo chore", "--priority", "high"]);

    // Act
    let output = taskmate(&dir)
        .args(["list", "--sort", "priority"])
        .output()
        .unwrap();

    // Assert
    let stdout = String::from_utf8(output.stdout).unwrap();
    let bravo = stdout.find("Bravo chore").expect("Bravo listed");
    let alpha = stdout.find("Alpha chore").expect("Alpha listed");
    assert!(bravo < alpha, "high priority should come first:\n{stdout}");
}

#[test]
fn deleted_task_disappears() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Temporary"]);

    taskmate(&dir).args(["delete", id.as_str()]).assert().success();

    taskmate(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));
}

#[test]
fn edit_changes_fields_but_keeps_id() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Draft report"]);

    taskmate(&dir)
        .args(["edit", id.as_str(), "--title", "Final report", "--priority", "high"])
        .assert()
        .success();

    taskmate(&dir)
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(format!("Final report ({id})"))
                .and(predicate::str::contains("Priority:  high")),
        );
}

#[test]
fn unknown_id_is_reported() {
    let dir = TempDir::new().unwrap();

    taskmate(&dir)
        .args(["delete", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task with ID nope"));
}

#[test]
fn overlong_title_is_rejected() {
    let dir = TempDir::new().unwrap();
    let title = "x".repeat(51);

    taskmate(&dir)
        .args(["add", title.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("the limit is 50"));
}

#[test]
fn corrupt_data_starts_empty() {
    let dir = TempDir::new().unwrap();
    dir.child("data/tasks.json").write_str("{ not json").unwrap();

    taskmate(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));
}

#[test]
fn config_file_in_working_directory_is_used() {
    // Arrange
    let dir = TempDir::new().unwrap();
    dir.child("taskmate.toml")
        .write_str("data_dir = \"store\"\nstorage_key = \"work\"\n")
        .unwrap();

    // Act
    bare_taskmate(&dir)
        .args(["add", "Configured task"])
        .assert()
        .success();

    // Assert
    dir.child("store/work.json")
        .assert(predicate::str::contains("Configured task"));
}
