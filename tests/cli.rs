use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn editkit(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("editkit").unwrap();
    cmd.arg("--root").arg(root.path());
    cmd
}

fn path_in(root: &TempDir, name: &str) -> String {
    root.path().join(name).to_string_lossy().to_string()
}

#[test]
fn create_then_view() {
    let root = TempDir::new().unwrap();
    let file = path_in(&root, "hello.txt");

    editkit(&root)
        .args(["create", file.as_str(), "first\nsecond\nthird"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File created successfully"));

    editkit(&root)
        .args(["view", file.as_str(), "2", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("     2\tsecond\n     3\tthird\n"))
        .stdout(predicate::str::contains("first").not());
}

#[test]
fn str_replace_editor_accepts_json() {
    let root = TempDir::new().unwrap();
    let file = path_in(&root, "config.py");
    fs::write(&file, "DEBUG = False\n").unwrap();

    let json = serde_json::json!({
        "command": "str_replace",
        "path": file,
        "old_str": "False",
        "new_str": "True"
    });
    editkit(&root)
        .arg("str_replace_editor")
        .arg(format!("--json={}", json))
        .assert()
        .success()
        .stdout(predicate::str::contains("has been edited"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "DEBUG = True\n");
}

#[test]
fn ambiguous_replace_fails_and_leaves_file() {
    let root = TempDir::new().unwrap();
    let file = path_in(&root, "dup.txt");
    fs::write(&file, "x = 1\nx = 1\n").unwrap();

    editkit(&root)
        .args(["str_replace", file.as_str(), "x = 1", "x = 2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("[1, 2]"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "x = 1\nx = 1\n");
}

#[test]
fn insert_with_named_arguments() {
    let root = TempDir::new().unwrap();
    let file = path_in(&root, "list.txt");
    fs::write(&file, "a\nc").unwrap();

    editkit(&root)
        .args([
            "insert",
            format!("--path={}", file).as_str(),
            "--insert_line=1",
            "--new_str=b",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("a snippet of the edited file"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "a\nb\nc");
}

#[test]
fn apply_patch_from_stdin() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("main.rs"), "fn main() {\n    old();\n}\n").unwrap();

    let patch = [
        "*** Begin Patch",
        "*** Update File: main.rs",
        "@@ fn main() {",
        " fn main() {",
        "-    old();",
        "+    new();",
        "*** Add File: src/lib.rs",
        "+pub mod x;",
        "*** End Patch",
        "",
    ]
    .join("\n");

    editkit(&root)
        .args(["apply_patch", "-"])
        .write_stdin(patch)
        .assert()
        .success()
        .stdout(predicate::str::contains("Patch applied successfully"));

    assert_eq!(
        fs::read_to_string(root.path().join("main.rs")).unwrap(),
        "fn main() {\n    new();\n}\n"
    );
    assert_eq!(
        fs::read_to_string(root.path().join("src/lib.rs")).unwrap(),
        "pub mod x;\n"
    );
}

#[test]
fn malformed_patch_is_rejected() {
    let root = TempDir::new().unwrap();

    editkit(&root)
        .args(["apply_patch", "-"])
        .write_stdin("*** Begin Patch\n*** Delete File: a.txt\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid patch"));
}

#[test]
fn paths_outside_root_are_rejected() {
    let root = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let target = path_in(&outside, "victim.txt");

    editkit(&root)
        .args(["create", target.as_str(), "pwned"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not within the directory"));

    assert!(!outside.path().join("victim.txt").exists());
}

#[test]
fn view_lists_directory() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("src")).unwrap();
    fs::write(root.path().join("src/lib.rs"), "").unwrap();
    fs::write(root.path().join("README.md"), "").unwrap();
    fs::write(root.path().join(".hidden"), "").unwrap();
    let root_str = root.path().to_string_lossy().to_string();

    editkit(&root)
        .args(["view", root_str.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("./README.md"))
        .stdout(predicate::str::contains("./src/lib.rs"))
        .stdout(predicate::str::contains(".hidden").not());
}

#[test]
fn explicit_config_file_is_used() {
    let root = TempDir::new().unwrap();
    let file = path_in(&root, "long.txt");
    fs::write(&file, "abcdefghij".repeat(5)).unwrap();
    let config = root.path().join("custom.toml");
    fs::write(&config, "[editor]\nmax_output_chars = 10\n").unwrap();

    editkit(&root)
        .arg("--config")
        .arg(&config)
        .args(["view", file.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("<response clipped>"));
}

#[test]
fn unknown_command_tag_fails() {
    let root = TempDir::new().unwrap();
    let root_str = root.path().to_string_lossy().to_string();

    editkit(&root)
        .args([
            "str_replace_editor",
            "undo_edit",
            root_str.as_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unrecognized command"));
}
