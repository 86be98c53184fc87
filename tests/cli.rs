use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn tlox() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tlox"))
}

fn temp_script(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("tlox-test-{}-{}", std::process::id(), name));
    fs::write(&path, contents).expect("Failed to write temp script");
    path
}

#[test]
fn test_version_flag() {
    let output = tlox().arg("--version").output().expect("Failed to execute tlox");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("tlox"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_eval_prints_to_stdout() {
    let output = tlox()
        .args(["--eval", "print 1 + 2 * 3;"])
        .output()
        .expect("Failed to execute tlox");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "7\n");
}

#[test]
fn test_script_file_runs() {
    let script = temp_script("ok.lox", "var a = 1; var b = 2; print a + b;\n");
    let output = tlox().arg(&script).output().expect("Failed to execute tlox");
    let _ = fs::remove_file(&script);

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "3\n");
}

#[test]
fn test_parse_error_exits_65_with_no_output() {
    let output = tlox()
        .args(["--eval", "var a = 1 var b = 2;"])
        .output()
        .expect("Failed to execute tlox");

    assert_eq!(output.status.code(), Some(65));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Expect ';' after var declaration."));
}

#[test]
fn test_statements_surviving_recovery_still_run() {
    let output = tlox()
        .args(["--eval", "var a = ; print 2;"])
        .output()
        .expect("Failed to execute tlox");

    // The bad declaration is reported, the good one executes, and the exit
    // code still says the parse failed.
    assert_eq!(output.status.code(), Some(65));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "2\n");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Expect expression."));
}

#[test]
fn test_runtime_error_exits_70() {
    let output = tlox()
        .args(["--eval", "print 1; true + 1;"])
        .output()
        .expect("Failed to execute tlox");

    assert_eq!(output.status.code(), Some(70));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "1\n");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Operands must be two numbers or two strings."));
}

#[test]
fn test_undefined_variable_reports_line() {
    let script = temp_script("undef.lox", "print 1;\nprint ghost;\n");
    let output = tlox().arg(&script).output().expect("Failed to execute tlox");
    let _ = fs::remove_file(&script);

    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Undefined variable 'ghost'."));
    assert!(stderr.contains(":2:"));
}

#[test]
fn test_dump_ast_emits_json_and_does_not_execute() {
    let output = tlox()
        .args(["--dump-ast", "--eval", "print 1 + 2;"])
        .output()
        .expect("Failed to execute tlox");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    // JSON dump, not program output.
    assert!(!stdout.contains("3\n"));
    assert!(stdout.contains("\"print\""));
    assert!(stdout.contains("\"binary\""));

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("dump is valid JSON");
    assert!(parsed.is_array());
}

#[test]
fn test_missing_script_file_fails() {
    let output = tlox()
        .arg("definitely-not-a-real-file.lox")
        .output()
        .expect("Failed to execute tlox");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to read"));
}
