use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use regex::Regex;
use tempfile::TempDir;

fn run_script(home: &TempDir, script: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("paisapal_cli")
        .unwrap()
        .env("PAISAPAL_CLI_SCRIPT", "1")
        .env("PAISAPAL_HOME", home.path())
        .env("RUST_LOG", "off")
        .write_stdin(script)
        .assert()
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
signup \"Asha Rao\" asha@example.com secret
income 10000
add-expense 1000 Food 2025-03-02 \"Groceries\"
add-expense 4000 Food 2025-03-05
expenses
exit
";
    let output = run_script(&home, script)
        .success()
        .stdout(contains("Welcome, Asha!"))
        .stdout(contains("Achievement unlocked: 🎯 First Step"))
        .stdout(contains("Total: ₹5,000"))
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    let ids = Regex::new(r"\[[0-9a-f]{8}\]").unwrap();
    assert_eq!(ids.find_iter(&text).count(), 2);
    assert!(home.path().join("config/config.json").exists());
}

#[test]
fn session_survives_between_runs() {
    let home = tempfile::tempdir().unwrap();
    run_script(&home, "signup Ravi ravi@example.com pw\nexit\n").success();
    run_script(&home, "whoami\nadd-goal \"New Phone\" 20000 2030-01-01\ngoals\nexit\n")
        .success()
        .stdout(contains("Ravi <ravi@example.com>"))
        .stdout(contains("New Phone").and(contains("₹0 / ₹20,000")));
}

#[test]
fn commands_require_login_and_suggest_typos() {
    let home = tempfile::tempdir().unwrap();
    run_script(&home, "insights\ninsigts\nexit\n")
        .success()
        .stderr(contains("Not logged in"))
        .stdout(contains("Suggestion: `insights`?"));
}

#[test]
fn backup_restore_and_report() {
    let home = tempfile::tempdir().unwrap();
    let script = "\
signup Kiran kiran@example.com pw
add-expense 250 Travel 2025-01-10
backup first
delete-expense 00000000
backups
restore 1
report
exit
";
    run_script(&home, script)
        .success()
        .stdout(contains("Backup created: "))
        .stdout(contains("_first.json"))
        .stdout(contains("Restored"))
        .stdout(contains("PAISAPAL - FINANCIAL REPORT"))
        .stderr(contains("expense `00000000` not found"));
}
