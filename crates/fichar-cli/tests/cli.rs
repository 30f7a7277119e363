//! End-to-end checks of the CLI surface that do not need a browser.

use assert_cmd::Command;
use predicates::prelude::*;

fn fichador() -> Command {
    let mut cmd = Command::cargo_bin("fichador").unwrap();
    // keep the test hermetic: no inherited credentials, no .env pickup
    cmd.current_dir(std::env::temp_dir())
        .env_remove("TARGET_URL")
        .env_remove("LOGIN_USERNAME")
        .env_remove("LOGIN_PASSWORD")
        .env_remove("HEADLESS");
    cmd
}

#[test]
fn help_lists_both_deployment_modes() {
    fichador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("schedule")));
}

#[test]
fn missing_configuration_fails_before_touching_a_browser() {
    fichador()
        .args(["run", "--mode", "clockin"])
        .assert()
        .failure()
        .code(1)
        .stderr(
            predicate::str::contains("TARGET_URL")
                .and(predicate::str::contains("LOGIN_USERNAME"))
                .and(predicate::str::contains("LOGIN_PASSWORD")),
        );
}

#[test]
fn unknown_mode_is_rejected_by_the_parser() {
    fichador()
        .args(["run", "--mode", "lunch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
