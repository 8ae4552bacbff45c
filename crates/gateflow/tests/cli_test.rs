use assert_cmd::Command;
use predicates::prelude::*;

fn gateflow() -> Command {
    Command::cargo_bin("gateflow").unwrap()
}

#[test]
fn test_cli_help() {
    gateflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("outputs"));
}

#[test]
fn test_cli_version() {
    gateflow()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gateflow"));
}

#[test]
fn test_invalid_command() {
    gateflow().arg("no-such-command").assert().failure();
}

#[test]
fn test_deploy_help() {
    gateflow()
        .arg("deploy")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--profile"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_validate_without_config_fails() {
    gateflow()
        .current_dir(std::env::temp_dir())
        .env_remove("GATEFLOW_CONFIG")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gateflow.json"));
}

#[test]
fn test_validate_valid_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation passed"));
}

#[test]
fn test_validate_rejects_missing_base_url() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "integrationTargets": [
                { "type": "jira", "config": { "apiKey": "k" } }
            ],
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("baseUrl"));
}

#[test]
fn test_validate_rejects_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "integrationTargets": [
                { "type": "jira", "config": { "apiKey": "k", "baseUrl": "https://jira.example.com" } }
            ],
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("jira-open-api.json"));
}

#[test]
fn test_validate_renders_template() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "integrationTargets": [
                { "type": "jira", "config": { "apiKey": "k", "baseUrl": "https://jira.example.com" } }
            ],
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("jira-open-api.json"),
        r#"{"servers":[{"url":"{{BASE_URL}}"}]}"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("jira-open-api.json"));
}

#[test]
fn test_plan_shows_creates_for_fresh_stack() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("to create"))
        .stdout(predicate::str::contains("gateway"));
}

#[test]
fn test_outputs_before_deploy_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("outputs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no deployed gateway"));
}

#[test]
fn test_destroy_with_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gateflow.json"),
        r#"{
            "stackName": "demo",
            "gateway": { "name": "demo-gateway" },
            "aws": { "account": "123456789012", "region": "us-east-1" }
        }"#,
    )
    .unwrap();

    gateflow()
        .current_dir(dir.path())
        .env_remove("GATEFLOW_CONFIG")
        .arg("destroy")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to destroy"));
}
