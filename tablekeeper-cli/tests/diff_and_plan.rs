use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn tablekeeper_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tablekeeper"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write manifest");
    path
}

fn observed_yaml(status: &str) -> String {
    format!(
        r#"spec:
  tableName: orders
  billingMode: PROVISIONED
  keySchema:
    - attributeName: pk
      keyType: HASH
  provisionedThroughput:
    readCapacityUnits: 5
    writeCapacityUnits: 5
  tags:
    - key: env
      value: prod
status:
  tableStatus: {status}
  resourceMetadata:
    arn: arn:aws:dynamodb:us-west-2:123456789012:table/orders
"#
    )
}

const DESIRED_SAME: &str = r#"metadata:
  name: orders
spec:
  tableName: orders
  keySchema:
    - attributeName: pk
      keyType: HASH
  provisionedThroughput:
    readCapacityUnits: 5
    writeCapacityUnits: 5
  tags:
    - key: env
      value: prod
"#;

const DESIRED_CHANGED: &str = r#"metadata:
  name: orders
spec:
  tableName: orders
  billingMode: PROVISIONED
  attributeDefinitions:
    - attributeName: pk
      attributeType: S
    - attributeName: user_id
      attributeType: S
  keySchema:
    - attributeName: pk
      keyType: HASH
  provisionedThroughput:
    readCapacityUnits: 10
    writeCapacityUnits: 10
  globalSecondaryIndexes:
    - indexName: by_user
      keySchema:
        - attributeName: user_id
          keyType: HASH
      projection:
        projectionType: ALL
  tags:
    - key: env
      value: dev
    - key: team
      value: x
"#;

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[test]
fn diff_reports_no_differences_for_converged_table() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_SAME);
    let observed = write(&dir, "observed.yaml", &observed_yaml("ACTIVE"));

    tablekeeper_cmd(home.path())
        .arg("diff")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .assert()
        .success()
        .stdout(contains("No differences for 'orders'."));
}

#[test]
fn diff_table_lists_changed_paths() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_CHANGED);
    let observed = write(&dir, "observed.yaml", &observed_yaml("ACTIVE"));

    tablekeeper_cmd(home.path())
        .arg("diff")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .assert()
        .success()
        .stdout(contains("Spec.Tags"))
        .stdout(contains("Spec.GlobalSecondaryIndexes"))
        .stdout(contains("Spec.ProvisionedThroughput.ReadCapacityUnits"));
}

#[test]
fn diff_json_lists_paths_in_order() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_CHANGED);
    let observed = write(&dir, "observed.yaml", &observed_yaml("ACTIVE"));

    let output = tablekeeper_cmd(home.path())
        .arg("diff")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["table"], "orders");
    let paths: Vec<&str> = json["differences"]
        .as_array()
        .expect("differences")
        .iter()
        .filter_map(|d| d["path"].as_str())
        .collect();
    assert_eq!(
        paths,
        vec![
            "Spec.AttributeDefinitions",
            "Spec.GlobalSecondaryIndexes",
            "Spec.Tags",
            "Spec.ProvisionedThroughput",
            "Spec.ProvisionedThroughput.ReadCapacityUnits",
            "Spec.ProvisionedThroughput.WriteCapacityUnits",
        ]
    );
}

#[test]
fn diff_missing_manifest_fails_with_path() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_SAME);

    tablekeeper_cmd(home.path())
        .arg("diff")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(contains("manifest not found").and(contains("missing.yaml")));
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

#[test]
fn plan_on_updating_table_requeues_without_calls() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_CHANGED);
    let observed = write(&dir, "observed.yaml", &observed_yaml("UPDATING"));

    tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .assert()
        .success()
        .stdout(contains("No remote calls."))
        .stdout(contains("Requeue after 5s: table is currently being updated"))
        .stdout(contains("Synced: False"));
}

#[test]
fn plan_json_applies_tags_and_throughput_and_defers_index() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_CHANGED);
    let observed = write(&dir, "observed.yaml", &observed_yaml("ACTIVE"));

    let output = tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());

    let json = json_stdout(&output);
    let operations: Vec<&str> = json["calls"]
        .as_array()
        .expect("calls")
        .iter()
        .filter_map(|c| c["operation"].as_str())
        .collect();
    assert_eq!(
        operations,
        vec!["UntagResource", "TagResource", "UpdateTable"]
    );
    assert_eq!(json["calls"][0]["keys"][0], "env");
    assert_eq!(
        json["calls"][2]["provisionedThroughput"]["readCapacityUnits"],
        10
    );
    assert!(json["requeue"].is_null());
    assert_eq!(
        json["deferred"],
        serde_json::json!(["Spec.AttributeDefinitions", "Spec.GlobalSecondaryIndexes"])
    );
}

#[test]
fn plan_reports_key_schema_change_as_rejected() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(
        &dir,
        "desired.yaml",
        &DESIRED_SAME.replace("keyType: HASH\n", "keyType: HASH\n    - attributeName: sk\n      keyType: RANGE\n"),
    );
    let observed = write(&dir, "observed.yaml", &observed_yaml("ACTIVE"));

    tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .assert()
        .success()
        .stdout(contains("No remote calls."))
        .stdout(contains("Cannot change in place: Spec.KeySchema"))
        .stdout(contains("Synced: False (fields cannot be changed in place: Spec.KeySchema)"));
}

#[test]
fn plan_swallows_already_disabled_ttl() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_SAME);
    let mut observed_manifest = observed_yaml("ACTIVE");
    observed_manifest = observed_manifest.replace(
        "  tags:\n",
        "  timeToLive:\n    attributeName: expires_at\n    enabled: true\n  tags:\n",
    );
    let observed = write(&dir, "observed.yaml", &observed_manifest);

    let output = tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .arg("--ttl-already-disabled")
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json = json_stdout(&output);
    assert_eq!(json["calls"][0]["operation"], "UpdateTimeToLive");
    assert_eq!(json["calls"][0]["timeToLive"]["enabled"], false);
    assert_eq!(json["calls"][0]["timeToLive"]["attributeName"], "expires_at");
    assert_eq!(json["applied"], serde_json::json!(["Spec.TimeToLive"]));
}

#[test]
fn plan_uses_explicit_config_file() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_SAME);
    let observed = write(&dir, "observed.yaml", &observed_yaml("CREATING"));
    let config = write(&dir, "config.yaml", "requeue:\n  creating_secs: 42\n");

    let output = tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["requeue"]["afterSecs"], 42);
    assert_eq!(json["requeue"]["reason"], "table is currently being created");
}

#[test]
fn plan_reads_terminal_statuses_from_home_config() {
    let home = TempDir::new().expect("home");
    fs::create_dir_all(home.path().join(".tablekeeper")).expect("mkdir");
    fs::write(
        home.path().join(".tablekeeper/config.yaml"),
        "terminal_statuses:\n  - INACCESSIBLE_ENCRYPTION_CREDENTIALS\n",
    )
    .expect("write config");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_CHANGED);
    let observed = write(
        &dir,
        "observed.yaml",
        &observed_yaml("INACCESSIBLE_ENCRYPTION_CREDENTIALS"),
    );

    tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .assert()
        .success()
        .stdout(contains("No remote calls."))
        .stdout(contains(
            "Terminal: True (table is in 'INACCESSIBLE_ENCRYPTION_CREDENTIALS' status)",
        ));
}

#[test]
fn plan_missing_config_file_fails() {
    let home = TempDir::new().expect("home");
    let dir = TempDir::new().expect("manifests");
    let desired = write(&dir, "desired.yaml", DESIRED_SAME);
    let observed = write(&dir, "observed.yaml", &observed_yaml("ACTIVE"));

    tablekeeper_cmd(home.path())
        .arg("plan")
        .arg("--desired")
        .arg(&desired)
        .arg("--observed")
        .arg(&observed)
        .arg("--config")
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .failure()
        .stderr(contains("failed to load config"));
}
