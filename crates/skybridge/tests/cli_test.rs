#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openstack_settings(uri: &str) -> String {
    format!(
        r#"
log:
  level: warn
provider:
  kind: openstack
  identity_endpoint: {uri}
  compute_endpoint: {uri}
  image_endpoint: {uri}
  network_endpoint: {uri}
  application_id: app-id
  application_secret: app-secret
  address_provider: public
  address_provider_uuid: net-1
"#
    )
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("skybridge")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("instances"))
        .stdout(predicate::str::contains("add-security-group"))
        .stdout(predicate::str::contains("metrics"));
}

#[test]
fn test_missing_settings_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("skybridge")
        .unwrap()
        .args(["--config", "/nonexistent/skybridge.yaml", "instances"])
        .current_dir(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_invalid_metadata_is_rejected() {
    Command::cargo_bin("skybridge")
        .unwrap()
        .args([
            "create", "--name", "vm1", "--image", "img", "--flavour", "f", "--metadata", "novalue",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_instance_against_openstack_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Subject-Token", "token")
                .set_body_json(json!({"token": {"expires_at": "2999-01-01T00:00:00Z"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/servers/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"server": {
            "id": "abc",
            "name": "vm1",
            "status": "SHUTOFF",
            "flavor": {"id": "flavor-1"},
            "image": {"id": "img-1"},
            "created": "2024-05-01T10:00:00Z"
        }})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/servers/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let settings = temp_dir.path().join("skybridge.yaml");
    fs::write(&settings, openstack_settings(&server.uri())).unwrap();

    let output = tokio::task::spawn_blocking(move || {
        let found = Command::cargo_bin("skybridge")
            .unwrap()
            .env("SKYBRIDGE_CONFIG", &settings)
            .args(["instance", "abc"])
            .output()
            .unwrap();
        let missing = Command::cargo_bin("skybridge")
            .unwrap()
            .env("SKYBRIDGE_CONFIG", &settings)
            .args(["instance", "missing"])
            .output()
            .unwrap();
        (found, missing)
    })
    .await
    .unwrap();

    let (found, missing) = output;
    assert!(found.status.success());
    let instance: serde_json::Value = serde_json::from_slice(&found.stdout).unwrap();
    assert_eq!(instance["name"], "vm1");
    assert_eq!(instance["state"], "STOPPED");
    assert_eq!(instance["flavourId"], "flavor-1");

    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("status 404"));
}
