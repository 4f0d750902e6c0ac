use serde_json::{Value, json};
use skybridge_cloud_gce::{GceConfig, GceProvider, OperationPoller};
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "ya29.test-token";
pub const ZONE_PATH: &str = "/projects/skybridge-test/zones/europe-west1-b";
pub const GLOBAL_PATH: &str = "/projects/skybridge-test/global";

pub fn key_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account.json")
}

/// Mock server standing in for both the token endpoint and the compute API
pub struct Backend {
    pub server: MockServer,
}

impl Backend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> GceConfig {
        let mut config = GceConfig::new(key_file(), "europe-west1-b");
        config.compute_endpoint = self.server.uri();
        config.token_uri = Some(format!("{}/token", self.server.uri()));
        config
    }

    pub fn provider(&self) -> GceProvider {
        GceProvider::new(self.config())
            .unwrap()
            .with_poller(OperationPoller::new(
                Duration::from_millis(10),
                2,
                Duration::from_millis(10),
            ))
    }

    pub async fn mount_token(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": ACCESS_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_json(&self, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Zone operation `name` that is already DONE when polled
    pub async fn mount_done_operation(&self, name: &str) {
        self.mount_json(
            "GET",
            &format!("{ZONE_PATH}/operations/{name}"),
            200,
            operation(name, "DONE"),
        )
        .await;
    }
}

pub fn operation(name: &str, status: &str) -> Value {
    json!({"kind": "compute#operation", "name": name, "status": status})
}

pub fn instance_json(name: &str, status: &str, tags: &[&str]) -> Value {
    json!({
        "name": name,
        "status": status,
        "machineType": "https://compute.googleapis.com/compute/v1/projects/skybridge-test/zones/europe-west1-b/machineTypes/e2-small",
        "creationTimestamp": "2024-05-01T03:00:00.000-07:00",
        "networkInterfaces": [{
            "networkIP": "10.132.0.2",
            "accessConfigs": [{"name": "External NAT", "type": "ONE_TO_ONE_NAT", "natIP": "34.76.1.2"}]
        }],
        "tags": {"items": tags, "fingerprint": "fp-1"},
        "labels": {"skybridge-image": "debian-12"}
    })
}
