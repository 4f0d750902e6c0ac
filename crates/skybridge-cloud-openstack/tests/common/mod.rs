use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use skybridge_cloud_openstack::{OpenStackConfig, OpenStackProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "gAAAAABtoken";

/// One mock server standing in for keystone, nova, glance and neutron
pub struct Backend {
    pub server: MockServer,
}

impl Backend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> OpenStackConfig {
        let uri = self.uri();
        OpenStackConfig {
            identity_endpoint: uri.clone(),
            compute_endpoint: uri.clone(),
            image_endpoint: uri.clone(),
            network_endpoint: uri,
            application_id: "app-id".to_string(),
            application_secret: "app-secret".to_string(),
            address_provider: "public".to_string(),
            address_provider_uuid: "net-1".to_string(),
            timeout_ms: 5000,
        }
    }

    pub fn provider(&self) -> OpenStackProvider {
        OpenStackProvider::new(self.config()).unwrap()
    }

    /// Keystone answering with a token valid for two hours
    pub async fn mount_keystone(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v3/auth/tokens"))
            .respond_with(token_response(TimeDelta::hours(2)))
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
}

pub fn token_response(lifetime: TimeDelta) -> ResponseTemplate {
    let expires_at = Utc::now() + lifetime;
    ResponseTemplate::new(201)
        .insert_header("X-Subject-Token", TOKEN)
        .set_body_json(json!({
            "token": {
                "expires_at": expires_at.to_rfc3339(),
                "methods": ["application_credential"]
            }
        }))
}

pub fn server_json(id: &str, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "flavor": {"id": "flavor-1"},
        "image": {"id": "img-1"},
        "created": "2024-05-01T10:00:00Z",
        "addresses": {
            "public": [{"addr": "203.0.113.10", "version": 4}],
            "private": [{"addr": "10.0.0.5", "version": 4}]
        },
        "security_groups": [{"name": "web"}, {"name": "default"}, {"name": "web"}]
    })
}
