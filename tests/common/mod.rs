//! Shared helpers: a mock API server and license fixtures.

#![allow(dead_code)]

use license_sync::{ClientConfig, LicenseRecord};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PATH_AUTHTOKEN: &str = "/api/v1/authtoken/";
pub const PATH_CONFIG: &str = "/api/v1/config/";
pub const TOKEN: &str = "0123456789abcdef";

/// Mock configuration API
pub struct MockTower {
    server: MockServer,
}

impl MockTower {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// `host:port` of the mock, as the clients expect it
    pub fn host(&self) -> String {
        self.server.address().to_string()
    }

    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Client settings pointing at the plain-HTTP mock
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default().with_scheme("http")
    }

    pub async fn mock_authtoken(&self, username: &str, password: &str) {
        Mock::given(method("POST"))
            .and(path(PATH_AUTHTOKEN))
            .and(body_json(json!({"username": username, "password": password})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": TOKEN,
                "expires": "2026-10-19T12:30:00Z"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_authtoken_rejected(&self) {
        Mock::given(method("POST"))
            .and(path(PATH_AUTHTOKEN))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "non_field_errors": ["Unable to login with provided credentials."]
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve `license_info` from the config resource, only with the test token
    pub async fn mock_license_info(&self, license_info: Value) {
        Mock::given(method("GET"))
            .and(path(PATH_CONFIG))
            .and(header("Authorization", format!("Token {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "time_zone": "UTC",
                "version": "3.8.6",
                "license_info": license_info
            })))
            .mount(&self.server)
            .await;
    }

    /// Fail the test if the config resource is read at all
    pub async fn expect_no_fetch(&self) {
        Mock::given(method("GET"))
            .and(path(PATH_CONFIG))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Answer uploads with `status`, expecting exactly `calls` of them
    pub async fn mock_upload(&self, status: u16, calls: u64) {
        Mock::given(method("POST"))
            .and(path(PATH_CONFIG))
            .and(header("Authorization", format!("Token {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({})))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Answer uploads of exactly `body` with 200, expecting one call
    pub async fn mock_upload_of(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(PATH_CONFIG))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

pub fn license_json(trial: bool) -> Value {
    json!({
        "company_name": "Example Corp",
        "contact_email": "ops@example.com",
        "contact_name": "Ops Team",
        "hostname": "tower.example.com",
        "instance_count": 100,
        "license_date": 1735689600,
        "license_key": "A",
        "license_type": "enterprise",
        "subscription_name": "Enterprise (100 Managed Nodes)",
        "trial": trial
    })
}

pub fn license_record(value: Value) -> LicenseRecord {
    serde_json::from_value(value).expect("license fixture is an object")
}

/// Write `value` to a temporary license document
pub fn write_license(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{}", value).expect("write license");
    file
}
