use crate::licensing::config::ClientConfig;
use crate::licensing::types::{Credential, LicenseError, LicenseRecord, LicenseResult};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

// ============================================================================
// Auth Token
// ============================================================================

/// Request body for the token endpoint
#[derive(Serialize)]
pub struct AuthTokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the token endpoint
#[derive(Deserialize, Debug)]
pub struct AuthTokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

// ============================================================================
// Config Resource
// ============================================================================

/// Turn the `license_info` value of a config response into a record.
///
/// An empty value (null, false, 0, "", {} or []) means the host has no
/// license installed yet, which is a normal state.
pub fn license_from_info(info: Value) -> LicenseResult<Option<LicenseRecord>> {
    if is_empty_value(&info) {
        return Ok(None);
    }

    match info {
        Value::Object(fields) => Ok(Some(LicenseRecord::new(fields))),
        other => Err(LicenseError::Service(format!(
            "license_info is not an object: {}",
            other
        ))),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

// ============================================================================
// HTTP Clients
// ============================================================================

pub(crate) fn build_http_client(config: &ClientConfig) -> LicenseResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(!config.validate_certs)
        .build()
        .map_err(|e| LicenseError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Obtains API tokens from the host's token endpoint
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl AuthClient {
    pub fn new(config: ClientConfig) -> LicenseResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    /// Reuse an existing connection pool
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Exchange a username and password for a token
    pub async fn authenticate(
        &self,
        host: &str,
        username: &str,
        password: &str,
    ) -> LicenseResult<Credential> {
        let url = self.config.authtoken_url(host);
        debug!(%url, username, "requesting auth token");

        let response = self
            .client
            .post(&url)
            .json(&AuthTokenRequest { username, password })
            .send()
            .await
            .map_err(|e| LicenseError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LicenseError::Auth(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let result: AuthTokenResponse = response
            .json()
            .await
            .map_err(|e| LicenseError::Auth(format!("Failed to parse response: {}", e)))?;

        let token = result
            .token
            .ok_or_else(|| LicenseError::Auth("response has no token field".to_string()))?;

        info!(host, "authenticated");
        Ok(Credential::new(token))
    }
}

/// Reads and replaces the license held in the host's configuration resource
#[derive(Clone)]
pub struct ConfigService {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ConfigService {
    pub fn new(config: ClientConfig) -> LicenseResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    /// Reuse an existing connection pool
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the license currently installed on `host`, if any
    pub async fn fetch_license(
        &self,
        host: &str,
        credential: &Credential,
    ) -> LicenseResult<Option<LicenseRecord>> {
        let url = self.config.config_url(host);
        debug!(%url, "fetching remote config");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, credential.header_value())
            .send()
            .await
            .map_err(|e| LicenseError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LicenseError::Service(format!(
                "config endpoint returned status {}",
                status.as_u16()
            )));
        }

        let mut body: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| LicenseError::Service(format!("Failed to parse response: {}", e)))?;

        let info = body
            .remove("license_info")
            .ok_or_else(|| LicenseError::Service("response has no license_info field".to_string()))?;

        license_from_info(info)
    }

    /// Replace the license on `host` with `record`.
    ///
    /// Returns whatever status the server answered with; deciding whether
    /// that counts as success is left to the caller.
    pub async fn upload_license(
        &self,
        host: &str,
        credential: &Credential,
        record: &LicenseRecord,
    ) -> LicenseResult<StatusCode> {
        let url = self.config.config_url(host);
        debug!(%url, fields = record.len(), "uploading license");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, credential.header_value())
            .json(record)
            .send()
            .await
            .map_err(|e| LicenseError::Service(e.to_string()))?;

        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_license_info_is_absent() {
        for info in [json!(null), json!(false), json!(0), json!(""), json!({}), json!([])] {
            assert!(license_from_info(info).unwrap().is_none());
        }
    }

    #[test]
    fn test_license_info_object() {
        let record = license_from_info(json!({"license_key": "A"})).unwrap().unwrap();
        assert_eq!(record.get("license_key"), Some(&json!("A")));
    }

    #[test]
    fn test_license_info_not_an_object() {
        let err = license_from_info(json!("corrupt")).unwrap_err();
        assert!(matches!(err, LicenseError::Service(_)));
    }

    #[test]
    fn test_auth_request_body() {
        let body = serde_json::to_value(AuthTokenRequest {
            username: "admin",
            password: "hunter2",
        })
        .unwrap();
        assert_eq!(body, json!({"username": "admin", "password": "hunter2"}));
    }
}
