use std::time::Duration;

/// Default request timeout for every call to the remote API
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upload status codes treated as success unless configured otherwise
pub const DEFAULT_UPLOAD_SUCCESS: &[u16] = &[200];

/// Report key for the license task
pub const LICENSE_TASK: &str = "tower_license";

/// API endpoints
pub mod endpoints {
    /// Token endpoint. Accepts `{username, password}`, returns `{token}`.
    pub fn authtoken(scheme: &str, host: &str) -> String {
        format!("{}://{}/api/v1/authtoken/", scheme, host)
    }

    /// Configuration resource. GET returns `{license_info, ...}`, POST replaces the license.
    pub fn config(scheme: &str, host: &str) -> String {
        format!("{}://{}/api/v1/config/", scheme, host)
    }
}

/// Transport settings shared by the auth and config clients
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// `https` in production; plain `http` is only meant for local test servers
    pub scheme: String,
    pub timeout: Duration,
    pub validate_certs: bool,
    pub user_agent: String,
    /// Upload responses with one of these codes count as a successful upload
    pub upload_success: Vec<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            validate_certs: true,
            user_agent: format!("license-sync/{}", env!("CARGO_PKG_VERSION")),
            upload_success: DEFAULT_UPLOAD_SUCCESS.to_vec(),
        }
    }
}

impl ClientConfig {
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_validate_certs(mut self, validate_certs: bool) -> Self {
        self.validate_certs = validate_certs;
        self
    }

    pub fn with_upload_success(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.upload_success = statuses.into();
        self
    }

    pub fn authtoken_url(&self, host: &str) -> String {
        endpoints::authtoken(&self.scheme, host)
    }

    pub fn config_url(&self, host: &str) -> String {
        endpoints::config(&self.scheme, host)
    }

    pub fn is_upload_success(&self, status: u16) -> bool {
        self.upload_success.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = ClientConfig::default();
        assert_eq!(
            config.authtoken_url("tower.example.com"),
            "https://tower.example.com/api/v1/authtoken/"
        );
        assert_eq!(
            config.config_url("tower.example.com"),
            "https://tower.example.com/api/v1/config/"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate_certs);
    }

    #[test]
    fn test_upload_success_defaults_to_200() {
        let config = ClientConfig::default();
        assert!(config.is_upload_success(200));
        assert!(!config.is_upload_success(201));

        let relaxed = config.with_upload_success(vec![200, 201, 204]);
        assert!(relaxed.is_upload_success(204));
    }

    #[test]
    fn test_scheme_override() {
        let config = ClientConfig::default().with_scheme("http");
        assert_eq!(config.config_url("127.0.0.1:8080"), "http://127.0.0.1:8080/api/v1/config/");
    }
}
