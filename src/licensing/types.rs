use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Fields that decide whether the local and remote licenses are the same.
/// Anything else in either record is ignored by the comparison.
pub const COMPARED_FIELDS: [&str; 10] = [
    "company_name",
    "contact_email",
    "contact_name",
    "hostname",
    "instance_count",
    "license_date",
    "license_key",
    "license_type",
    "subscription_name",
    "trial",
];

/// Bearer token returned by the authentication endpoint.
///
/// Lives for a single run and is never written anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Where a license record came from
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Local,
    Remote,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Local => f.write_str("local"),
            RecordSource::Remote => f.write_str("remote"),
        }
    }
}

/// A license document as a flat JSON object.
///
/// Kept as a map rather than a struct so the local document is uploaded
/// exactly as it was read, including fields this crate knows nothing about.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
#[serde(transparent)]
pub struct LicenseRecord(Map<String, Value>);

impl LicenseRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Look up a compared field, failing when the record does not carry it
    pub fn require(&self, field: &'static str, side: RecordSource) -> Result<&Value, LicenseError> {
        self.0
            .get(field)
            .ok_or(LicenseError::Compare { field, side })
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for LicenseRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Result of one reconciliation run
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    Unchanged,
    Uploaded,
    Failed { reason: String, status: u16 },
}

impl ReconciliationOutcome {
    /// Short state label used in reports: `unchanged`, `changed` or `failed`
    pub fn state(&self) -> &'static str {
        match self {
            ReconciliationOutcome::Unchanged => "unchanged",
            ReconciliationOutcome::Uploaded => "changed",
            ReconciliationOutcome::Failed { .. } => "failed",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ReconciliationOutcome::Unchanged => "no license change",
            ReconciliationOutcome::Uploaded => "license upload succeeded",
            ReconciliationOutcome::Failed { reason, .. } => reason,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, ReconciliationOutcome::Uploaded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ReconciliationOutcome::Failed { .. })
    }

    /// Turn a failed outcome into [`LicenseError::UploadRejected`]
    pub fn into_result(self) -> Result<Self, LicenseError> {
        match self {
            ReconciliationOutcome::Failed { status, .. } => Err(LicenseError::UploadRejected { status }),
            other => Ok(other),
        }
    }
}

/// Error types for licensing operations
#[derive(thiserror::Error, Debug)]
pub enum LicenseError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Config service error: {0}")]
    Service(String),

    #[error("Failed to load license from {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("The {side} license record is missing the `{field}` field")]
    Compare {
        field: &'static str,
        side: RecordSource,
    },

    #[error("License upload rejected with status {status}")]
    UploadRejected { status: u16 },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl Serialize for LicenseError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
