use crate::licensing::api::{build_http_client, AuthClient, ConfigService};
use crate::licensing::config::ClientConfig;
use crate::licensing::storage::load_license_file;
use crate::licensing::types::{
    Credential, LicenseRecord, LicenseResult, ReconciliationOutcome, RecordSource, COMPARED_FIELDS,
};
use serde_json::{Number, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// Why the local license has to be pushed to the host
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UploadReason {
    /// The host has no license installed
    RemoteAbsent,
    /// These compared fields hold different values
    Mismatch(Vec<&'static str>),
}

/// What a run should do once both records are known
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Decision {
    Unchanged,
    Upload(UploadReason),
}

/// List the compared fields whose values differ between the two records.
///
/// A compared field missing from either side is an error, not a mismatch.
pub fn compare_licenses(
    local: &LicenseRecord,
    remote: &LicenseRecord,
) -> LicenseResult<Vec<&'static str>> {
    let mut mismatched = Vec::new();

    for field in COMPARED_FIELDS {
        let ours = local.require(field, RecordSource::Local)?;
        let theirs = remote.require(field, RecordSource::Remote)?;
        if !values_equal(ours, theirs) {
            mismatched.push(field);
        }
    }

    Ok(mismatched)
}

/// JSON equality at any depth, except that an integer and a float holding
/// the same value (`5` and `5.0`) are the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (as_integer(x), as_integer(y)) {
        (Some(i), Some(j)) => i == j,
        (Some(i), None) => float_equals_integer(y, i),
        (None, Some(j)) => float_equals_integer(x, j),
        (None, None) => x.as_f64() == y.as_f64(),
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison; integers past 2^53 are never rounded to match a float
fn float_equals_integer(float: &Number, integer: i128) -> bool {
    match float.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 2f64.powi(126) => {
            f as i128 == integer
        }
        _ => false,
    }
}

/// Decide whether `local` has to be uploaded given what the host holds
pub fn decide(local: &LicenseRecord, remote: Option<&LicenseRecord>) -> LicenseResult<Decision> {
    let Some(remote) = remote else {
        return Ok(Decision::Upload(UploadReason::RemoteAbsent));
    };

    let mismatched = compare_licenses(local, remote)?;
    if mismatched.is_empty() {
        Ok(Decision::Unchanged)
    } else {
        Ok(Decision::Upload(UploadReason::Mismatch(mismatched)))
    }
}

/// Brings a host's license in line with a local license document
pub struct LicenseReconciler {
    service: ConfigService,
}

impl LicenseReconciler {
    pub fn new(service: ConfigService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ConfigService {
        &self.service
    }

    /// Load the document at `local_license_path` and reconcile `host` against it
    pub async fn reconcile(
        &self,
        local_license_path: &Path,
        host: &str,
        credential: &Credential,
    ) -> LicenseResult<ReconciliationOutcome> {
        let local = load_license_file(local_license_path)?;
        self.reconcile_record(&local, host, credential).await
    }

    /// Reconcile `host` against an already loaded license record
    pub async fn reconcile_record(
        &self,
        local: &LicenseRecord,
        host: &str,
        credential: &Credential,
    ) -> LicenseResult<ReconciliationOutcome> {
        let remote = self.service.fetch_license(host, credential).await?;

        let reason = match decide(local, remote.as_ref())? {
            Decision::Unchanged => {
                info!(host, "license already up to date");
                return Ok(ReconciliationOutcome::Unchanged);
            }
            Decision::Upload(reason) => reason,
        };

        match &reason {
            UploadReason::RemoteAbsent => info!(host, "no license installed, uploading"),
            UploadReason::Mismatch(fields) => {
                debug!(?fields, "license fields differ");
                info!(host, "license differs, uploading");
            }
        }

        let status = self.service.upload_license(host, credential, local).await?;
        if self.service.config().is_upload_success(status.as_u16()) {
            info!(host, status = status.as_u16(), "license uploaded");
            Ok(ReconciliationOutcome::Uploaded)
        } else {
            warn!(host, status = status.as_u16(), "license upload rejected");
            Ok(ReconciliationOutcome::Failed {
                reason: "license upload failed".to_string(),
                status: status.as_u16(),
            })
        }
    }
}

/// One complete run: authenticate, then reconcile.
///
/// Nothing is fetched or uploaded if authentication fails.
pub async fn sync_license(
    config: ClientConfig,
    host: &str,
    username: &str,
    password: &str,
    local_license_path: &Path,
) -> LicenseResult<ReconciliationOutcome> {
    let client = build_http_client(&config)?;
    let auth = AuthClient::with_client(client.clone(), config.clone());
    let credential = auth.authenticate(host, username, password).await?;

    let reconciler = LicenseReconciler::new(ConfigService::with_client(client, config));
    reconciler.reconcile(local_license_path, host, &credential).await
}
