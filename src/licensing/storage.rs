use crate::licensing::types::{LicenseError, LicenseRecord};
use serde_json::Value;
use std::path::Path;

/// Load a license document from disk.
///
/// The document must be a single JSON object; it is kept as-is so it can be
/// uploaded verbatim.
pub fn load_license_file(path: &Path) -> Result<LicenseRecord, LicenseError> {
    let load_error = |reason: String| LicenseError::Load {
        path: path.to_path_buf(),
        reason,
    };

    let contents = std::fs::read_to_string(path)
        .map_err(|e| load_error(format!("Failed to read license file: {}", e)))?;

    let document: Value = serde_json::from_str(&contents)
        .map_err(|e| load_error(format!("Failed to parse license file: {}", e)))?;

    match document {
        Value::Object(fields) => Ok(LicenseRecord::new(fields)),
        _ => Err(load_error("license document is not a JSON object".to_string())),
    }
}
