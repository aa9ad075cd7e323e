// License reconciliation against the remote configuration API

pub mod types;
pub mod config;
pub mod storage;
pub mod api;
pub mod manager;
pub mod report;

pub use types::*;
pub use config::*;
pub use api::{AuthClient, ConfigService};
pub use manager::{compare_licenses, decide, sync_license, Decision, LicenseReconciler, UploadReason};
pub use report::SyncReport;
