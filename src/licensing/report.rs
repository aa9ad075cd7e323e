use crate::licensing::types::{LicenseError, ReconciliationOutcome};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of a run, keyed by task name.
///
/// Failures take precedence: when any task failed, `msg` holds only the
/// failed tasks. Otherwise it holds the tasks that changed something.
#[derive(Serialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct SyncReport {
    pub changed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub msg: BTreeMap<String, String>,
}

impl SyncReport {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a ReconciliationOutcome)>,
    {
        let mut failed = BTreeMap::new();
        let mut changed = BTreeMap::new();

        for (task, outcome) in outcomes {
            if outcome.is_failed() {
                failed.insert(task.to_string(), outcome.message().to_string());
            } else if outcome.is_changed() {
                changed.insert(task.to_string(), outcome.message().to_string());
            }
        }

        if !failed.is_empty() {
            return Self { changed: false, failed: true, msg: failed };
        }

        Self {
            changed: !changed.is_empty(),
            failed: false,
            msg: changed,
        }
    }

    /// Report for a task that aborted with an error
    pub fn from_error(task: &str, error: &LicenseError) -> Self {
        let mut msg = BTreeMap::new();
        msg.insert(task.to_string(), error.to_string());
        Self { changed: false, failed: true, msg }
    }
}
