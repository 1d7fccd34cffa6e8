//! Uninstall reconciler: the inverse of the settings step plus data purge.

use crate::document::SettingsDocument;
use crate::errors::{DocumentError, ReconcileError};
use crate::gate::ConfirmationGate;
use crate::layout::InstallLayout;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// What happened to settings.json during uninstall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RemovalOutcome {
    /// No settings file; nothing to do.
    NoDocument,
    /// The file could not be loaded; left untouched.
    Unparsable { reason: String },
    /// The document was written back.
    Rewritten,
    /// Removing our groups left nothing behind, so the file was deleted.
    Deleted,
    /// The document was loaded but writing or deleting it failed.
    Failed { reason: String },
}

impl RemovalOutcome {
    /// False when the settings step could not do its job.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Unparsable { .. } | Self::Failed { .. })
    }
}

/// Groups removed from settings.json and the resulting file state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub removed: usize,
    pub outcome: RemovalOutcome,
}

impl RemovalReport {
    fn untouched(outcome: RemovalOutcome) -> Self {
        Self {
            removed: 0,
            outcome,
        }
    }
}

/// Strip every group carrying our signature from the fixed events.
///
/// The document is always written back after a successful load. When the
/// removal empties it completely, the file is deleted instead so an
/// install/uninstall round trip leaves no trace. Failing to write or delete
/// the file fails this step only; uninstall carries on.
pub fn remove_bindings(layout: &InstallLayout) -> RemovalReport {
    let mut doc = match SettingsDocument::load(&layout.settings) {
        Ok(Some(doc)) => doc,
        Ok(None) => return RemovalReport::untouched(RemovalOutcome::NoDocument),
        Err(e) => {
            warn!(error = %e, "settings left untouched");
            return RemovalReport::untouched(unparsable(&e));
        }
    };

    let removed = doc.remove_binding_groups(&layout.events, &layout.signature);
    debug!(removed, "hook groups removed from settings");

    let committed = if removed > 0 && doc.is_empty() {
        delete_settings(&layout.settings).map(|()| RemovalOutcome::Deleted)
    } else {
        doc.persist().map(|()| RemovalOutcome::Rewritten)
    };

    RemovalReport {
        removed,
        outcome: committed.unwrap_or_else(|e| write_failed(&e)),
    }
}

fn delete_settings(path: &Path) -> Result<(), ReconcileError> {
    std::fs::remove_file(path).map_err(|source| ReconcileError::Remove {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "settings file emptied and removed");
    Ok(())
}

fn unparsable(error: &DocumentError) -> RemovalOutcome {
    RemovalOutcome::Unparsable {
        reason: error.to_string(),
    }
}

fn write_failed(error: &ReconcileError) -> RemovalOutcome {
    warn!(error = %error, "settings could not be updated");
    RemovalOutcome::Failed {
        reason: error.to_string(),
    }
}

/// What happened to the agent activity data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PurgeOutcome {
    /// No data directory exists; no question asked.
    Absent,
    /// The user kept the data.
    Kept,
    Removed,
    /// Removal was attempted and failed; uninstall still completes.
    Failed { reason: String },
}

/// Ask (default no) whether to delete `data_dir`, then delete it best-effort.
pub fn purge_data_dir(data_dir: &Path, gate: &mut dyn ConfirmationGate) -> PurgeOutcome {
    if !data_dir.exists() {
        return PurgeOutcome::Absent;
    }

    let question = format!("Remove agent activity data ({})?", data_dir.display());
    if !gate.ask(&question, false) {
        return PurgeOutcome::Kept;
    }

    match std::fs::remove_dir_all(data_dir) {
        Ok(()) => {
            info!(path = %data_dir.display(), "agent activity data removed");
            PurgeOutcome::Removed
        }
        Err(e) => {
            warn!(path = %data_dir.display(), error = %e, "could not remove agent activity data");
            PurgeOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
