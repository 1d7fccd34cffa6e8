//! Artifact reconciler for the hook script.
//!
//! The installed script is compared byte-for-byte against the bundled copy.
//! Only a missing or stale script is written, and only after confirmation.

use crate::errors::ReconcileError;
use crate::gate::ConfirmationGate;
use crate::outcome::ReconciliationResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The script as it should exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredArtifact {
    pub bytes: Vec<u8>,
    pub dest: PathBuf,
    /// Unix permission bits applied after every write.
    pub mode: u32,
}

impl DesiredArtifact {
    pub fn new(bytes: impl Into<Vec<u8>>, dest: impl Into<PathBuf>, mode: u32) -> Self {
        Self {
            bytes: bytes.into(),
            dest: dest.into(),
            mode,
        }
    }
}

/// Installed state relative to the desired bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactState {
    Missing,
    Stale,
    Current,
}

/// Outcome of removing the installed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRemoval {
    Removed,
    NotFound,
}

/// Compare the installed script to the desired bytes without writing.
pub fn inspect_artifact(desired: &DesiredArtifact) -> Result<ArtifactState, ReconcileError> {
    if !desired.dest.exists() {
        return Ok(ArtifactState::Missing);
    }

    let existing = std::fs::read(&desired.dest).map_err(|source| ReconcileError::Read {
        path: desired.dest.clone(),
        source,
    })?;

    if existing == desired.bytes {
        Ok(ArtifactState::Current)
    } else {
        Ok(ArtifactState::Stale)
    }
}

/// Converge the installed script towards `desired`.
///
/// Filesystem errors other than setting the executable bit abort the run.
pub fn reconcile_artifact(
    desired: &DesiredArtifact,
    gate: &mut dyn ConfirmationGate,
) -> Result<ReconciliationResult, ReconcileError> {
    let state = inspect_artifact(desired)?;
    debug!(dest = %desired.dest.display(), ?state, "hook script inspected");

    let (question, applied) = match state {
        ArtifactState::Current => return Ok(ReconciliationResult::AlreadyCurrent),
        ArtifactState::Missing => ("Not found. Install?", ReconciliationResult::Installed),
        ArtifactState::Stale => (
            "Different version found. Update?",
            ReconciliationResult::Updated,
        ),
    };

    if !gate.ask(question, true) {
        return Ok(ReconciliationResult::Skipped);
    }

    write_artifact(desired)?;
    Ok(applied)
}

fn write_artifact(desired: &DesiredArtifact) -> Result<(), ReconcileError> {
    if let Some(parent) = desired.dest.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ReconcileError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(&desired.dest, &desired.bytes).map_err(|source| ReconcileError::Write {
        path: desired.dest.clone(),
        source,
    })?;
    info!(dest = %desired.dest.display(), bytes = desired.bytes.len(), "hook script written");

    set_mode(&desired.dest, desired.mode);
    Ok(())
}

/// Best-effort permission change; failures are logged and ignored.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)) {
        tracing::warn!(path = %path.display(), error = %e, "could not set hook script permissions");
    }
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) {
    debug!(path = %path.display(), "permission bits not supported on this platform");
}

/// Delete the installed script. A missing file is not an error.
pub fn remove_artifact(path: &Path) -> Result<ArtifactRemoval, ReconcileError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "hook script removed");
            Ok(ArtifactRemoval::Removed)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ArtifactRemoval::NotFound),
        Err(source) => Err(ReconcileError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
