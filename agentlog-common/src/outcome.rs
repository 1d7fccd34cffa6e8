//! Step results and run summaries.
//!
//! Results feed reporting only; they never steer control flow beyond the
//! final verdict.

use crate::artifact::ArtifactRemoval;
use crate::probe::ProbeResult;
use crate::uninstall::{PurgeOutcome, RemovalReport};
use serde::Serialize;
use std::path::Path;

/// Outcome of reconciling one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationResult {
    /// Already matched the desired state; nothing written.
    AlreadyCurrent,
    /// Created from scratch.
    Installed,
    /// Existing artifact brought up to date.
    Updated,
    /// The user declined the change.
    Skipped,
    /// The step could not run.
    Failed { reason: String },
}

impl ReconciliationResult {
    /// True when the artifact ends the run in the desired state.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::AlreadyCurrent | Self::Installed | Self::Updated)
    }
}

impl std::fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyCurrent => write!(f, "Up to date"),
            Self::Installed => write!(f, "Installed"),
            Self::Updated => write!(f, "Updated"),
            Self::Skipped => write!(f, "Skipped"),
            Self::Failed { reason } => write!(f, "Failed: {}", reason),
        }
    }
}

/// Steps of the install and uninstall runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Dependency,
    HookScript,
    Settings,
    DataPurge,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Dependency => write!(f, "Dependency"),
            Step::HookScript => write!(f, "Hook script"),
            Step::Settings => write!(f, "Settings"),
            Step::DataPurge => write!(f, "Agent activity data"),
        }
    }
}

/// Status line for one finished install step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub result: ReconciliationResult,
    /// Integration points the step touched or found missing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

impl StepReport {
    pub fn new(step: Step, result: ReconciliationResult) -> Self {
        Self {
            step,
            result,
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<String>) -> Self {
        self.events = events;
        self
    }
}

/// Binary end-of-install signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    FullyConfigured,
    PartiallyConfigured,
}

/// Everything an install run decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallSummary {
    pub dependency: ProbeResult,
    pub artifact: StepReport,
    pub document: StepReport,
}

impl InstallSummary {
    /// Fully configured only if neither step was skipped or failed.
    pub fn verdict(&self) -> Verdict {
        if self.artifact.result.is_success() && self.document.result.is_success() {
            Verdict::FullyConfigured
        } else {
            Verdict::PartiallyConfigured
        }
    }
}

/// Everything an uninstall run decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallSummary {
    pub settings: RemovalReport,
    pub artifact: ArtifactRemoval,
    pub purge: PurgeOutcome,
}

impl UninstallSummary {
    /// True unless the settings step failed. Purge failures are best-effort.
    pub fn is_success(&self) -> bool {
        self.settings.outcome.is_success()
    }
}

/// Display collaborator notified as the engine progresses.
///
/// Every step is announced before it prompts and reported once it finishes,
/// so status lines appear in run order.
pub trait Reporter {
    fn dependency_checked(&mut self, _name: &str, _result: &ProbeResult) {}
    fn step_started(&mut self, _step: Step, _path: &Path) {}
    fn step_finished(&mut self, _report: &StepReport) {}
    fn install_finished(&mut self, _summary: &InstallSummary) {}
    fn settings_removed(&mut self, _report: &RemovalReport) {}
    fn artifact_removed(&mut self, _removal: &ArtifactRemoval) {}
    fn data_purged(&mut self, _path: &Path, _outcome: &PurgeOutcome) {}
    fn uninstall_finished(&mut self, _summary: &UninstallSummary) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}
