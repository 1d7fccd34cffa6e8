//! Shared reconciliation engine for the Agent Log hook installer.
//!
//! The installer converges a Claude Code configuration home towards a
//! desired state made of two artifacts:
//!
//! | Artifact | Location | Reconciler |
//! |----------|----------|------------|
//! | Hook script | `~/.claude/hooks/agent-spy.sh` | [`artifact`] |
//! | Hook registrations | `~/.claude/settings.json` | [`document`], [`uninstall`] |
//!
//! Everything that talks to a human (prompting, colored output) sits behind
//! the [`gate::ConfirmationGate`] and [`outcome::Reporter`] traits so the
//! engine can be driven from tests with temporary homes.

pub mod artifact;
pub mod document;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod layout;
pub mod logging;
pub mod outcome;
pub mod probe;
pub mod uninstall;

pub use artifact::{ArtifactRemoval, ArtifactState, DesiredArtifact};
pub use document::{DocumentReconciliation, SettingsDocument};
pub use engine::{StatusReport, inspect, run_install, run_uninstall};
pub use errors::{DocumentError, ReconcileError};
pub use gate::{ConfirmationGate, ScriptedGate, TerminalGate};
pub use layout::InstallLayout;
pub use logging::{LogConfig, LogFormat, LoggingError, init_logging};
pub use outcome::{
    InstallSummary, ReconciliationResult, Reporter, SilentReporter, Step, StepReport,
    UninstallSummary, Verdict,
};
pub use probe::{CommandProbe, DependencyProbe, FixedProbe, ProbeResult};
pub use uninstall::{PurgeOutcome, RemovalOutcome, RemovalReport};
