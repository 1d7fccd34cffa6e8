//! Install layout: every path and constant the reconcilers act on.
//!
//! The layout is built once per run and passed by reference into each
//! reconciliation function, so tests can point the whole engine at a
//! temporary home.

use crate::errors::ReconcileError;
use std::path::{Path, PathBuf};

/// Name of the Claude Code configuration directory under the home.
pub const CONFIG_DIR_NAME: &str = ".claude";

/// File name of the installed hook script.
pub const HOOK_SCRIPT_NAME: &str = "agent-spy.sh";

/// Command string registered in settings.json. Identifies our entries.
pub const HOOK_COMMAND: &str = "~/.claude/hooks/agent-spy.sh";

/// Hook events the script is registered for, in registration order.
pub const HOOK_EVENTS: [&str; 3] = ["SubagentStart", "SubagentStop", "TeammateIdle"];

/// Timeout (seconds) written into each new binding.
pub const HOOK_TIMEOUT_SECS: u64 = 5;

/// Permission bits for the installed script.
pub const HOOK_SCRIPT_MODE: u32 = 0o755;

/// Resolved locations and identity of one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// `~/.claude`
    pub config_home: PathBuf,
    /// `~/.claude/hooks/agent-spy.sh`
    pub hook_script: PathBuf,
    /// `~/.claude/settings.json`
    pub settings: PathBuf,
    /// `~/.claude/agent-activity`, written by the hook script at runtime.
    pub data_dir: PathBuf,
    /// Integration points checked and registered, in fixed order.
    pub events: Vec<String>,
    /// Command string identifying our bindings.
    pub signature: String,
    /// Timeout for newly appended bindings.
    pub timeout_secs: u64,
}

impl InstallLayout {
    /// Resolve the layout for the current user.
    pub fn discover() -> Result<Self, ReconcileError> {
        let home = dirs::home_dir().ok_or(ReconcileError::NoHomeDir)?;
        Ok(Self::for_home(&home))
    }

    /// Derive the layout from an explicit home directory.
    pub fn for_home(home: &Path) -> Self {
        let config_home = home.join(CONFIG_DIR_NAME);
        Self {
            hook_script: config_home.join("hooks").join(HOOK_SCRIPT_NAME),
            settings: config_home.join("settings.json"),
            data_dir: config_home.join("agent-activity"),
            events: HOOK_EVENTS.iter().map(|e| e.to_string()).collect(),
            signature: HOOK_COMMAND.to_string(),
            timeout_secs: HOOK_TIMEOUT_SECS,
            config_home,
        }
    }

    /// Replace the event list (tests use shorter or custom lists).
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the signature command string.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }
}
