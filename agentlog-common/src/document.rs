//! Settings document reconciler.
//!
//! `settings.json` is owned by Claude Code and by the user; we only manage
//! the binding groups whose command equals our signature. The document is
//! therefore held as an order-preserving generic JSON map and only the
//! addressed paths are touched:
//!
//! ```json
//! {
//!   "hooks": {
//!     "SubagentStart": [
//!       { "matcher": "", "hooks": [{ "type": "command", "command": "<signature>", "timeout": 5 }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Install appends a fresh group per missing event and never merges into an
//! existing group. Uninstall drops any group containing a matching binding.

use crate::errors::{DocumentError, ReconcileError};
use crate::gate::ConfirmationGate;
use crate::layout::InstallLayout;
use crate::outcome::ReconciliationResult;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const HOOKS_KEY: &str = "hooks";

/// In-memory settings document for one load-mutate-persist cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDocument {
    path: PathBuf,
    root: Map<String, Value>,
}

impl SettingsDocument {
    /// An empty document that will be written to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: Map::new(),
        }
    }

    /// Parse document text. The top level must be a JSON object.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, DocumentError> {
        let path = path.into();
        let value: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(source) => return Err(DocumentError::Malformed { path, source }),
        };

        match value {
            Value::Object(root) => Ok(Self { path, root }),
            _ => Err(DocumentError::Shape {
                path,
                what: "top level".to_string(),
                expected: "object",
            }),
        }
    }

    /// Load from disk. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, DocumentError> {
        if !path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(path).map_err(|source| DocumentError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &content).map(Some)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level mapping, in document order.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn render(&self) -> Result<String, ReconcileError> {
        let mut out = serde_json::to_string_pretty(&self.root)?;
        out.push('\n');
        Ok(out)
    }

    /// Write the whole document back to its path, creating the parent directory.
    pub fn persist(&self) -> Result<(), ReconcileError> {
        let content = self.render()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ReconcileError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| ReconcileError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "settings written");
        Ok(())
    }

    /// Make sure `event` exists as a sequence under `hooks`.
    ///
    /// Structural only: nothing is persisted until [`Self::persist`].
    pub fn ensure_event(&mut self, event: &str) -> Result<&mut Vec<Value>, DocumentError> {
        let hooks = hooks_entry(&mut self.root, &self.path)?;
        let slot = hooks
            .entry(event)
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(groups) => Ok(groups),
            _ => Err(DocumentError::Shape {
                path: self.path.clone(),
                what: format!("{HOOKS_KEY}.{event}"),
                expected: "array",
            }),
        }
    }

    /// True if any group under `event` holds a binding whose command is `signature`.
    pub fn has_binding(&self, event: &str, signature: &str) -> bool {
        self.root
            .get(HOOKS_KEY)
            .and_then(|hooks| hooks.get(event))
            .and_then(Value::as_array)
            .is_some_and(|groups| groups.iter().any(|g| group_has_binding(g, signature)))
    }

    /// Events from `events` (in the given order) lacking the signature.
    ///
    /// Materializes missing `hooks`/event structure in memory on the way.
    pub fn missing_events(
        &mut self,
        events: &[String],
        signature: &str,
    ) -> Result<Vec<String>, DocumentError> {
        let mut missing = Vec::new();
        for event in events {
            self.ensure_event(event)?;
            if !self.has_binding(event, signature) {
                missing.push(event.clone());
            }
        }
        Ok(missing)
    }

    /// Append one new group holding our binding to `event`.
    pub fn append_binding_group(
        &mut self,
        event: &str,
        signature: &str,
        timeout_secs: u64,
    ) -> Result<(), DocumentError> {
        let groups = self.ensure_event(event)?;
        groups.push(binding_group(signature, timeout_secs));
        Ok(())
    }

    /// Drop every group under `events` that contains a matching binding.
    ///
    /// Event keys left empty are removed, and so is `hooks` once empty.
    /// Returns the number of groups removed.
    pub fn remove_binding_groups(&mut self, events: &[String], signature: &str) -> usize {
        let Some(Value::Object(hooks)) = self.root.get_mut(HOOKS_KEY) else {
            return 0;
        };

        let mut removed = 0;
        for event in events {
            let Some(Value::Array(groups)) = hooks.get_mut(event.as_str()) else {
                continue;
            };
            let before = groups.len();
            groups.retain(|g| !group_has_binding(g, signature));
            removed += before - groups.len();

            if groups.is_empty() {
                hooks.shift_remove(event.as_str());
            }
        }

        if hooks.is_empty() {
            self.root.shift_remove(HOOKS_KEY);
        }
        removed
    }
}

/// The `hooks` mapping, created (or replacing `null`) if absent.
fn hooks_entry<'a>(
    root: &'a mut Map<String, Value>,
    path: &Path,
) -> Result<&'a mut Map<String, Value>, DocumentError> {
    let slot = root
        .entry(HOOKS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(hooks) => Ok(hooks),
        _ => Err(DocumentError::Shape {
            path: path.to_path_buf(),
            what: HOOKS_KEY.to_string(),
            expected: "object",
        }),
    }
}

/// `{"matcher": "", "hooks": [{"type": "command", "command": ..., "timeout": ...}]}`
pub fn binding_group(signature: &str, timeout_secs: u64) -> Value {
    json!({
        "matcher": "",
        "hooks": [
            {
                "type": "command",
                "command": signature,
                "timeout": timeout_secs
            }
        ]
    })
}

fn group_has_binding(group: &Value, signature: &str) -> bool {
    group
        .get("hooks")
        .and_then(Value::as_array)
        .is_some_and(|bindings| {
            bindings
                .iter()
                .any(|b| b.get("command").and_then(Value::as_str) == Some(signature))
        })
}

/// Result of the settings install step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReconciliation {
    pub result: ReconciliationResult,
    /// Events that lacked the signature when the step ran.
    pub missing: Vec<String>,
}

impl DocumentReconciliation {
    fn failed(error: &DocumentError) -> Self {
        Self {
            result: ReconciliationResult::Failed {
                reason: error.to_string(),
            },
            missing: Vec::new(),
        }
    }
}

/// Events lacking the signature, without prompting or writing.
///
/// An absent document lacks every event.
pub fn inspect_document(layout: &InstallLayout) -> Result<Vec<String>, DocumentError> {
    match SettingsDocument::load(&layout.settings)? {
        Some(mut doc) => doc.missing_events(&layout.events, &layout.signature),
        None => Ok(layout.events.clone()),
    }
}

/// Register our binding under every event that lacks it.
///
/// A document that cannot be loaded fails this step only. Failing to write
/// the document back aborts the run.
pub fn reconcile_document(
    layout: &InstallLayout,
    gate: &mut dyn ConfirmationGate,
) -> Result<DocumentReconciliation, ReconcileError> {
    let mut doc = match SettingsDocument::load(&layout.settings) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            debug!(path = %layout.settings.display(), "no settings file, starting empty");
            SettingsDocument::empty(&layout.settings)
        }
        Err(e) => {
            warn!(error = %e, "settings update aborted");
            return Ok(DocumentReconciliation::failed(&e));
        }
    };

    let missing = match doc.missing_events(&layout.events, &layout.signature) {
        Ok(missing) => missing,
        Err(e) => {
            warn!(error = %e, "settings update aborted");
            return Ok(DocumentReconciliation::failed(&e));
        }
    };

    if missing.is_empty() {
        debug!("all hook events already registered");
        return Ok(DocumentReconciliation {
            result: ReconciliationResult::AlreadyCurrent,
            missing,
        });
    }

    let question = format!("Adding hooks for: {}. Update settings?", missing.join(", "));
    if !gate.ask(&question, true) {
        return Ok(DocumentReconciliation {
            result: ReconciliationResult::Skipped,
            missing,
        });
    }

    for event in &missing {
        // Shapes were validated by missing_events, so appending cannot fail here.
        let appended = doc.append_binding_group(event, &layout.signature, layout.timeout_secs);
        debug_assert!(appended.is_ok(), "unexpected shape error: {appended:?}");
    }
    doc.persist()?;

    Ok(DocumentReconciliation {
        result: ReconciliationResult::Updated,
        missing,
    })
}
