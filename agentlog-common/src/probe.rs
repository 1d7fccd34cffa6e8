//! External dependency probe.
//!
//! The hook script parses its input with `jq`. Whether `jq` is present is
//! advisory: a missing binary is reported, never enforced.

use serde::Serialize;
use std::process::{Command, Stdio};
use tracing::debug;

/// Result of probing for an external executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProbeResult {
    Found { version: String },
    Missing,
}

impl ProbeResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Source of the "external dependency present" signal.
pub trait DependencyProbe {
    /// Human name of the dependency, used in status lines.
    fn name(&self) -> &str;
    fn probe(&self) -> ProbeResult;
}

/// Probe that runs `<program> <version args>` and captures stdout.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    args: Vec<String>,
}

impl CommandProbe {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `jq --version`, the dependency of the bundled hook script.
    pub fn jq() -> Self {
        Self::new("jq", ["--version"])
    }
}

impl DependencyProbe for CommandProbe {
    fn name(&self) -> &str {
        &self.program
    }

    fn probe(&self) -> ProbeResult {
        let path = match which::which(&self.program) {
            Ok(path) => path,
            Err(e) => {
                debug!(program = %self.program, error = %e, "dependency not on PATH");
                return ProbeResult::Missing;
            }
        };

        let output = Command::new(&path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
                debug!(program = %self.program, %version, "dependency found");
                ProbeResult::Found { version }
            }
            Ok(out) => {
                debug!(program = %self.program, status = %out.status, "version query failed");
                ProbeResult::Missing
            }
            Err(e) => {
                debug!(program = %self.program, error = %e, "failed to run version query");
                ProbeResult::Missing
            }
        }
    }
}

/// Probe with a canned answer.
#[derive(Debug, Clone)]
pub struct FixedProbe {
    name: String,
    result: ProbeResult,
}

impl FixedProbe {
    pub fn found(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: ProbeResult::Found {
                version: version.into(),
            },
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: ProbeResult::Missing,
        }
    }
}

impl DependencyProbe for FixedProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> ProbeResult {
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_reports_missing() {
        eprintln!("TEST START: test_missing_program_reports_missing");
        let probe = CommandProbe::new("agentlog-definitely-not-installed-xyz", ["--version"]);
        assert_eq!(probe.probe(), ProbeResult::Missing);
        assert_eq!(probe.name(), "agentlog-definitely-not-installed-xyz");
        eprintln!("TEST PASS: test_missing_program_reports_missing");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_reports_missing() {
        let probe = CommandProbe::new("false", Vec::<String>::new());
        assert_eq!(probe.probe(), ProbeResult::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_query_captures_trimmed_stdout() {
        let probe = CommandProbe::new("echo", ["jq-1.7.1"]);
        assert_eq!(
            probe.probe(),
            ProbeResult::Found {
                version: "jq-1.7.1".to_string()
            }
        );
    }

    #[test]
    fn test_fixed_probe() {
        assert!(FixedProbe::found("jq", "jq-1.7").probe().is_found());
        assert!(!FixedProbe::missing("jq").probe().is_found());
    }
}
