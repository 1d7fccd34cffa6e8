//! Terminal rendering for install, uninstall and status runs.

use agentlog_common::{
    ArtifactRemoval, ArtifactState, InstallSummary, ProbeResult, PurgeOutcome,
    ReconciliationResult, RemovalOutcome, RemovalReport, Reporter, Step, StepReport,
    StatusReport, UninstallSummary, Verdict,
};
use console::style;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Indent for step detail lines and install prompts.
pub const DETAIL_INDENT: &str = "    ";
/// Indent for top-level lines and uninstall prompts.
pub const LINE_INDENT: &str = "  ";

/// Prints one status line per step as the engine reports it.
///
/// Write errors are ignored: a closed stdout must not abort a half-finished run.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn banner(&mut self, title: &str) {
        let _ = writeln!(
            self.out,
            "\n{LINE_INDENT}{} {title}\n",
            style("agentlog").bold()
        );
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn dependency_checked(&mut self, name: &str, result: &ProbeResult) {
        let status = match result {
            ProbeResult::Found { version } => {
                style(format!("✓ found ({version})")).green().to_string()
            }
            ProbeResult::Missing => style(format!(
                "⚠ not found, hook script requires {name} for JSON parsing"
            ))
            .yellow()
            .to_string(),
        };
        self.line(format_args!("{LINE_INDENT}Checking {name}... {status}"));
    }

    fn step_started(&mut self, step: Step, path: &Path) {
        self.line(format_args!(
            "\n{LINE_INDENT}{step}: {}",
            style(path.display()).dim()
        ));
    }

    fn step_finished(&mut self, report: &StepReport) {
        let text = match (&report.result, report.step) {
            (ReconciliationResult::AlreadyCurrent, Step::Settings) => {
                format!("{} Already configured", style("✓").green())
            }
            (ReconciliationResult::AlreadyCurrent, _) => {
                format!("{} Up to date", style("✓").green())
            }
            (ReconciliationResult::Installed, Step::HookScript) => {
                format!("{} Installed and set executable", style("✓").green())
            }
            (ReconciliationResult::Updated, Step::Settings) => format!(
                "{} {} hook entries added ({})",
                style("✓").green(),
                report.events.len(),
                report.events.join(", ")
            ),
            (result @ (ReconciliationResult::Installed | ReconciliationResult::Updated), _) => {
                format!("{} {result}", style("✓").green())
            }
            (ReconciliationResult::Skipped, _) => style("Skipped").dim().to_string(),
            (ReconciliationResult::Failed { reason }, _) => {
                format!("{} {reason}; {} left unchanged", style("✗").red(), report.step)
            }
        };
        self.line(format_args!("{DETAIL_INDENT}{text}"));
    }

    fn install_finished(&mut self, summary: &InstallSummary) {
        let text = match summary.verdict() {
            Verdict::FullyConfigured => style(
                "Agent Log will appear in the Kanban footer when subagents are active.",
            )
            .green(),
            Verdict::PartiallyConfigured => {
                style("Partial install: re-run `agentlog install` to complete setup.").yellow()
            }
        };
        self.line(format_args!("\n{LINE_INDENT}{text}\n"));
    }

    fn settings_removed(&mut self, report: &RemovalReport) {
        let text = match &report.outcome {
            RemovalOutcome::NoDocument => style("No settings.json found").dim().to_string(),
            RemovalOutcome::Unparsable { .. } => {
                format!("{} Could not parse settings.json", style("✗").red())
            }
            RemovalOutcome::Failed { reason } => {
                format!("{} Could not update settings.json: {reason}", style("✗").red())
            }
            RemovalOutcome::Rewritten if report.removed == 0 => {
                style("No hook entries found").dim().to_string()
            }
            RemovalOutcome::Rewritten => format!(
                "{} Removed {} hook entries",
                style("✓").green(),
                report.removed
            ),
            RemovalOutcome::Deleted => format!(
                "{} Removed {} hook entries (settings.json was left empty and deleted)",
                style("✓").green(),
                report.removed
            ),
        };
        self.line(format_args!("{LINE_INDENT}Settings: {text}"));
    }

    fn artifact_removed(&mut self, removal: &ArtifactRemoval) {
        let text = match removal {
            ArtifactRemoval::Removed => format!("{} Removed", style("✓").green()),
            ArtifactRemoval::NotFound => style("Not found").dim().to_string(),
        };
        self.line(format_args!("{LINE_INDENT}Hook script: {text}"));
    }

    fn data_purged(&mut self, _path: &Path, outcome: &PurgeOutcome) {
        let text = match outcome {
            PurgeOutcome::Absent => return,
            PurgeOutcome::Kept => style("Kept agent activity data").dim().to_string(),
            PurgeOutcome::Removed => {
                format!("{} Agent activity data removed", style("✓").green())
            }
            PurgeOutcome::Failed { reason } => format!(
                "{} Could not remove agent activity data: {reason}",
                style("⚠").yellow()
            ),
        };
        self.line(format_args!("{LINE_INDENT}{text}"));
    }

    fn uninstall_finished(&mut self, _summary: &UninstallSummary) {
        self.line(format_args!(
            "\n{LINE_INDENT}{}\n",
            style("Uninstall complete.").green()
        ));
    }
}

/// Render the read-only status view.
pub fn render_status(
    out: &mut impl Write,
    status: &StatusReport,
    hook_script: &Path,
    settings: &Path,
) {
    let script = match status.hook_script {
        ArtifactState::Current => format!("{} up to date", style("✓").green()),
        ArtifactState::Stale => format!("{} different version installed", style("⚠").yellow()),
        ArtifactState::Missing => format!("{} not installed", style("✗").red()),
    };
    let registrations = match (&status.settings_error, status.missing_events.as_slice()) {
        (Some(reason), _) => format!("{} {reason}", style("✗").red()),
        (None, []) => format!("{} all events registered", style("✓").green()),
        (None, missing) => format!(
            "{} missing: {}",
            style("⚠").yellow(),
            missing.join(", ")
        ),
    };

    let _ = writeln!(
        out,
        "{LINE_INDENT}Hook script: {} {script}",
        style(hook_script.display()).dim()
    );
    let _ = writeln!(
        out,
        "{LINE_INDENT}Settings:    {} {registrations}",
        style(settings.display()).dim()
    );
}

/// Envelope for `--json` output.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub api_version: &'static str,
    pub command: &'static str,
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn new(command: &'static str, success: bool, data: T) -> Self {
        Self {
            api_version: "1",
            command,
            success,
            data,
        }
    }
}
