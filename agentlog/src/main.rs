//! Agent Log hook installer
//!
//! Installs the `agent-spy.sh` hook script into `~/.claude/hooks` and
//! registers it in `~/.claude/settings.json` for the subagent lifecycle
//! events. Every change is confirmed interactively; re-running is safe.

#![forbid(unsafe_code)]

mod ui;

use agentlog_common::layout::HOOK_SCRIPT_MODE;
use agentlog_common::{
    CommandProbe, ConfirmationGate, DesiredArtifact, InstallLayout, LogConfig, Reporter,
    SilentReporter, TerminalGate, Verdict, init_logging, inspect, run_install, run_uninstall,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use tracing::debug;
use ui::{ConsoleReporter, DETAIL_INDENT, JsonResponse, LINE_INDENT};

/// The hook script shipped with this build.
const HOOK_SCRIPT: &[u8] = include_bytes!("../hooks/agent-spy.sh");

#[derive(Parser)]
#[command(name = "agentlog")]
#[command(author, version, about = "Agent Log hook installer for Claude Code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the run summary as JSON on stdout (prompts move to stderr)
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install or update the hook script and settings registrations
    Install,

    /// Remove the hook registrations and script, optionally the activity data
    Uninstall,

    /// Show what install would change, without prompting or writing
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("warn");
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    init_logging(&log_config)?;

    let layout = InstallLayout::discover()
        .context("Failed to locate the Claude configuration home")?;
    let desired = DesiredArtifact::new(HOOK_SCRIPT, layout.hook_script.clone(), HOOK_SCRIPT_MODE);
    debug!(home = %layout.config_home.display(), "resolved install layout");

    match cli.command {
        Commands::Install => install(&layout, &desired, cli.json),
        Commands::Uninstall => uninstall(&layout, cli.json),
        Commands::Status => status(&layout, &desired, cli.json),
    }
}

/// Prompts share stdout with status lines unless stdout carries JSON.
fn terminal_gate(indent: &str, json: bool) -> Box<dyn ConfirmationGate> {
    if json {
        Box::new(TerminalGate::new(io::stdin().lock(), io::stderr()).with_indent(indent))
    } else {
        Box::new(TerminalGate::stdio().with_indent(indent))
    }
}

fn install(layout: &InstallLayout, desired: &DesiredArtifact, json: bool) -> Result<()> {
    let mut gate = terminal_gate(DETAIL_INDENT, json);
    let probe = CommandProbe::jq();

    let summary = if json {
        run_install(layout, desired, gate.as_mut(), &probe, &mut SilentReporter)
    } else {
        let mut reporter = ConsoleReporter::new(io::stdout());
        reporter.banner("Agent Log hook installer");
        run_install(layout, desired, gate.as_mut(), &probe, &mut reporter)
    }
    .context("Install aborted")?;

    if json {
        let success = summary.verdict() == Verdict::FullyConfigured;
        print_json(&JsonResponse::new("install", success, &summary))?;
    }
    Ok(())
}

fn uninstall(layout: &InstallLayout, json: bool) -> Result<()> {
    let mut gate = terminal_gate(LINE_INDENT, json);

    let mut silent = SilentReporter;
    let mut console;
    let reporter: &mut dyn Reporter = if json {
        &mut silent
    } else {
        console = ConsoleReporter::new(io::stdout());
        console.banner("Agent Log hook uninstaller");
        &mut console
    };

    let summary = run_uninstall(layout, gate.as_mut(), reporter).context("Uninstall aborted")?;

    if json {
        print_json(&JsonResponse::new("uninstall", summary.is_success(), &summary))?;
    }
    Ok(())
}

fn status(layout: &InstallLayout, desired: &DesiredArtifact, json: bool) -> Result<()> {
    let report = inspect(layout, desired).context("Failed to inspect installation")?;

    if json {
        print_json(&JsonResponse::new("status", report.is_configured(), &report))?;
    } else {
        let mut out = io::stdout().lock();
        ui::render_status(&mut out, &report, &layout.hook_script, &layout.settings);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("Failed to serialize JSON output")?;
    writeln!(out)?;
    Ok(())
}
