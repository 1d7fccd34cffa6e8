#![allow(dead_code)]

pub mod logging;

pub use logging::init_test_logging;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// A temporary `$HOME` for driving the `agentlog` binary.
pub struct TestHome {
    pub dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        crate::test_log!("FIXTURE: Creating temporary home");
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn claude_dir(&self) -> PathBuf {
        self.dir.path().join(".claude")
    }

    pub fn hook_script(&self) -> PathBuf {
        self.claude_dir().join("hooks").join("agent-spy.sh")
    }

    pub fn settings(&self) -> PathBuf {
        self.claude_dir().join("settings.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.claude_dir().join("agent-activity")
    }

    pub fn read_settings(&self) -> serde_json::Value {
        let content =
            std::fs::read_to_string(self.settings()).expect("Failed to read settings.json");
        serde_json::from_str(&content).expect("Failed to parse settings.json")
    }

    /// Run `agentlog <args>` with `stdin` piped in and return its output.
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_agentlog"))
            .args(args)
            .env("HOME", self.dir.path())
            .env_remove("AGENTLOG_LOG")
            .env_remove("CLICOLOR_FORCE")
            .env("NO_COLOR", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start agentlog");

        {
            // The child may exit without reading everything; a broken pipe is fine.
            let mut input = child.stdin.take().expect("Failed to open stdin");
            let _ = input.write_all(stdin.as_bytes());
        }

        child.wait_with_output().expect("Failed to read agentlog output")
    }
}

/// The hook script bundled into the binary.
pub fn bundled_script() -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("hooks").join("agent-spy.sh");
    std::fs::read(path).expect("Failed to read bundled hook script")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected to find '{needle}' in output, got: {haystack}"
    );
}
