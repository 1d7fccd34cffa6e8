use agentlog_common::{DesiredArtifact, InstallLayout, layout::HOOK_SCRIPT_MODE};
use serde_json::Value;
use std::fs;
use std::time::SystemTime;
use tempfile::TempDir;

pub const SCRIPT: &[u8] = b"#!/usr/bin/env bash\n# agent-spy test build\nexit 0\n";

/// A throwaway home directory with the installer layout rooted in it.
pub struct TestHome {
    pub dir: TempDir,
    pub layout: InstallLayout,
}

impl TestHome {
    pub fn new() -> Self {
        crate::test_log!("FIXTURE: Creating temporary home");
        let dir = TempDir::new().expect("Failed to create temp dir");
        let layout = InstallLayout::for_home(dir.path());
        Self { dir, layout }
    }

    pub fn desired(&self) -> DesiredArtifact {
        DesiredArtifact::new(SCRIPT, self.layout.hook_script.clone(), HOOK_SCRIPT_MODE)
    }

    pub fn write_settings(&self, value: &Value) {
        self.write_settings_raw(&serde_json::to_string_pretty(value).expect("serialize settings"));
    }

    pub fn write_settings_raw(&self, content: &str) {
        fs::create_dir_all(&self.layout.config_home).expect("Failed to create config home");
        fs::write(&self.layout.settings, content).expect("Failed to write settings.json");
    }

    pub fn settings_text(&self) -> String {
        fs::read_to_string(&self.layout.settings).expect("Failed to read settings.json")
    }

    pub fn settings(&self) -> Value {
        serde_json::from_str(&self.settings_text()).expect("Failed to parse settings.json")
    }

    pub fn modified(&self, path: &std::path::Path) -> SystemTime {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .expect("Failed to stat file")
    }
}
