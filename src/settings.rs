//! Printer settings persisted between runs.

use crate::config::{LabelConfig, default_font_paths};
use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SETTINGS_FILE: &str = "printer_settings.json";

/// Selected printer and label defaults, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    pub printer_name: Option<String>,
    pub copies: u32,
    pub font_paths: Vec<PathBuf>,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            printer_name: None,
            copies: 1,
            font_paths: default_font_paths(),
        }
    }
}

impl PrinterSettings {
    /// Loads settings from `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no printer settings, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    pub fn label_config(&self) -> LabelConfig {
        LabelConfig::default().with_font_paths(self.font_paths.clone())
    }
}
