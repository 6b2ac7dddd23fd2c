use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::CONFIG;

/// Settings that survive between runs of the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub night_theme: bool,
}

impl Preferences {
    /// `SCOUT_PREFS_PATH`, or `<config dir>/scout/preferences.json`.
    pub fn default_path() -> PathBuf {
        CONFIG.prefs_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("scout")
                .join("preferences.json")
        })
    }

    /// Reads preferences from `path`. A missing file gives the defaults; an unreadable
    /// or corrupt one is logged and also gives the defaults.
    pub fn load(path: &Path) -> Preferences {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Preferences::default(),
            Err(e) => {
                log::warn!("cannot read preferences {}: {}", path.display(), e);
                return Preferences::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring corrupt preferences {}: {}", path.display(), e);
            Preferences::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write preferences to {}", path.display()))?;
        log::debug!("saved preferences to {}", path.display());
        Ok(())
    }
}
