use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::markdown::writer::DEFAULT_HEADER_TEMPLATE;

const APP_DIR: &str = "daybook";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join(APP_DIR)
}

fn default_header_template() -> String {
    DEFAULT_HEADER_TEMPLATE.to_string()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DaybookConfig {
    /// Where the remembered folder handle is kept.
    pub data_directory: PathBuf,
    pub debug_logging: bool,
    /// First line of a new daily note; `{date}` becomes `YYYY-MM-DD`.
    pub header_template: String,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
            header_template: default_header_template(),
        }
    }
}

impl DaybookConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Missing or malformed files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_directory.join("state.json")
    }
}
