//! Application settings: service URL, data locations, scoring config path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::densepose::DEFAULT_SERVICE_URL;
use crate::error::PoseCoachError;

/// Settings persisted as TOML in the user's data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the DensePose analysis service
    pub service_url: String,
    /// Directory holding the catalog and history databases
    pub data_dir: PathBuf,
    /// Optional path to a custom scoring configuration TOML.
    /// When unset, the embedded defaults are used.
    pub scoring_config: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            data_dir: default_data_dir(),
            scoring_config: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, PoseCoachError> {
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| PoseCoachError::Settings(format!("Failed to read settings: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| PoseCoachError::Settings(format!("Failed to parse settings: {}", e)))
    }

    /// Save settings as pretty TOML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), PoseCoachError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PoseCoachError::Settings(format!("Failed to create settings dir: {}", e))
            })?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| PoseCoachError::Settings(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| PoseCoachError::Settings(format!("Failed to write settings: {}", e)))
    }

    /// Path of the catalog database under the data directory.
    pub fn catalog_db_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }

    /// Path of the session history database under the data directory.
    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }
}

/// Default settings file location under the platform config directory.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("posecoach")
        .join("settings.toml")
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("posecoach"),
        None => {
            warn!("No platform data directory, using current directory");
            PathBuf::from(".")
        }
    }
}
