use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_KEY_ENV;
use crate::errors::{FieldVaultError, Result};

/// Project-level configuration, loaded from `.fieldvault.toml`.
///
/// Every field has a sensible default so fieldvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the collection files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Environment variable holding the 64-hex-character master key.
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Dotenv file the CLI loads before resolving the key.
    #[serde(default = "default_env_file")]
    pub env_file: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".data".to_string()
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

fn default_env_file() -> String {
    ".env.local".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            key_env: default_key_env(),
            env_file: default_env_file(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".fieldvault.toml";

    /// Load settings from `<project_dir>/.fieldvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            FieldVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path of the data directory.
    ///
    /// Example: `project_dir/.data`
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    /// Full path of the dotenv file.
    pub fn env_file_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.env_file)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
