//! CLI module — Clap argument parser, output helpers, and command implementations.
//!
//! The binary is operator tooling: generating a key, inspecting single
//! encrypted values, and migrating a data directory.  Applications use
//! the library's `CollectionStore` directly.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;

use crate::config::Settings;
use crate::crypto::KeyManager;
use crate::errors::{FieldVaultError, Result};
use crate::store::CollectionStore;

/// fieldvault CLI: field-level encryption for JSON collection files.
#[derive(Parser)]
#[command(
    name = "fieldvault",
    about = "Field-level encryption at rest for JSON collection files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the collection files (default: .data)
    #[arg(long, env = "FIELDVAULT_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    /// Environment variable holding the encryption key (default: ENCRYPTION_SECRET)
    #[arg(long, global = true)]
    pub key_env: Option<String>,

    /// Dotenv file loaded before reading the key (default: .env.local)
    #[arg(long, global = true)]
    pub env_file: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a new 64-character hex encryption key
    Keygen {
        /// Print only the key, without the KEY= prefix or hints
        #[arg(long)]
        raw: bool,
    },

    /// Decrypt a single iv::authTag::ciphertext value
    Decrypt {
        /// The encrypted value (quote it in the shell)
        value: String,
        /// Print only the plaintext
        #[arg(long)]
        raw: bool,
    },

    /// Encrypt a single value for pasting into a collection file
    Encrypt {
        /// Value to encrypt (omit to read from stdin)
        value: Option<String>,
    },

    /// Encrypt plaintext secrets in every collection file
    Migrate,

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.fieldvault.toml` from `project_dir` and apply CLI overrides.
pub fn resolve_settings(cli: &Cli, project_dir: &Path) -> Result<Settings> {
    let mut settings = Settings::load(project_dir)?;

    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(var) = &cli.key_env {
        if var.is_empty() {
            return Err(FieldVaultError::ConfigError(
                "--key-env cannot be empty".into(),
            ));
        }
        settings.key_env = var.clone();
    }
    if let Some(file) = &cli.env_file {
        settings.env_file = file.clone();
    }

    Ok(settings)
}

/// Load the dotenv file named in `settings`, if it exists.
///
/// Variables already present in the environment win over the file.
pub fn load_env_file(settings: &Settings, project_dir: &Path) -> Result<Option<PathBuf>> {
    let path = settings.env_file_path(project_dir);
    if !path.is_file() {
        return Ok(None);
    }

    dotenvy::from_path(&path).map_err(|e| {
        FieldVaultError::ConfigError(format!("failed to load {}: {e}", path.display()))
    })?;
    Ok(Some(path))
}

/// Build the key manager for the current directory's configuration.
pub fn key_manager(cli: &Cli) -> Result<KeyManager> {
    let cwd = std::env::current_dir()?;
    let settings = resolve_settings(cli, &cwd)?;
    load_env_file(&settings, &cwd)?;
    Ok(KeyManager::from_env(&settings.key_env))
}

/// Build a collection store for the current directory's configuration.
pub fn collection_store(cli: &Cli) -> Result<CollectionStore> {
    let cwd = std::env::current_dir()?;
    let settings = resolve_settings(cli, &cwd)?;
    load_env_file(&settings, &cwd)?;
    Ok(CollectionStore::from_settings(&settings, &cwd))
}
