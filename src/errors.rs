use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in fieldvault.
#[derive(Debug, Error)]
pub enum FieldVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Invalid encrypted value: {0} (expected iv::authTag::ciphertext)")]
    InvalidEnvelope(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- Store errors ---
    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Data directory not found at {0}")]
    DataDirNotFound(PathBuf),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for fieldvault results.
pub type Result<T> = std::result::Result<T, FieldVaultError>;
