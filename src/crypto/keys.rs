//! Master key loading and caching.
//!
//! The master key is a single 32-byte AES-256 key supplied as a
//! 64-character hex string (normally the `ENCRYPTION_SECRET`
//! environment variable).  A `KeyManager` resolves it lazily on first
//! use and keeps it for the rest of its lifetime.  There is no rotation:
//! a new key means a new process.

use std::env::VarError;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{FieldVaultError, Result};

/// Length of the master key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Length of the hex encoding of the master key.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;

/// Environment variable read by default.
pub const DEFAULT_KEY_ENV: &str = "ENCRYPTION_SECRET";

/// Process-wide key manager over `ENCRYPTION_SECRET`.
static GLOBAL: Lazy<Arc<KeyManager>> =
    Lazy::new(|| Arc::new(KeyManager::from_env(DEFAULT_KEY_ENV)));

/// A wrapper around a 32-byte master key that automatically zeroes
/// its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Parse a key from its 64-character hex form.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        if hex_key.len() != KEY_HEX_LEN {
            return Err(FieldVaultError::ConfigError(format!(
                "encryption secret must be a {KEY_HEX_LEN}-character hex string ({KEY_LEN} bytes), got {} characters",
                hex_key.len()
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex_key, &mut bytes).map_err(|e| {
            FieldVaultError::ConfigError(format!("encryption secret is not valid hex: {e}"))
        })?;

        Ok(Self { bytes })
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

/// Generate a fresh random key, hex-encoded, for placement into
/// configuration.
pub fn generate_key_hex() -> String {
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    rand::rng().fill_bytes(&mut bytes[..]);
    hex::encode(&bytes[..])
}

/// Where a `KeyManager` gets its key from.
enum KeySource {
    /// Read the named environment variable on first use.
    Env(String),
    /// An explicit hex string, validated on first use.
    Hex(Zeroizing<String>),
    /// The key was supplied up front; the cell is already filled.
    Preloaded,
}

/// Resolves the master key once and hands out references to it.
///
/// Only a successful load is cached.  A missing or malformed key is
/// reported as `ConfigError` on every call until it is fixed.
pub struct KeyManager {
    source: KeySource,
    key: OnceCell<MasterKey>,
}

impl KeyManager {
    /// Read the key from the environment variable `var`.
    pub fn from_env(var: &str) -> Self {
        Self {
            source: KeySource::Env(var.to_string()),
            key: OnceCell::new(),
        }
    }

    /// Use an explicit hex string as the key source.
    pub fn from_hex(hex_key: &str) -> Self {
        Self {
            source: KeySource::Hex(Zeroizing::new(hex_key.to_string())),
            key: OnceCell::new(),
        }
    }

    /// Wrap an already-built key.
    pub fn from_key(key: MasterKey) -> Self {
        Self {
            source: KeySource::Preloaded,
            key: OnceCell::with_value(key),
        }
    }

    /// The shared process-wide manager reading `ENCRYPTION_SECRET`.
    pub fn global() -> Arc<KeyManager> {
        Arc::clone(&GLOBAL)
    }

    /// Return the cached key, loading it on first call.
    pub fn get_key(&self) -> Result<&MasterKey> {
        self.key.get_or_try_init(|| self.load())
    }

    fn load(&self) -> Result<MasterKey> {
        match &self.source {
            KeySource::Env(var) => {
                let value = std::env::var(var).map(Zeroizing::new).map_err(|e| match e {
                    VarError::NotPresent => FieldVaultError::ConfigError(format!(
                        "{var} is not set; generate one with `fieldvault keygen` and add it to .env.local"
                    )),
                    VarError::NotUnicode(_) => FieldVaultError::ConfigError(format!(
                        "{var} is set but is not valid UTF-8; it must be a {KEY_HEX_LEN}-character hex string"
                    )),
                })?;
                MasterKey::from_hex(&value)
            }
            KeySource::Hex(value) => MasterKey::from_hex(value),
            KeySource::Preloaded => Err(FieldVaultError::ConfigError(
                "preloaded key is missing".into(),
            )),
        }
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            KeySource::Env(var) => format!("env:{var}"),
            KeySource::Hex(_) => "hex".to_string(),
            KeySource::Preloaded => "preloaded".to_string(),
        };
        f.debug_struct("KeyManager")
            .field("source", &source)
            .field("loaded", &self.key.get().is_some())
            .finish()
    }
}
