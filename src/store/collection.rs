//! Encrypted collection files — the read/write surface used by the rest
//! of the application.
//!
//! `CollectionStore` wraps the file format layer and the crypto layer so
//! that callers work with plain values:
//! `store.write("users.json", &users)` and
//! `store.read("users.json", Vec::new())`.  Sensitive fields are
//! encrypted on the way out and decrypted on the way in.  Files that
//! still hold plaintext secrets are rewritten in encrypted form the first
//! time they are read.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::crypto::encryption::{decrypt_or_passthrough, encrypt};
use crate::crypto::envelope::Envelope;
use crate::crypto::keys::{KeyManager, MasterKey};
use crate::document::{needs_migration, transform, try_transform};
use crate::errors::{FieldVaultError, Result};

use super::format::{self, EXTENSION};

/// Result of running the migration step on one existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Plaintext secrets were found and the file was rewritten.
    Migrated,
    /// Every sensitive field was already encrypted (or empty).
    UpToDate,
    /// The file is not valid JSON; it was left untouched.
    Corrupt(String),
}

/// What `load` found on disk.
enum Loaded {
    /// The file was missing, unreadable or corrupt and has been reset.
    Default,
    /// The decrypted document.
    Document(Value),
}

/// Encrypt every non-empty sensitive string in `doc`.
///
/// Empty strings stay empty so "no password set" survives a round trip.
pub fn encrypt_document(key: &MasterKey, doc: &Value) -> Result<Value> {
    try_transform(doc, |_, value| {
        if value.is_empty() {
            Ok(String::new())
        } else {
            encrypt(key, value)
        }
    })
}

/// Encrypt only the legacy plaintext secrets in `doc`.
///
/// Values already in envelope form and empty strings are kept as they
/// are, so a file mixing encrypted and plaintext fields is not encrypted
/// twice.
pub fn migrate_document(key: &MasterKey, doc: &Value) -> Result<Value> {
    try_transform(doc, |_, value| {
        if value.is_empty() || Envelope::is_envelope(value) {
            Ok(value.to_string())
        } else {
            encrypt(key, value)
        }
    })
}

/// Decrypt every sensitive string in `doc`.
///
/// Legacy plaintext and values that fail authentication are kept as-is.
pub fn decrypt_document(key: &MasterKey, doc: &Value) -> Value {
    transform(doc, |_, value| decrypt_or_passthrough(key, value))
}

/// Handle on a data directory of JSON collection files.
///
/// There is no locking: two writers to the same file race and the later
/// write wins.  Callers that need atomic read-modify-write must serialize
/// access per file name themselves.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    /// Directory holding the collection files.
    data_dir: PathBuf,

    /// Source of the master key, shared between stores.
    keys: Arc<KeyManager>,
}

impl CollectionStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a store over `data_dir`.  Nothing is touched on disk
    /// until the first `read` or `write`.
    pub fn new(data_dir: impl Into<PathBuf>, keys: Arc<KeyManager>) -> Self {
        Self {
            data_dir: data_dir.into(),
            keys,
        }
    }

    /// Create a store that uses the process-wide `ENCRYPTION_SECRET` key.
    pub fn with_global_key(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(data_dir, KeyManager::global())
    }

    /// Create a store from project settings.
    ///
    /// Uses `<project_dir>/<data_dir>` and reads the key from the
    /// configured environment variable.
    pub fn from_settings(settings: &Settings, project_dir: &Path) -> Self {
        Self::new(
            settings.data_path(project_dir),
            Arc::new(KeyManager::from_env(&settings.key_env)),
        )
    }

    // ------------------------------------------------------------------
    // Read / write
    // ------------------------------------------------------------------

    /// Read a collection, returning fully decrypted data.
    ///
    /// 1. A missing or unreadable file is created with `default`.
    /// 2. A file that is not valid JSON is overwritten with `default`.
    /// 3. Plaintext secrets are encrypted and the file rewritten once.
    /// 4. Sensitive fields are decrypted and the result deserialized.
    ///
    /// The key is resolved before anything on disk is touched, so a
    /// missing or malformed key fails with `ConfigError` first.
    pub fn read<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = self.keys.get_key()?;
        let path = self.path_for(name)?;
        let default_doc = serde_json::to_value(&default)
            .map_err(|e| FieldVaultError::SerializationError(format!("{name} default: {e}")))?;

        match self.load(key, name, &path, &default_doc)? {
            Loaded::Default => Ok(default),
            Loaded::Document(doc) => serde_json::from_value(doc).map_err(|e| {
                FieldVaultError::SerializationError(format!(
                    "{name} does not match the expected shape: {e}"
                ))
            }),
        }
    }

    /// Like [`read`](Self::read), for untyped documents.
    pub fn read_value(&self, name: &str, default: Value) -> Result<Value> {
        let key = self.keys.get_key()?;
        let path = self.path_for(name)?;

        match self.load(key, name, &path, &default)? {
            Loaded::Default => Ok(default),
            Loaded::Document(doc) => Ok(doc),
        }
    }

    /// Encrypt sensitive fields and overwrite the collection in full.
    pub fn write<T>(&self, name: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = self.keys.get_key()?;
        let path = self.path_for(name)?;
        let doc = serde_json::to_value(value)
            .map_err(|e| FieldVaultError::SerializationError(format!("{name}: {e}")))?;

        self.ensure_data_dir()?;
        persist(key, &path, &doc)
    }

    /// Like [`write`](Self::write), for untyped documents.
    pub fn write_value(&self, name: &str, doc: &Value) -> Result<()> {
        let key = self.keys.get_key()?;
        let path = self.path_for(name)?;

        self.ensure_data_dir()?;
        persist(key, &path, doc)
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Encrypt any plaintext secrets in an existing file.
    ///
    /// Unlike `read`, this never resets anything: a corrupt file is
    /// reported and left as it is, and a missing file is an error.
    pub fn migrate_file(&self, name: &str) -> Result<MigrationOutcome> {
        let key = self.keys.get_key()?;
        let path = self.path_for(name)?;

        let contents = fs::read_to_string(&path)?;
        let doc: Value = match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file = name, error = %e, "collection file is not valid JSON, skipping");
                return Ok(MigrationOutcome::Corrupt(e.to_string()));
            }
        };

        if !needs_migration(&doc) {
            return Ok(MigrationOutcome::UpToDate);
        }

        info!(file = name, "migrating collection file to encrypted format");
        let migrated = migrate_document(key, &doc)?;
        format::write_document(&path, &migrated)?;
        Ok(MigrationOutcome::Migrated)
    }

    /// Names of all collection files in the data directory, sorted.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        if !self.data_dir.is_dir() {
            return Err(FieldVaultError::DataDirNotFound(self.data_dir.clone()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if format::validate_collection_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the key manager this store encrypts with.
    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    /// Full path of the file backing collection `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        format::validate_collection_name(name)?;
        Ok(self.data_dir.join(name))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    fn load(&self, key: &MasterKey, name: &str, path: &Path, default: &Value) -> Result<Loaded> {
        self.ensure_data_dir()?;

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    debug!(file = name, "collection file missing, writing default");
                } else {
                    warn!(file = name, error = %e, "could not read collection file, initializing with default");
                }
                persist(key, path, default)?;
                return Ok(Loaded::Default);
            }
        };

        let doc: Value = match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file = name, error = %e, "could not parse collection file, resetting to default");
                persist(key, path, default)?;
                return Ok(Loaded::Default);
            }
        };

        let doc = if needs_migration(&doc) {
            info!(file = name, "migrating collection file to encrypted format");
            let migrated = migrate_document(key, &doc)?;
            format::write_document(path, &migrated)?;
            info!(file = name, "migration complete");
            migrated
        } else {
            doc
        };

        Ok(Loaded::Document(decrypt_document(key, &doc)))
    }
}

/// Encrypt `doc` and write it to `path`.
fn persist(key: &MasterKey, path: &Path, doc: &Value) -> Result<()> {
    let encrypted = encrypt_document(key, doc)?;
    format::write_document(path, &encrypted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, CollectionStore) {
        let dir = TempDir::new().unwrap();
        let keys = Arc::new(KeyManager::from_key(MasterKey::new([0x5A; 32])));
        let store = CollectionStore::new(dir.path().join(".data"), keys);
        (dir, store)
    }

    #[test]
    fn encrypt_document_leaves_empty_secrets_empty() {
        let key = MasterKey::new([1; 32]);
        let out = encrypt_document(&key, &json!({ "password": "", "token": "t" })).unwrap();
        assert_eq!(out["password"], "");
        assert_ne!(out["token"], "t");
    }

    #[test]
    fn decrypt_document_inverts_encrypt_document() {
        let key = MasterKey::new([2; 32]);
        let doc = json!({ "users": [{ "username": "a", "password": "p" }] });
        let encrypted = encrypt_document(&key, &doc).unwrap();
        assert_eq!(decrypt_document(&key, &encrypted), doc);
    }

    #[test]
    fn migrate_document_keeps_existing_envelopes() {
        let key = MasterKey::new([3; 32]);
        let sealed = encrypt(&key, "fresh").unwrap();
        let doc = json!([
            { "password": sealed, "token": "" },
            { "password": "legacy" }
        ]);

        let out = migrate_document(&key, &doc).unwrap();
        assert_eq!(out[0]["password"], sealed.as_str());
        assert_eq!(out[0]["token"], "");
        assert_ne!(out[1]["password"], "legacy");
        let expected = json!([
            { "password": "fresh", "token": "" },
            { "password": "legacy" }
        ]);
        assert_eq!(decrypt_document(&key, &out), expected);
    }

    #[test]
    fn with_global_key_shares_the_process_key_manager() {
        let store = CollectionStore::with_global_key("/srv/app/.data");
        assert_eq!(store.data_dir(), Path::new("/srv/app/.data"));
        assert!(std::ptr::eq(store.keys(), &*KeyManager::global()));
    }

    #[test]
    fn read_creates_data_dir_and_default_file() {
        let (_dir, store) = store();
        let value = store.read_value("teams.json", json!([])).unwrap();
        assert_eq!(value, json!([]));
        assert!(store.data_dir().join("teams.json").is_file());
    }

    #[test]
    fn invalid_names_are_rejected_before_io() {
        let (_dir, store) = store();
        assert!(matches!(
            store.write_value("../escape.json", &json!({})),
            Err(FieldVaultError::InvalidCollectionName(_))
        ));
        assert!(!store.data_dir().exists());
    }

    #[test]
    fn shape_mismatch_is_an_error_and_keeps_the_file() {
        let (_dir, store) = store();
        store.write_value("settings.json", &json!({ "a": 1 })).unwrap();
        let before = fs::read_to_string(store.path_for("settings.json").unwrap()).unwrap();

        let result: Result<Vec<String>> = store.read("settings.json", Vec::new());
        assert!(matches!(result, Err(FieldVaultError::SerializationError(_))));

        let after = fs::read_to_string(store.path_for("settings.json").unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn migrate_file_reports_each_state() {
        let (_dir, store) = store();
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(store.path_for("legacy.json").unwrap(), r#"{"token":"abc"}"#).unwrap();
        fs::write(store.path_for("broken.json").unwrap(), "{not json").unwrap();

        assert_eq!(store.migrate_file("legacy.json").unwrap(), MigrationOutcome::Migrated);
        assert_eq!(store.migrate_file("legacy.json").unwrap(), MigrationOutcome::UpToDate);
        assert!(matches!(
            store.migrate_file("broken.json").unwrap(),
            MigrationOutcome::Corrupt(_)
        ));
        assert_eq!(
            fs::read_to_string(store.path_for("broken.json").unwrap()).unwrap(),
            "{not json"
        );
        assert!(store.migrate_file("missing.json").is_err());
    }

    #[test]
    fn migrate_file_leaves_encrypted_fields_alone() {
        let (_dir, store) = store();
        store
            .write_value("users.json", &json!([{ "password": "fresh" }]))
            .unwrap();
        let path = store.path_for("users.json").unwrap();
        let mut disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let sealed = disk[0]["password"].clone();
        disk.as_array_mut()
            .unwrap()
            .push(json!({ "password": "legacy" }));
        fs::write(&path, disk.to_string()).unwrap();

        assert_eq!(store.migrate_file("users.json").unwrap(), MigrationOutcome::Migrated);

        let disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(disk[0]["password"], sealed);
        assert_eq!(
            store.read_value("users.json", json!([])).unwrap(),
            json!([{ "password": "fresh" }, { "password": "legacy" }])
        );
    }

    #[test]
    fn list_collections_returns_sorted_json_files() {
        let (_dir, store) = store();
        store.write_value("users.json", &json!([])).unwrap();
        store.write_value("announcements.json", &json!([])).unwrap();
        fs::write(store.data_dir().join("notes.txt"), "x").unwrap();

        assert_eq!(
            store.list_collections().unwrap(),
            ["announcements.json", "users.json"]
        );
    }

    #[test]
    fn list_collections_requires_data_dir() {
        let (_dir, store) = store();
        assert!(matches!(
            store.list_collections(),
            Err(FieldVaultError::DataDirNotFound(_))
        ));
    }
}
