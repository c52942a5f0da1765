//! On-disk layout of a collection file.
//!
//! A collection file is plain JSON, pretty-printed with two-space
//! indentation.  Only sensitive string fields carry envelopes; everything
//! else stays human-readable.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{FieldVaultError, Result};

/// Extension every collection file carries.
pub const EXTENSION: &str = "json";

/// Longest accepted collection file name.
const MAX_NAME_LEN: usize = 255;

/// Serialize `doc` the way it is stored on disk.
pub fn to_pretty_json(doc: &Value) -> Result<String> {
    serde_json::to_string_pretty(doc)
        .map_err(|e| FieldVaultError::SerializationError(format!("document: {e}")))
}

/// Write a document to disk, replacing the whole file.
///
/// The bytes go to a uniquely named temp file in the same directory which
/// is then renamed over the target, so readers never see a half-written
/// file and concurrent writers never share a temp file.  The last rename
/// wins.  A temp file whose rename fails is removed.
pub fn write_document(path: &Path, doc: &Value) -> Result<()> {
    let contents = to_pretty_json(doc)?;

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(file = %path.display(), bytes = contents.len(), "wrote collection file");
    Ok(())
}

/// Validate that a collection name is a plain file name.
///
/// Names are used verbatim as file names inside the data directory, so
/// path separators, `..` and hidden names are refused.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FieldVaultError::InvalidCollectionName(
            "collection name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(FieldVaultError::InvalidCollectionName(format!(
            "collection name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if name.starts_with('.') {
        return Err(FieldVaultError::InvalidCollectionName(format!(
            "'{name}' cannot start with a period"
        )));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(FieldVaultError::InvalidCollectionName(format!(
            "'{name}' must be a plain file name without path separators"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let text = to_pretty_json(&json!({ "a": [1] })).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn write_document_replaces_file_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("teams.json");
        fs::write(&path, "old contents that are much longer than the new ones").unwrap();

        write_document(&path, &json!([])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temp file left behind");
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let target = dir.path().join("users.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(write_document(&target, &json!([])).is_err());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["users.json"]);
    }

    #[test]
    fn concurrent_writers_to_one_file_all_succeed() {
        let dir = TempDir::new().unwrap();
        let path = Arc::new(dir.path().join("users.json"));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let path = Arc::clone(&path);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        write_document(&path, &json!({ "writer": t, "round": i })).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last: Value = serde_json::from_str(&fs::read_to_string(&*path).unwrap()).unwrap();
        assert_eq!(last["round"], 199);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn valid_collection_names() {
        assert!(validate_collection_name("users.json").is_ok());
        assert!(validate_collection_name("progress_submissions.json").is_ok());
        assert!(validate_collection_name("email-templates").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("..").is_err());
        assert!(validate_collection_name("../etc/passwd").is_err());
        assert!(validate_collection_name("a/b.json").is_err());
        assert!(validate_collection_name("a\\b.json").is_err());
        assert!(validate_collection_name(".hidden.json").is_err());
    }

    #[test]
    fn rejects_too_long_name() {
        let long_name = "a".repeat(256);
        assert!(validate_collection_name(&long_name).is_err());
    }
}
