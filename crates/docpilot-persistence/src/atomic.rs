//! Atomic file operations for crash-safe document and record writes.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Writes data to a file atomically.
///
/// Data goes to a temporary file in the target's directory, is synced, then
/// renamed over the target. The temp file is removed when it is dropped, so
/// any early return leaves the previous file contents untouched.
///
/// Missing parent directories are created.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    // Same directory keeps the rename on one filesystem
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(data).map_err(write_err)?;
    temp_file.flush().map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;

    temp_file
        .persist(path)
        .map_err(|e| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

/// Writes JSON data to a file atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Reads a UTF-8 file, returning None if it does not exist.
pub fn read_text_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistenceError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads and deserializes JSON from a file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prd.md");

        atomic_write(&path, b"# Draft 1").unwrap();
        atomic_write(&path, b"# Draft 2\n\nMore detail").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# Draft 2\n\nMore detail");
    }

    #[test]
    fn test_atomic_write_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs/prd/mobile-app.md");

        atomic_write(&path, b"# Mobile App").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spec.md");

        atomic_write(&path, b"content").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("design.md");
        atomic_write(&path, b"original").unwrap();

        // A directory cannot be the parent of a file
        let bad = path.join("child.md");
        assert!(atomic_write(&bad, b"never").is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_read_text_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.md");
        assert!(read_text_optional(&path).unwrap().is_none());

        atomic_write(&path, b"now here").unwrap();
        assert_eq!(read_text_optional(&path).unwrap().as_deref(), Some("now here"));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");

        atomic_write_json(&path, &serde_json::json!({"title": "Forex"})).unwrap();
        let value: serde_json::Value = read_json(&path).unwrap();

        assert_eq!(value["title"], "Forex");
    }
}
