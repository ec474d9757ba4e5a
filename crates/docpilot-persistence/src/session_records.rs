//! Session record store for document session metadata.

use std::fs;
use std::path::PathBuf;

use docpilot_models::{DocumentSession, SessionId};
use tracing::warn;

use crate::atomic::{atomic_write_json, read_json};
use crate::error::{PersistenceError, Result};

/// Manages persistence of document session records.
///
/// Only metadata and turn history are stored here; document bodies live at
/// each session's `document_path`.
/// ```text
/// base_path/
/// └── sessions/
///     ├── sess-abc123.json
///     └── sess-def456.json
/// ```
pub struct SessionRecordStore {
    base_path: PathBuf,
}

impl SessionRecordStore {
    /// Creates a new SessionRecordStore with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the directory holding session records.
    pub fn sessions_dir(&self) -> PathBuf {
        self.base_path.join("sessions")
    }

    fn record_path(&self, id: &SessionId) -> PathBuf {
        self.sessions_dir().join(format!("{}.json", id))
    }

    /// Saves a session record, replacing any previous version.
    pub fn save_session(&self, session: &DocumentSession) -> Result<()> {
        atomic_write_json(&self.record_path(&session.id), session)
    }

    /// Loads a session record by ID.
    pub fn load_session(&self, id: &SessionId) -> Result<DocumentSession> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(PersistenceError::NotFound {
                kind: "session".to_string(),
                id: id.to_string(),
            });
        }
        read_json(&path)
    }

    /// Lists all session records, most recently updated first.
    ///
    /// Unreadable records are skipped with a warning.
    pub fn list_sessions(&self) -> Result<Vec<DocumentSession>> {
        let dir = self.sessions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|source| PersistenceError::ReadError {
            path: dir.clone(),
            source,
        })?;

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::ReadError {
                path: dir.clone(),
                source,
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_json::<DocumentSession>(&path) {
                    Ok(session) => sessions.push(session),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable session record");
                    }
                }
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    /// Deletes a session record. Missing records are ignored.
    pub fn delete_session(&self, id: &SessionId) -> Result<()> {
        let path = self.record_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| PersistenceError::WriteError { path, source })?;
        }
        Ok(())
    }

    /// Deletes every session record.
    pub fn clear(&self) -> Result<()> {
        let dir = self.sessions_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|source| PersistenceError::WriteError { path: dir, source })?;
        }
        Ok(())
    }
}
