//! Document session store.
//!
//! Owns every [`DocumentSession`], live or closed, independent of whichever
//! router currently points at one. Sessions are looked up by id; a closed
//! session keeps its id and document path and can be resumed.
//!
//! # Commit discipline
//!
//! All model calls for a turn complete before anything is written. The
//! document is written next, and only after that write succeeds is the
//! in-memory session inserted or mutated. The lock is never held across a
//! model call or a write, so a dropped turn future leaves the store as it was.

mod paths;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docpilot_core::is_completion_signal;
use docpilot_models::{DocType, DocumentSession, SessionId, TurnResult};
use docpilot_persistence::{DocumentStorage, SessionRecordStore};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::context::TurnContext;
use crate::drafting::{DraftingPipeline, Revision};
use crate::error::{AgentError, Result};
use crate::model::ModelClient;

pub use self::paths::{document_path, slugify, MAX_SLUG_LEN};

/// Reply when a revision could not be drafted.
pub const DRAFTING_FALLBACK: &str =
    "I couldn't update the document just now. Your draft is unchanged; please try that again.";

/// Reply when a revision could not be saved.
pub const PERSISTENCE_FALLBACK: &str =
    "I couldn't save that change. Your previous draft is still in place; please try again.";

/// Reply when a session is closed with a completion signal.
pub const CLOSED_RESPONSE: &str = "Great, I've saved the document. Let me know if you want to revisit it.";

/// Result of a store operation that produced a reply for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub document_path: PathBuf,
    pub response: String,
    pub should_continue: bool,
    /// Set when drafting or persistence degraded the turn.
    pub error: Option<String>,
}

impl SessionOutcome {
    fn new(session: &DocumentSession, response: impl Into<String>, should_continue: bool) -> Self {
        Self {
            session_id: session.id.clone(),
            document_path: session.document_path.clone(),
            response: response.into(),
            should_continue,
            error: None,
        }
    }

    fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

impl From<SessionOutcome> for TurnResult {
    fn from(outcome: SessionOutcome) -> Self {
        let result = TurnResult::conversation(
            outcome.session_id,
            outcome.document_path,
            outcome.response,
            outcome.should_continue,
        );
        match outcome.error {
            Some(error) => result.with_error(error),
            None => result,
        }
    }
}

/// Owns document sessions and drives the drafting pipeline for them.
pub struct DocumentSessionStore {
    sessions: RwLock<HashMap<SessionId, DocumentSession>>,
    storage: Arc<dyn DocumentStorage>,
    records: Option<SessionRecordStore>,
    pipeline: DraftingPipeline,
    docs_dir: PathBuf,
}

impl DocumentSessionStore {
    /// Create an empty store without session record persistence.
    pub fn new(
        model: Arc<dyn ModelClient>,
        storage: Arc<dyn DocumentStorage>,
        docs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            storage,
            records: None,
            pipeline: DraftingPipeline::new(model),
            docs_dir: docs_dir.into(),
        }
    }

    /// Create a store that persists session records and reloads existing ones.
    pub fn open(
        model: Arc<dyn ModelClient>,
        storage: Arc<dyn DocumentStorage>,
        docs_dir: impl Into<PathBuf>,
        records: SessionRecordStore,
    ) -> Result<Self> {
        let loaded: HashMap<SessionId, DocumentSession> = records
            .list_sessions()?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        info!(sessions = loaded.len(), "Loaded session records");

        Ok(Self {
            sessions: RwLock::new(loaded),
            storage,
            records: Some(records),
            pipeline: DraftingPipeline::new(model),
            docs_dir: docs_dir.into(),
        })
    }

    /// Directory new documents are allocated under.
    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Start a new session from a kickoff utterance.
    ///
    /// Classifies type and title, drafts, asks a follow-up question, then
    /// persists the draft to a fresh path. On any failure nothing is created.
    pub async fn start_new_session(
        &self,
        utterance: &str,
        doc_type_hint: Option<DocType>,
        _ctx: &TurnContext,
    ) -> Result<SessionOutcome> {
        let profile = self.pipeline.classify_document(utterance, doc_type_hint).await?;
        let content = self.pipeline.draft(&profile, utterance).await?;
        let question = self.pipeline.follow_up(&profile, &content).await?;

        let id = SessionId::new();
        let path = self.allocate_path(profile.doc_type, &profile.title, &id).await?;
        self.storage.write(&path, &content).await?;

        let mut session = DocumentSession::with_id(id.clone(), path, profile.doc_type, profile.title);
        session.mark_revised();
        session.record_turn(utterance, &question);
        self.sessions.write().await.insert(id.clone(), session.clone());
        self.save_record(&session);

        info!(
            session_id = %id,
            doc_type = %session.doc_type,
            path = %session.document_path.display(),
            "Started document session"
        );
        Ok(SessionOutcome::new(&session, question, true))
    }

    /// Apply `utterance` to an active session.
    ///
    /// A completion signal closes the session instead. Drafting and
    /// persistence failures degrade to a fallback reply with `error` set; the
    /// session stays active and the document is left untouched.
    pub async fn continue_session(
        &self,
        id: &SessionId,
        utterance: &str,
        ctx: &TurnContext,
    ) -> Result<SessionOutcome> {
        let snapshot = self.snapshot(id).await?;
        if !snapshot.is_active() {
            return Err(AgentError::SessionClosed(id.clone()));
        }

        if is_completion_signal(utterance) {
            let closed = self.close_session(id).await?;
            return Ok(SessionOutcome::new(&closed, CLOSED_RESPONSE, false));
        }

        self.revise(snapshot, utterance, ctx, false).await
    }

    /// Close a session. Closing a closed session is a no-op.
    pub async fn close_session(&self, id: &SessionId) -> Result<DocumentSession> {
        let closed = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(id)
                .ok_or_else(|| AgentError::SessionNotFound(id.clone()))?;
            if !session.is_active() {
                return Ok(session.clone());
            }
            session.close();
            session.clone()
        };

        self.save_record(&closed);
        info!(session_id = %id, path = %closed.document_path.display(), "Closed document session");
        Ok(closed)
    }

    /// Reopen a session (usually closed) and apply `utterance` as a revision.
    ///
    /// The session keeps its id and document path. It is reopened even if
    /// the revision itself degrades to a fallback.
    pub async fn resume_session(
        &self,
        id: &SessionId,
        utterance: &str,
        ctx: &TurnContext,
    ) -> Result<SessionOutcome> {
        let snapshot = self.snapshot(id).await?;
        info!(session_id = %id, path = %snapshot.document_path.display(), "Resuming document session");
        self.revise(snapshot, utterance, ctx, true).await
    }

    /// Returns true if a session with this id exists, active or closed.
    pub async fn has_session(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Returns a copy of the session.
    pub async fn get_session(&self, id: &SessionId) -> Option<DocumentSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// All sessions, most recently updated first.
    pub async fn list_sessions(&self) -> Vec<DocumentSession> {
        let mut sessions: Vec<DocumentSession> =
            self.sessions.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// The most recently closed session, if any.
    pub async fn last_closed(&self) -> Option<DocumentSession> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_active())
            .max_by_key(|s| s.closed_at)
            .cloned()
    }

    /// Current content of a session's document.
    pub async fn read_document(&self, id: &SessionId) -> Result<Option<String>> {
        let session = self.snapshot(id).await?;
        Ok(self.storage.read(&session.document_path).await?)
    }

    /// Forget every session. Documents on storage are kept.
    pub async fn clear_all(&self) -> Result<()> {
        let count = {
            let mut sessions = self.sessions.write().await;
            let count = sessions.len();
            sessions.clear();
            count
        };
        if let Some(records) = &self.records {
            records.clear()?;
        }
        info!(sessions = count, "Cleared session store");
        Ok(())
    }

    async fn snapshot(&self, id: &SessionId) -> Result<DocumentSession> {
        self.get_session(id)
            .await
            .ok_or_else(|| AgentError::SessionNotFound(id.clone()))
    }

    async fn revise(
        &self,
        snapshot: DocumentSession,
        utterance: &str,
        ctx: &TurnContext,
        reopen: bool,
    ) -> Result<SessionOutcome> {
        let id = snapshot.id.clone();
        let path = snapshot.document_path.clone();

        let current = match self.storage.read(&path).await {
            Ok(content) => content.unwrap_or_default(),
            Err(e) => {
                warn!(session_id = %id, error = %e, "Could not read document");
                return self
                    .degrade(&snapshot, reopen, PERSISTENCE_FALLBACK, e)
                    .await;
            }
        };

        let revision = match self.pipeline.revise(&snapshot, &current, utterance, ctx).await {
            Ok(revision) if revision.content.trim() == current.trim() => {
                warn!(session_id = %id, "Revision left the document unchanged");
                return self
                    .degrade(&snapshot, reopen, DRAFTING_FALLBACK, "model returned no document changes")
                    .await;
            }
            Ok(revision) => revision,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Revision drafting failed");
                return self.degrade(&snapshot, reopen, DRAFTING_FALLBACK, e).await;
            }
        };

        if let Err(e) = self.storage.write(&path, &revision.content).await {
            warn!(session_id = %id, error = %e, "Could not persist revision");
            return self.degrade(&snapshot, reopen, PERSISTENCE_FALLBACK, e).await;
        }

        let committed = self.commit_revision(&snapshot, utterance, &revision, reopen).await;
        debug!(
            session_id = %id,
            revision = committed.revision,
            bytes = revision.content.len(),
            "Document revised"
        );
        Ok(SessionOutcome::new(&committed, revision.question, true))
    }

    /// Record a successful write. Falls back to the snapshot if the session
    /// was removed concurrently (e.g. by `clear_all`).
    async fn commit_revision(
        &self,
        snapshot: &DocumentSession,
        utterance: &str,
        revision: &Revision,
        reopen: bool,
    ) -> DocumentSession {
        let committed = {
            let mut sessions = self.sessions.write().await;
            match sessions.get_mut(&snapshot.id) {
                Some(session) => {
                    if reopen {
                        session.reopen();
                    }
                    session.mark_revised();
                    session.record_turn(utterance, &revision.question);
                    Some(session.clone())
                }
                None => None,
            }
        };

        match committed {
            Some(session) => {
                self.save_record(&session);
                session
            }
            None => {
                warn!(session_id = %snapshot.id, "Session removed during revision");
                snapshot.clone()
            }
        }
    }

    /// Fallback outcome for a failed revision; reopens if resuming.
    async fn degrade(
        &self,
        snapshot: &DocumentSession,
        reopen: bool,
        response: &str,
        error: impl ToString,
    ) -> Result<SessionOutcome> {
        if reopen && !snapshot.is_active() {
            let reopened = {
                let mut sessions = self.sessions.write().await;
                sessions.get_mut(&snapshot.id).map(|s| {
                    s.reopen();
                    s.clone()
                })
            };
            if let Some(session) = reopened {
                self.save_record(&session);
            }
        }
        Ok(SessionOutcome::new(snapshot, response, true).with_error(error))
    }

    async fn allocate_path(&self, doc_type: DocType, title: &str, id: &SessionId) -> Result<PathBuf> {
        let preferred = document_path(&self.docs_dir, doc_type, title, &id.short());
        let taken = self
            .sessions
            .read()
            .await
            .values()
            .any(|s| s.is_bound_to(&preferred));
        if !taken && !self.storage.exists(&preferred).await? {
            return Ok(preferred);
        }
        // Short ids collided; the full id is unique
        Ok(document_path(&self.docs_dir, doc_type, title, id.as_str()))
    }

    fn save_record(&self, session: &DocumentSession) {
        if let Some(records) = &self.records {
            if let Err(e) = records.save_session(session) {
                warn!(session_id = %session.id, error = %e, "Could not save session record");
            }
        }
    }
}
