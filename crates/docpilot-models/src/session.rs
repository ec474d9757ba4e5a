//! Document session types.
//!
//! A [`DocumentSession`] is one authored-document conversation. It is bound
//! to exactly one document path for its whole lifetime; the path is what
//! makes two sessions refer to "the same document".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ids::SessionId;

/// Kind of document being authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    /// Product requirements document.
    Prd,
    /// Requirements specification.
    Requirements,
    /// Design document.
    Design,
    /// Technical specification.
    Spec,
    /// Anything that does not fit the other kinds.
    #[default]
    General,
}

impl DocType {
    /// All known document types.
    pub const ALL: [DocType; 5] = [
        DocType::Prd,
        DocType::Requirements,
        DocType::Design,
        DocType::Spec,
        DocType::General,
    ];

    /// Stable snake_case name, also used as the document subdirectory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prd => "prd",
            Self::Requirements => "requirements",
            Self::Design => "design",
            Self::Spec => "spec",
            Self::General => "general",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prd => "Product Requirements Document",
            Self::Requirements => "Requirements Document",
            Self::Design => "Design Document",
            Self::Spec => "Technical Specification",
            Self::General => "Document",
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a document type name is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown document type: {0}")]
pub struct UnknownDocType(pub String);

impl std::str::FromStr for DocType {
    type Err = UnknownDocType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "prd" | "product_requirements" | "product_requirements_document" => Ok(Self::Prd),
            "requirements" | "requirements_document" | "srs" => Ok(Self::Requirements),
            "design" | "design_doc" | "design_document" | "architecture" => Ok(Self::Design),
            "spec" | "specification" | "technical_spec" | "tech_spec" => Ok(Self::Spec),
            "general" | "document" | "doc" | "other" => Ok(Self::General),
            _ => Err(UnknownDocType(s.to_string())),
        }
    }
}

/// Lifecycle status of a document session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is open for revisions.
    #[default]
    Active,
    /// Session was closed; its record and document remain queryable.
    Closed,
}

/// One (utterance, response) exchange in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// What the user said.
    pub utterance: String,

    /// What the session answered.
    pub response: String,

    /// When the exchange was committed.
    pub timestamp: DateTime<Utc>,
}

impl TurnRecord {
    /// Creates a new turn record stamped with the current time.
    pub fn new(utterance: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A document-authoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSession {
    /// Stable identifier, never reused.
    pub id: SessionId,

    /// Where the document is persisted. Fixed for the session's lifetime.
    pub document_path: PathBuf,

    /// Document kind, classified once at creation.
    pub doc_type: DocType,

    /// Document title, classified once at creation.
    pub title: String,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: SessionStatus,

    /// Append-only turn history.
    #[serde(default)]
    pub turn_history: Vec<TurnRecord>,

    /// Number of persisted document writes.
    #[serde(default)]
    pub revision: u32,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session last changed.
    pub updated_at: DateTime<Utc>,

    /// When the session was last closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl DocumentSession {
    /// Creates a new active session bound to `document_path`.
    pub fn new(
        document_path: impl Into<PathBuf>,
        doc_type: DocType,
        title: impl Into<String>,
    ) -> Self {
        Self::with_id(SessionId::new(), document_path, doc_type, title)
    }

    /// Creates a new active session with a pre-allocated identifier.
    pub fn with_id(
        id: SessionId,
        document_path: impl Into<PathBuf>,
        doc_type: DocType,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            document_path: document_path.into(),
            doc_type,
            title: title.into(),
            status: SessionStatus::Active,
            turn_history: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    /// Returns true if the session is open for revisions.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Returns true if both sessions refer to the same document.
    pub fn same_document(&self, other: &DocumentSession) -> bool {
        self.document_path == other.document_path
    }

    /// Returns true if this session is bound to `path`.
    pub fn is_bound_to(&self, path: &Path) -> bool {
        self.document_path == path
    }

    /// Appends an exchange to the turn history.
    pub fn record_turn(&mut self, utterance: impl Into<String>, response: impl Into<String>) {
        self.turn_history.push(TurnRecord::new(utterance, response));
        self.updated_at = Utc::now();
    }

    /// Records a successful document write.
    pub fn mark_revised(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    /// Marks the session closed.
    pub fn close(&mut self) {
        let now = Utc::now();
        self.status = SessionStatus::Closed;
        self.closed_at = Some(now);
        self.updated_at = now;
    }

    /// Reopens a closed session.
    pub fn reopen(&mut self) {
        self.status = SessionStatus::Active;
        self.updated_at = Utc::now();
    }

    /// Returns the last `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> &[TurnRecord] {
        let start = self.turn_history.len().saturating_sub(n);
        &self.turn_history[start..]
    }
}
