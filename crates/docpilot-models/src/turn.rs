//! Per-turn result returned to callers of the router.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ids::SessionId;

/// Which layer answered a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutedTo {
    /// A one-shot capability agent answered.
    Agent,
    /// A document session answered.
    Conversation,
}

impl std::fmt::Display for RoutedTo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Conversation => write!(f, "conversation"),
        }
    }
}

/// Caller-visible outcome of one routed utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Layer that produced the response.
    pub routed_to: RoutedTo,

    /// Session involved in the turn, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// Document involved in the turn, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_path: Option<PathBuf>,

    /// Text to show the user. Never empty.
    pub response: String,

    /// Whether the conversation expects more input for this document.
    pub should_continue: bool,

    /// Degradation detail when a collaborator failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TurnResult {
    /// Result of a one-shot agent answer.
    pub fn agent(response: impl Into<String>) -> Self {
        Self {
            routed_to: RoutedTo::Agent,
            session_id: None,
            document_path: None,
            response: response.into(),
            should_continue: true,
            error: None,
        }
    }

    /// Result of a document-session turn.
    pub fn conversation(
        session_id: SessionId,
        document_path: impl Into<PathBuf>,
        response: impl Into<String>,
        should_continue: bool,
    ) -> Self {
        Self {
            routed_to: RoutedTo::Conversation,
            session_id: Some(session_id),
            document_path: Some(document_path.into()),
            response: response.into(),
            should_continue,
            error: None,
        }
    }

    /// Attach an error description.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Returns true if a document session answered.
    pub fn is_conversation(&self) -> bool {
        self.routed_to == RoutedTo::Conversation
    }

    /// Returns true if a collaborator failure was recorded.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
