//! Model capability trait.
//!
//! Every component that needs text generation (classifier, drafting pipeline,
//! agent dispatcher) depends on [`ModelClient`] rather than a concrete HTTP
//! client, so tests can substitute deterministic implementations.

use async_trait::async_trait;

use crate::error::Result;

/// What a prompt is for. Used for logging and by scripted test models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Routing classification of an utterance during an active session.
    Classify,
    /// Document type and title for a kickoff.
    Profile,
    /// Initial document draft.
    Draft,
    /// First follow-up question after a draft.
    FollowUp,
    /// Combined revision + next question.
    Revise,
    /// One-shot capability agent request.
    Agent,
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Classify => "classify",
            Self::Profile => "profile",
            Self::Draft => "draft",
            Self::FollowUp => "follow_up",
            Self::Revise => "revise",
            Self::Agent => "agent",
        };
        write!(f, "{}", name)
    }
}

/// A single system + user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPrompt {
    /// Purpose of the call.
    pub kind: PromptKind,
    /// System instructions.
    pub system: String,
    /// User content.
    pub user: String,
}

impl ModelPrompt {
    /// Create a prompt.
    pub fn new(kind: PromptKind, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            kind,
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Text generation capability: prompt in, text out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn complete(&self, prompt: &ModelPrompt) -> Result<String>;
}
