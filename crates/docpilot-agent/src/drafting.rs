//! Document drafting pipeline.
//!
//! Creation is three model calls (profile, draft, follow-up question);
//! a revision is one combined call returning the updated document and the
//! next question. Nothing here touches storage.

use std::sync::Arc;

use docpilot_models::{DocType, DocumentSession};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::context::TurnContext;
use crate::error::{AgentError, Result};
use crate::model::ModelClient;
use crate::parse::{extract_json_object, extract_tag, strip_code_fences};
use crate::prompts::{draft_prompt, follow_up_prompt, profile_prompt, revision_prompt};

/// Question used when a revision reply carries none.
pub const DEFAULT_NEXT_QUESTION: &str = "What would you like to refine next?";

const MAX_TITLE_WORDS: usize = 8;

/// Document type and title chosen at kickoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentProfile {
    pub doc_type: DocType,
    pub title: String,
}

/// Output of a revision call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Full updated document.
    pub content: String,
    /// Next follow-up question.
    pub question: String,
}

/// Turns utterances into document content via the model.
#[derive(Clone)]
pub struct DraftingPipeline {
    model: Arc<dyn ModelClient>,
}

impl DraftingPipeline {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Classify the kickoff into a document type and title.
    ///
    /// A hint overrides the model's type. Unreadable output falls back to the
    /// hint (or [`DocType::General`]) and a title taken from the utterance.
    pub async fn classify_document(
        &self,
        utterance: &str,
        doc_type_hint: Option<DocType>,
    ) -> Result<DocumentProfile> {
        let raw = self.model.complete(&profile_prompt(utterance, doc_type_hint)).await?;
        trace!(raw = %raw, "Profile output");

        let wire = extract_json_object(strip_code_fences(&raw))
            .and_then(|json| serde_json::from_str::<WireProfile>(json).ok());

        let (model_type, model_title) = match wire {
            Some(w) => (
                w.doc_type.and_then(|t| t.parse::<DocType>().ok()),
                w.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            ),
            None => (None, None),
        };

        let profile = DocumentProfile {
            doc_type: doc_type_hint.or(model_type).unwrap_or_default(),
            title: model_title.unwrap_or_else(|| title_from_utterance(utterance)),
        };
        debug!(doc_type = %profile.doc_type, title = %profile.title, "Document profile");
        Ok(profile)
    }

    /// Generate the initial draft.
    pub async fn draft(&self, profile: &DocumentProfile, utterance: &str) -> Result<String> {
        let raw = self
            .model
            .complete(&draft_prompt(utterance, profile.doc_type, &profile.title))
            .await?;
        let content = extract_tag(&raw, "document")
            .unwrap_or_else(|| strip_code_fences(&raw))
            .to_string();
        if content.trim().is_empty() {
            return Err(AgentError::EmptyResponse("draft"));
        }
        Ok(content)
    }

    /// Ask the first follow-up question about a fresh draft.
    pub async fn follow_up(&self, profile: &DocumentProfile, content: &str) -> Result<String> {
        let raw = self
            .model
            .complete(&follow_up_prompt(&profile.title, content))
            .await?;
        let question = raw.trim();
        if question.is_empty() {
            return Err(AgentError::EmptyResponse("question"));
        }
        Ok(question.to_string())
    }

    /// Apply `utterance` to `current` and get the next question.
    ///
    /// Fails if the reply has no document section or the document is blank.
    pub async fn revise(
        &self,
        session: &DocumentSession,
        current: &str,
        utterance: &str,
        ctx: &TurnContext,
    ) -> Result<Revision> {
        let prompt = revision_prompt(session, current, utterance, ctx.history_window);
        let raw = self.model.complete(&prompt).await?;
        trace!(session_id = %session.id, raw = %raw, "Revision output");
        parse_revision(&raw)
    }
}

/// Parse a `<document>` / `<question>` reply.
pub fn parse_revision(raw: &str) -> Result<Revision> {
    let content = extract_tag(raw, "document")
        .ok_or_else(|| AgentError::ResponseParse("revision has no <document> section".into()))?;
    if content.is_empty() {
        return Err(AgentError::EmptyResponse("revision"));
    }
    let question = extract_tag(raw, "question")
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_NEXT_QUESTION);

    Ok(Revision {
        content: strip_code_fences(content).to_string(),
        question: question.to_string(),
    })
}

/// Title derived from the first words of the utterance.
pub fn title_from_utterance(utterance: &str) -> String {
    let words: Vec<&str> = utterance
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .take(MAX_TITLE_WORDS)
        .collect();
    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Untitled".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct WireProfile {
    #[serde(default, alias = "docType", alias = "type")]
    doc_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
}
