//! Stateless capability agents for non-authoring requests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::{TurnContext, DEFAULT_AGENT};
use crate::error::Result;
use crate::model::ModelClient;
use crate::prompts::agent_prompt;
use crate::response::AgentResponse;

/// Answers one-shot requests by capability name.
#[async_trait]
pub trait AgentDispatcher: Send + Sync {
    /// Handle `prompt` with the agent registered for `capability`.
    async fn handle_request(
        &self,
        capability: &str,
        prompt: &str,
        ctx: &TurnContext,
    ) -> Result<AgentResponse>;
}

const GENERAL_AGENT_PROMPT: &str = r#"You are a helpful assistant embedded in a document-authoring tool.
Answer the user's question directly and concisely. Do not start writing a document unless asked."#;

const RESEARCH_AGENT_PROMPT: &str = r#"You are a research assistant.
Give a well-organised, factual answer. Call out uncertainty explicitly."#;

const REVIEW_AGENT_PROMPT: &str = r#"You are a critical reviewer of technical documents.
Point out gaps, contradictions and unclear requirements as a short list."#;

const ARCHITECT_AGENT_PROMPT: &str = r#"You are a software architect.
Explain trade-offs between design options and recommend one, briefly."#;

/// Dispatcher backed by a [`ModelClient`] and a capability → system prompt table.
///
/// Unknown capabilities are answered with the general prompt.
#[derive(Clone)]
pub struct ModelAgentDispatcher {
    model: Arc<dyn ModelClient>,
    capabilities: HashMap<String, String>,
}

impl ModelAgentDispatcher {
    /// Create a dispatcher with the built-in capabilities.
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        let capabilities = [
            (DEFAULT_AGENT, GENERAL_AGENT_PROMPT),
            ("research", RESEARCH_AGENT_PROMPT),
            ("review", REVIEW_AGENT_PROMPT),
            ("architect", ARCHITECT_AGENT_PROMPT),
        ]
        .into_iter()
        .map(|(name, prompt)| (name.to_string(), prompt.to_string()))
        .collect();

        Self { model, capabilities }
    }

    /// Register or replace a capability.
    pub fn with_capability(mut self, name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        self.capabilities.insert(name.into(), system_prompt.into());
        self
    }

    /// Registered capability names, sorted.
    pub fn capabilities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn system_prompt(&self, capability: &str) -> &str {
        self.capabilities
            .get(capability)
            .or_else(|| self.capabilities.get(DEFAULT_AGENT))
            .map_or(GENERAL_AGENT_PROMPT, String::as_str)
    }
}

#[async_trait]
impl AgentDispatcher for ModelAgentDispatcher {
    async fn handle_request(
        &self,
        capability: &str,
        prompt: &str,
        _ctx: &TurnContext,
    ) -> Result<AgentResponse> {
        if !self.capabilities.contains_key(capability) {
            debug!(capability, "Unknown capability, using general agent");
        }
        let system = self.system_prompt(capability);
        let content = self.model.complete(&agent_prompt(system, prompt)).await?;
        Ok(AgentResponse::text(capability, content.trim()))
    }
}
