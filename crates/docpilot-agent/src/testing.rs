//! Deterministic stand-ins for the model and the agent dispatcher.
//!
//! Used by unit tests in this crate and by the router integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::context::TurnContext;
use crate::drafting::title_from_utterance;
use crate::error::{AgentError, Result};
use crate::model::{ModelClient, ModelPrompt, PromptKind};
use crate::parse::extract_tag;
use crate::dispatcher::AgentDispatcher;
use crate::response::AgentResponse;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Model that answers from per-kind scripts, then from built-in defaults.
///
/// Defaults produce well-formed output for every prompt kind: the classifier
/// says `continue_doc`, drafts echo the request and each revision appends a
/// line to the current document, so documents grow monotonically.
#[derive(Default)]
pub struct ScriptedModel {
    scripts: Mutex<HashMap<PromptKind, VecDeque<String>>>,
    log: Mutex<Vec<ModelPrompt>>,
    failing: AtomicBool,
    failing_kinds: Mutex<HashSet<PromptKind>>,
    stalled_kinds: Mutex<HashSet<PromptKind>>,
    revisions: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next prompt of `kind`.
    pub fn script(&self, kind: PromptKind, reply: impl Into<String>) {
        lock(&self.scripts)
            .entry(kind)
            .or_default()
            .push_back(reply.into());
    }

    /// Make every call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make calls of one kind fail.
    pub fn fail_kind(&self, kind: PromptKind) {
        lock(&self.failing_kinds).insert(kind);
    }

    /// Stop failing calls of one kind.
    pub fn heal_kind(&self, kind: PromptKind) {
        lock(&self.failing_kinds).remove(&kind);
    }

    /// Make calls of one kind never complete.
    pub fn stall_kind(&self, kind: PromptKind) {
        lock(&self.stalled_kinds).insert(kind);
    }

    /// Let calls of one kind complete again.
    pub fn release_kind(&self, kind: PromptKind) {
        lock(&self.stalled_kinds).remove(&kind);
    }

    /// Total number of calls, failed ones included.
    pub fn calls(&self) -> usize {
        lock(&self.log).len()
    }

    /// Number of calls of one kind.
    pub fn calls_for(&self, kind: PromptKind) -> usize {
        lock(&self.log).iter().filter(|p| p.kind == kind).count()
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<ModelPrompt> {
        lock(&self.log).clone()
    }

    fn default_reply(&self, prompt: &ModelPrompt) -> String {
        match prompt.kind {
            PromptKind::Classify => {
                r#"{"action": "continue_doc", "confidence": 0.9, "reason": "adds to the active document"}"#
                    .to_string()
            }
            PromptKind::Profile => {
                let request = section_after(&prompt.user, "Request:\n");
                json!({"doc_type": "prd", "title": title_from_utterance(request)}).to_string()
            }
            PromptKind::Draft => {
                format!("# Draft\n\n{}\n", section_after(&prompt.user, "Request:\n"))
            }
            PromptKind::FollowUp => "What problem should this solve first?".to_string(),
            PromptKind::Revise => {
                let n = self.revisions.fetch_add(1, Ordering::SeqCst) + 1;
                let current = extract_tag(&prompt.user, "current").unwrap_or_default();
                let message = section_after(&prompt.user, "User message:\n");
                format!(
                    "<document>\n{}\n- Revision {}: {}\n</document>\n<question>Anything else to change?</question>",
                    current, n, message
                )
            }
            PromptKind::Agent => format!("Agent answer: {}", prompt.user),
        }
    }
}

fn section_after<'a>(text: &'a str, marker: &str) -> &'a str {
    text.find(marker)
        .map(|idx| &text[idx + marker.len()..])
        .map(|rest| rest.split("\n\n").next().unwrap_or(rest))
        .unwrap_or(text)
        .trim()
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, prompt: &ModelPrompt) -> Result<String> {
        lock(&self.log).push(prompt.clone());

        let stalled = lock(&self.stalled_kinds).contains(&prompt.kind);
        if stalled {
            std::future::pending::<()>().await;
        }

        if self.failing.load(Ordering::SeqCst) || lock(&self.failing_kinds).contains(&prompt.kind) {
            return Err(AgentError::ModelInvocation(format!(
                "scripted failure for {}",
                prompt.kind
            )));
        }

        let scripted = lock(&self.scripts)
            .get_mut(&prompt.kind)
            .and_then(VecDeque::pop_front);
        Ok(scripted.unwrap_or_else(|| self.default_reply(prompt)))
    }
}

// ---------------------------------------------------------------------------
// RecordingDispatcher
// ---------------------------------------------------------------------------

/// How a [`RecordingDispatcher`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatcherMode {
    /// Reply with "[capability] prompt".
    #[default]
    Echo,
    /// Reply with blank content.
    Empty,
    /// Return an error.
    Fail,
}

/// A request seen by a [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedRequest {
    pub capability: String,
    pub prompt: String,
}

/// Dispatcher that records every request.
#[derive(Default)]
pub struct RecordingDispatcher {
    requests: Mutex<Vec<DispatchedRequest>>,
    mode: Mutex<DispatcherMode>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&self, mode: DispatcherMode) {
        *lock(&self.mode) = mode;
    }

    pub fn requests(&self) -> Vec<DispatchedRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl AgentDispatcher for RecordingDispatcher {
    async fn handle_request(
        &self,
        capability: &str,
        prompt: &str,
        _ctx: &TurnContext,
    ) -> Result<AgentResponse> {
        lock(&self.requests).push(DispatchedRequest {
            capability: capability.to_string(),
            prompt: prompt.to_string(),
        });

        let mode = *lock(&self.mode);
        match mode {
            DispatcherMode::Echo => Ok(AgentResponse::text(
                capability,
                format!("[{}] {}", capability, prompt),
            )),
            DispatcherMode::Empty => Ok(AgentResponse::text(capability, "")),
            DispatcherMode::Fail => Err(AgentError::ModelInvocation(
                "scripted dispatcher failure".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_scripts_before_defaults() {
        let model = ScriptedModel::new();
        model.script(PromptKind::FollowUp, "custom?");

        let prompt = ModelPrompt::new(PromptKind::FollowUp, "s", "u");
        assert_eq!(model.complete(&prompt).await.unwrap(), "custom?");
        assert_eq!(
            model.complete(&prompt).await.unwrap(),
            "What problem should this solve first?"
        );
        assert_eq!(model.calls_for(PromptKind::FollowUp), 2);
    }

    #[tokio::test]
    async fn test_failures_are_counted() {
        let model = ScriptedModel::new();
        model.fail_kind(PromptKind::Draft);

        let prompt = ModelPrompt::new(PromptKind::Draft, "s", "Request:\nx");
        assert!(model.complete(&prompt).await.is_err());
        model.heal_kind(PromptKind::Draft);
        assert!(model.complete(&prompt).await.is_ok());
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_stalled_kind_never_completes() {
        let model = ScriptedModel::new();
        model.stall_kind(PromptKind::Draft);

        let prompt = ModelPrompt::new(PromptKind::Draft, "s", "Request:\nx");
        let stalled =
            tokio::time::timeout(Duration::from_millis(20), model.complete(&prompt)).await;
        assert!(stalled.is_err());
        assert_eq!(model.calls(), 1);

        model.release_kind(PromptKind::Draft);
        assert!(model.complete(&prompt).await.is_ok());
    }

    #[tokio::test]
    async fn test_default_revision_grows_document() {
        let model = ScriptedModel::new();
        let prompt = ModelPrompt::new(
            PromptKind::Revise,
            "s",
            "Document\n\nCurrent document:\n<current>\n# Doc\n</current>\n\nUser message:\nadd goals",
        );

        let reply = model.complete(&prompt).await.unwrap();
        let document = extract_tag(&reply, "document").unwrap();
        assert!(document.starts_with("# Doc"));
        assert!(document.ends_with("- Revision 1: add goals"));
    }

    #[tokio::test]
    async fn test_recording_dispatcher_modes() {
        let dispatcher = RecordingDispatcher::new();
        let ctx = TurnContext::default();

        let reply = dispatcher.handle_request("general", "hi", &ctx).await.unwrap();
        assert_eq!(reply.content, "[general] hi");

        dispatcher.set_mode(DispatcherMode::Fail);
        assert!(dispatcher.handle_request("general", "hi", &ctx).await.is_err());
        assert_eq!(dispatcher.call_count(), 2);
    }
}
