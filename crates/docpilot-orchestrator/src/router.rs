//! Session router.
//!
//! Decides, per utterance, whether to continue the active document, start or
//! resume one, hand off to a capability agent, or ask the user to confirm a
//! document switch.
//!
//! A turn works on a copy of the current [`RouterState`] and the new state is
//! committed only once every await of the turn has finished. Dropping the
//! turn future therefore leaves the router exactly as it was.

use std::path::PathBuf;
use std::sync::Arc;

use docpilot_agent::{
    AgentDispatcher, DocumentSessionStore, IntentClassifier, ModelClient, TurnContext,
};
use docpilot_core::{is_completion_signal, parse_confirmation, KickoffHeuristic, RevisionDetector};
use docpilot_models::{
    DocType, DocumentSession, PendingRoutingDecision, RoutingAction, RoutingDecision, SessionId,
    TurnResult,
};
use docpilot_persistence::{FsDocumentStorage, SessionRecordStore};
use tracing::{debug, info, warn};

use crate::error::{OrchestratorError, Result};
use crate::policy::RoutingPolicy;
use crate::state::RouterState;

/// Routes user utterances for a single conversation.
pub struct SessionRouter {
    store: Arc<DocumentSessionStore>,
    classifier: IntentClassifier,
    dispatcher: Arc<dyn AgentDispatcher>,
    policy: RoutingPolicy,
    kickoff: KickoffHeuristic,
    revision: RevisionDetector,
    state: RouterState,
}

impl SessionRouter {
    /// Create a router over an existing store.
    pub fn new(
        store: Arc<DocumentSessionStore>,
        model: Arc<dyn ModelClient>,
        dispatcher: Arc<dyn AgentDispatcher>,
    ) -> Self {
        Self {
            store,
            classifier: IntentClassifier::new(model),
            dispatcher,
            policy: RoutingPolicy::default(),
            kickoff: KickoffHeuristic::new(),
            revision: RevisionDetector::new(),
            state: RouterState::default(),
        }
    }

    /// Create a router backed by the filesystem under `state_dir`.
    ///
    /// Session records live in `state_dir/sessions`, documents in `docs_dir`.
    /// The most recently closed session is remembered as a resume candidate.
    pub async fn with_state_dir(
        state_dir: impl Into<PathBuf>,
        docs_dir: impl Into<PathBuf>,
        model: Arc<dyn ModelClient>,
        dispatcher: Arc<dyn AgentDispatcher>,
    ) -> Result<Self> {
        let state_dir = state_dir.into();
        let docs_dir = docs_dir.into();
        info!(
            state_dir = %state_dir.display(),
            docs_dir = %docs_dir.display(),
            "Initializing SessionRouter"
        );

        let store = DocumentSessionStore::open(
            Arc::clone(&model),
            Arc::new(FsDocumentStorage::new()),
            docs_dir,
            SessionRecordStore::new(state_dir),
        )?;
        let last_closed = store.last_closed().await.map(|s| s.id);

        let mut router = Self::new(Arc::new(store), model, dispatcher);
        router.state = RouterState::Idle { last_closed };
        Ok(router)
    }

    /// Create a router using the default Docpilot directories.
    pub async fn from_default_dirs(
        model: Arc<dyn ModelClient>,
        dispatcher: Arc<dyn AgentDispatcher>,
    ) -> Result<Self> {
        docpilot_core::ensure_all_dirs()
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))?;
        Self::with_state_dir(
            docpilot_core::state_dir(),
            docpilot_core::docs_dir(),
            model,
            dispatcher,
        )
        .await
    }

    /// Replace the routing policy.
    pub fn with_policy(mut self, policy: RoutingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the kickoff and revision detectors used while idle.
    pub fn with_heuristics(mut self, kickoff: KickoffHeuristic, revision: RevisionDetector) -> Self {
        self.kickoff = kickoff;
        self.revision = revision;
        self
    }

    /// Current state.
    pub fn state(&self) -> &RouterState {
        &self.state
    }

    /// Session utterances currently go to.
    pub fn active_session(&self) -> Option<&SessionId> {
        self.state.active_session()
    }

    /// The shared session store.
    pub fn store(&self) -> &Arc<DocumentSessionStore> {
        &self.store
    }

    /// Routing policy in effect.
    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Forget the active pointer and any pending decision.
    ///
    /// Sessions themselves are untouched and stay reachable by id.
    pub fn reset(&mut self) {
        self.state = RouterState::default();
    }

    /// Route one utterance. Never fails: collaborator errors are reported in
    /// [`TurnResult::error`].
    pub async fn route_user_input(&mut self, utterance: &str, ctx: &TurnContext) -> TurnResult {
        let current = self.state.clone();
        let (result, next) = self.step(current, utterance, ctx).await;

        if next != self.state {
            debug!(from = %self.state, to = %next, "Router state changed");
        }
        self.state = next;
        result
    }

    async fn step(
        &self,
        state: RouterState,
        utterance: &str,
        ctx: &TurnContext,
    ) -> (TurnResult, RouterState) {
        match state {
            RouterState::PendingConfirmation { decision, previous } => {
                if parse_confirmation(utterance).is_affirmative() {
                    self.confirm_switch(decision, previous, ctx).await
                } else {
                    debug!(action = %decision.action(), "Pending decision declined");
                    match self.restore(previous).await {
                        RouterState::Active(id) => self.route_active(id, utterance, ctx).await,
                        RouterState::Idle { last_closed } => {
                            self.route_idle(last_closed, utterance, ctx).await
                        }
                        RouterState::PendingConfirmation { .. } => {
                            self.route_idle(None, utterance, ctx).await
                        }
                    }
                }
            }
            RouterState::Active(id) => self.route_active(id, utterance, ctx).await,
            RouterState::Idle { last_closed } => self.route_idle(last_closed, utterance, ctx).await,
        }
    }

    async fn route_idle(
        &self,
        last_closed: Option<SessionId>,
        utterance: &str,
        ctx: &TurnContext,
    ) -> (TurnResult, RouterState) {
        if self.revision.looks_like_revision(utterance) {
            // The pointer is lost on reset or restart; the store still knows.
            let candidate = match &last_closed {
                Some(id) => Some(id.clone()),
                None => self.store.last_closed().await.map(|s| s.id),
            };
            if let Some(id) = candidate {
                if self.store.has_session(&id).await {
                    match self.store.resume_session(&id, utterance, ctx).await {
                        Ok(outcome) => {
                            info!(session_id = %id, "Resumed closed session");
                            return (outcome.into(), RouterState::Active(id));
                        }
                        Err(e) => warn!(session_id = %id, error = %e, "Resume failed"),
                    }
                }
            }
        }

        let idle = RouterState::Idle { last_closed };

        if !self.kickoff.looks_like_kickoff(utterance) {
            debug!("No active session and no kickoff, routing to agent");
            let result = self.dispatch(self.agent_for(ctx, None), utterance, ctx).await;
            return (result, idle);
        }

        match self.store.start_new_session(utterance, None, ctx).await {
            Ok(outcome) => {
                let id = outcome.session_id.clone();
                (outcome.into(), RouterState::Active(id))
            }
            Err(e) => {
                warn!(error = %e, "Kickoff failed, falling back to agent");
                let result = self
                    .dispatch(self.agent_for(ctx, None), utterance, ctx)
                    .await;
                (with_error(result, e), idle)
            }
        }
    }

    async fn route_active(
        &self,
        id: SessionId,
        utterance: &str,
        ctx: &TurnContext,
    ) -> (TurnResult, RouterState) {
        let session = match self.store.get_session(&id).await {
            Some(session) if session.is_active() => session,
            Some(_) => {
                debug!(session_id = %id, "Active pointer references a closed session");
                return self.route_idle(Some(id), utterance, ctx).await;
            }
            None => {
                warn!(session_id = %id, "Active pointer references a missing session");
                return self.route_idle(None, utterance, ctx).await;
            }
        };

        if is_completion_signal(utterance) {
            return match self.store.close_session(&id).await {
                Ok(closed) => (
                    TurnResult::conversation(
                        id.clone(),
                        closed.document_path,
                        docpilot_agent::session_store::CLOSED_RESPONSE,
                        false,
                    ),
                    RouterState::Idle {
                        last_closed: Some(id),
                    },
                ),
                Err(e) => (self.continue_anyway(&session, e), RouterState::Active(id)),
            };
        }

        let decision = match self.classifier.classify(utterance, &session, ctx).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Classifier failed");
                return (self.continue_anyway(&session, e), RouterState::Active(id));
            }
        };

        match decision.action {
            RoutingAction::ContinueDoc => {
                match self.store.continue_session(&id, utterance, ctx).await {
                    Ok(outcome) => {
                        let next = if outcome.should_continue {
                            RouterState::Active(id)
                        } else {
                            RouterState::Idle {
                                last_closed: Some(id),
                            }
                        };
                        (outcome.into(), next)
                    }
                    Err(e) => (self.continue_anyway(&session, e), RouterState::Active(id)),
                }
            }
            RoutingAction::RouteToAgent => {
                let capability = self.agent_for(ctx, decision.target_agent.as_deref());
                let result = self.dispatch(capability, utterance, ctx).await;
                (result, RouterState::Active(id))
            }
            RoutingAction::StartNewDoc => {
                if self
                    .policy
                    .needs_confirmation(decision.requires_confirmation, decision.confidence)
                {
                    let prompt = confirmation_prompt(&session, decision.target_doc_type);
                    info!(
                        session_id = %id,
                        confidence = decision.confidence,
                        "Document switch needs confirmation"
                    );
                    let result =
                        TurnResult::conversation(id.clone(), session.document_path.clone(), prompt, true);
                    let pending = PendingRoutingDecision::new(decision, utterance);
                    (
                        result,
                        RouterState::PendingConfirmation {
                            decision: pending,
                            previous: Some(id),
                        },
                    )
                } else {
                    self.switch(&session, &decision, utterance, ctx).await
                }
            }
        }
    }

    async fn switch(
        &self,
        current: &DocumentSession,
        decision: &RoutingDecision,
        utterance: &str,
        ctx: &TurnContext,
    ) -> (TurnResult, RouterState) {
        match self
            .store
            .start_new_session(utterance, decision.target_doc_type, ctx)
            .await
        {
            Ok(outcome) => {
                info!(from = %current.id, to = %outcome.session_id, "Switched document session");
                let id = outcome.session_id.clone();
                (outcome.into(), RouterState::Active(id))
            }
            Err(e) => {
                warn!(session_id = %current.id, error = %e, "Switch failed");
                (
                    self.continue_anyway(current, e),
                    RouterState::Active(current.id.clone()),
                )
            }
        }
    }

    async fn confirm_switch(
        &self,
        pending: PendingRoutingDecision,
        previous: Option<SessionId>,
        ctx: &TurnContext,
    ) -> (TurnResult, RouterState) {
        info!(action = %pending.action(), "Pending decision confirmed");
        match self
            .store
            .start_new_session(&pending.utterance, pending.target_doc_type(), ctx)
            .await
        {
            Ok(outcome) => {
                let id = outcome.session_id.clone();
                (outcome.into(), RouterState::Active(id))
            }
            Err(e) => {
                warn!(error = %e, "Confirmed switch failed");
                let restored = self.restore(previous).await;
                let result = match restored.active_session() {
                    Some(id) => match self.store.get_session(id).await {
                        Some(session) => self.continue_anyway(&session, e),
                        None => TurnResult::agent(&self.policy.agent_fallback).with_error(e.to_string()),
                    },
                    None => TurnResult::agent(&self.policy.agent_fallback).with_error(e.to_string()),
                };
                (result, restored)
            }
        }
    }

    /// State to fall back to once a pending decision is gone.
    async fn restore(&self, previous: Option<SessionId>) -> RouterState {
        let Some(id) = previous else {
            return RouterState::default();
        };
        match self.store.get_session(&id).await {
            Some(session) if session.is_active() => RouterState::Active(id),
            Some(_) => RouterState::Idle {
                last_closed: Some(id),
            },
            None => RouterState::default(),
        }
    }

    async fn dispatch(&self, capability: &str, utterance: &str, ctx: &TurnContext) -> TurnResult {
        match self.dispatcher.handle_request(capability, utterance, ctx).await {
            Ok(response) if !response.is_empty() => TurnResult::agent(response.content),
            Ok(_) => {
                warn!(capability, "Agent returned an empty response");
                TurnResult::agent(&self.policy.agent_fallback)
                    .with_error(format!("agent '{}' returned an empty response", capability))
            }
            Err(e) => {
                warn!(capability, error = %e, "Agent dispatch failed");
                TurnResult::agent(&self.policy.agent_fallback).with_error(e.to_string())
            }
        }
    }

    fn agent_for<'a>(&'a self, ctx: &'a TurnContext, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|a| !a.trim().is_empty())
            .or_else(|| Some(ctx.agent.as_str()).filter(|a| !a.trim().is_empty()))
            .unwrap_or(&self.policy.default_agent)
    }

    fn continue_anyway(&self, session: &DocumentSession, error: impl ToString) -> TurnResult {
        TurnResult::conversation(
            session.id.clone(),
            session.document_path.clone(),
            &self.policy.continue_anyway,
            true,
        )
        .with_error(error.to_string())
    }
}

/// Keeps the first error if the fallback itself also failed.
fn with_error(result: TurnResult, error: impl ToString) -> TurnResult {
    if result.has_error() {
        result
    } else {
        result.with_error(error.to_string())
    }
}

/// Yes/no prompt for a proposed document switch.
pub fn confirmation_prompt(current: &DocumentSession, target: Option<DocType>) -> String {
    let target = target.map_or("document", |t| t.label());
    format!(
        "It sounds like you want to start a new {} instead of continuing \"{}\". \
         Reply \"yes\" to start it or \"no\" to keep working on the current document.",
        target, current.title
    )
}
