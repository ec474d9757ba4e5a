//! End-to-end routing tests against scripted collaborators.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use docpilot_agent::session_store::{CLOSED_RESPONSE, PERSISTENCE_FALLBACK};
use docpilot_agent::testing::{DispatcherMode, RecordingDispatcher, ScriptedModel};
use docpilot_agent::PromptKind;
use docpilot_core::{KickoffHeuristic, RevisionDetector};
use docpilot_models::{DocType, RoutedTo, SessionStatus};
use docpilot_orchestrator::{
    DocumentSessionStore, RouterState, RoutingPolicy, SessionId, SessionRouter, TurnContext,
};
use docpilot_persistence::{DocumentStorage, MemoryDocumentStorage};

const KICKOFF: &str = "this will be a project that will train local models for Forex trading";
const REVIEW_FIX: &str = "fix the issues found in the document from the review";
const NEW_DOC: &str = "Now let's write a design doc for the payments service";

struct Harness {
    model: Arc<ScriptedModel>,
    dispatcher: Arc<RecordingDispatcher>,
    storage: Arc<MemoryDocumentStorage>,
    router: SessionRouter,
    ctx: TurnContext,
}

fn harness() -> Harness {
    let model = Arc::new(ScriptedModel::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let storage = Arc::new(MemoryDocumentStorage::new());
    let store = Arc::new(DocumentSessionStore::new(
        model.clone(),
        storage.clone(),
        "/docs",
    ));
    let router = SessionRouter::new(store, model.clone(), dispatcher.clone());
    Harness {
        model,
        dispatcher,
        storage,
        router,
        ctx: TurnContext::default(),
    }
}

impl Harness {
    async fn say(&mut self, utterance: &str) -> docpilot_orchestrator::TurnResult {
        self.router.route_user_input(utterance, &self.ctx).await
    }

    async fn document(&self, path: &PathBuf) -> String {
        self.storage.read(path).await.unwrap().unwrap_or_default()
    }

    async fn kickoff(&mut self) -> (SessionId, PathBuf) {
        let turn = self.say(KICKOFF).await;
        assert!(turn.is_conversation());
        (turn.session_id.unwrap(), turn.document_path.unwrap())
    }
}

fn switch_decision(confidence: f32, requires_confirmation: bool) -> String {
    format!(
        r#"{{"action": "start_new_doc", "confidence": {}, "reason": "different document", "requires_confirmation": {}, "target_doc_type": "design"}}"#,
        confidence, requires_confirmation
    )
}

#[tokio::test]
async fn test_kickoff_done_then_review_fix_resumes_same_document() {
    let mut h = harness();

    let start = h.say(KICKOFF).await;
    assert_eq!(start.routed_to, RoutedTo::Conversation);
    assert!(start.should_continue);
    assert!(start.error.is_none());
    let id = start.session_id.clone().unwrap();
    let path = start.document_path.clone().unwrap();
    assert!(h.document(&path).await.contains("Forex"));
    assert_eq!(h.router.state(), &RouterState::Active(id.clone()));

    let done = h.say("done").await;
    assert!(!done.should_continue);
    assert_eq!(done.response, CLOSED_RESPONSE);
    assert_eq!(
        h.router.state(),
        &RouterState::Idle {
            last_closed: Some(id.clone())
        }
    );
    let closed = h.router.store().get_session(&id).await.unwrap();
    assert_eq!(closed.status, SessionStatus::Closed);

    let resumed = h.say(REVIEW_FIX).await;
    assert_eq!(resumed.session_id, Some(id.clone()));
    assert_eq!(resumed.document_path, Some(path.clone()));
    assert!(resumed.should_continue);
    assert!(resumed.error.is_none());
    assert!(h.document(&path).await.contains(REVIEW_FIX));
    assert_eq!(h.router.active_session(), Some(&id));

    assert_eq!(h.storage.len().await, 1);
    assert_eq!(h.dispatcher.call_count(), 0);
}

#[tokio::test]
async fn test_non_kickoff_without_session_makes_no_model_calls() {
    let mut h = harness();

    let turn = h.say("what architectural patterns do you use?").await;

    assert_eq!(turn.routed_to, RoutedTo::Agent);
    assert!(turn.session_id.is_none());
    assert!(turn.error.is_none());
    assert_eq!(h.model.calls(), 0);
    let requests = h.dispatcher.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].capability, "general");
    assert_eq!(requests[0].prompt, "what architectural patterns do you use?");
    assert_eq!(h.router.state(), &RouterState::default());
    assert!(h.router.store().list_sessions().await.is_empty());
}

#[tokio::test]
async fn test_context_agent_is_used_for_stateless_turns() {
    let mut h = harness();
    h.ctx = TurnContext::with_agent("research");

    h.say("what are common forex data vendors?").await;

    assert_eq!(h.dispatcher.requests()[0].capability, "research");
}

#[tokio::test]
async fn test_repeated_done_does_not_reopen_or_change_session() {
    let mut h = harness();
    let (id, _) = h.kickoff().await;

    h.say("done").await;
    let first = h.router.store().get_session(&id).await.unwrap();

    let again = h.say("done").await;
    let second = h.router.store().get_session(&id).await.unwrap();

    assert_eq!(again.routed_to, RoutedTo::Agent);
    assert_eq!(second.status, SessionStatus::Closed);
    assert_eq!(first.closed_at, second.closed_at);
    assert_eq!(first.revision, second.revision);
    assert_eq!(
        h.router.state(),
        &RouterState::Idle {
            last_closed: Some(id)
        }
    );
}

#[tokio::test]
async fn test_done_without_any_session_goes_to_agent() {
    let mut h = harness();

    let turn = h.say("done").await;

    assert_eq!(turn.routed_to, RoutedTo::Agent);
    assert!(turn.session_id.is_none());
    assert!(turn.document_path.is_none());
    assert_eq!(h.router.state(), &RouterState::default());
    assert!(h.router.store().list_sessions().await.is_empty());
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_confident_switch_starts_a_new_session() {
    let mut h = harness();
    let (first, first_path) = h.kickoff().await;
    h.model
        .script(PromptKind::Classify, switch_decision(0.95, false));

    let turn = h.say(NEW_DOC).await;

    let second = turn.session_id.clone().unwrap();
    assert_ne!(second, first);
    assert_ne!(turn.document_path.clone().unwrap(), first_path);
    assert_eq!(h.router.active_session(), Some(&second));

    let session = h.router.store().get_session(&second).await.unwrap();
    assert_eq!(session.doc_type, DocType::Design);
    assert!(h.router.store().has_session(&first).await);
    assert_eq!(h.storage.len().await, 2);
}

#[tokio::test]
async fn test_switch_asks_for_confirmation_with_yes_and_no() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.9, true));

    let turn = h.say(NEW_DOC).await;

    assert!(turn.is_conversation());
    assert!(turn.should_continue);
    assert_eq!(turn.session_id, Some(id));
    assert_eq!(turn.document_path, Some(path));
    let lowered = turn.response.to_lowercase();
    assert!(lowered.contains("\"yes\""));
    assert!(lowered.contains("\"no\""));
    assert!(h.router.state().is_pending());
    assert_eq!(h.storage.len().await, 1);
}

#[tokio::test]
async fn test_low_confidence_switch_forces_confirmation() {
    let mut h = harness();
    h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.4, false));

    h.say(NEW_DOC).await;

    assert!(h.router.state().is_pending());
}

#[tokio::test]
async fn test_confirmation_threshold_is_configurable() {
    let mut h = harness();
    let store = Arc::clone(h.router.store());
    h.router = SessionRouter::new(store, h.model.clone(), h.dispatcher.clone())
        .with_policy(RoutingPolicy::default().with_confirmation_threshold(0.3));
    let (first, _) = h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.4, false));

    let turn = h.say(NEW_DOC).await;

    assert!(!h.router.state().is_pending());
    assert_ne!(turn.session_id, Some(first));
}

#[tokio::test]
async fn test_confirming_yes_switches_documents() {
    let mut h = harness();
    let (first, _) = h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.9, true));
    h.say(NEW_DOC).await;

    let turn = h.say("yes").await;

    let second = turn.session_id.clone().unwrap();
    assert_ne!(second, first);
    assert_eq!(h.router.active_session(), Some(&second));
    let session = h.router.store().get_session(&second).await.unwrap();
    assert_eq!(session.doc_type, DocType::Design);
    assert_eq!(session.turn_history[0].utterance, NEW_DOC);
}

#[tokio::test]
async fn test_declining_keeps_current_document() {
    let mut h = harness();
    let (first, path) = h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.9, true));
    h.say(NEW_DOC).await;

    let turn = h.say("no").await;

    assert_eq!(turn.session_id, Some(first.clone()));
    assert_eq!(turn.document_path, Some(path));
    assert_eq!(h.router.active_session(), Some(&first));
    assert_eq!(h.router.store().list_sessions().await.len(), 1);
}

#[tokio::test]
async fn test_hedged_yes_keeps_current_document() {
    let mut h = harness();
    let (first, path) = h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.9, true));
    h.say(NEW_DOC).await;

    let turn = h
        .say("ok, but first tell me what is still missing from the current PRD")
        .await;

    assert_eq!(turn.session_id, Some(first.clone()));
    assert_eq!(turn.document_path, Some(path));
    assert_eq!(h.router.active_session(), Some(&first));
    assert!(!h.router.state().is_pending());
    assert_eq!(h.router.store().list_sessions().await.len(), 1);
    assert_eq!(h.storage.len().await, 1);
}

#[tokio::test]
async fn test_pending_decision_is_consumed_once() {
    let mut h = harness();
    h.kickoff().await;
    h.model.script(PromptKind::Classify, switch_decision(0.9, true));
    h.say(NEW_DOC).await;

    h.say("yes").await;
    let sessions = h.router.store().list_sessions().await.len();
    h.say("yes").await;

    assert_eq!(h.router.store().list_sessions().await.len(), sessions);
}

#[tokio::test]
async fn test_classifier_failure_continues_anyway() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    let before = h.document(&path).await;
    h.model.fail_kind(PromptKind::Classify);

    let turn = h.say("add a section about latency budgets").await;

    assert!(turn.is_conversation());
    assert!(turn.should_continue);
    assert!(turn.error.is_some());
    assert_eq!(turn.response, h.router.policy().continue_anyway);
    assert_eq!(turn.session_id, Some(id.clone()));
    assert_eq!(h.router.active_session(), Some(&id));
    assert_eq!(h.document(&path).await, before);
}

#[tokio::test]
async fn test_failed_kickoff_falls_back_to_agent() {
    let mut h = harness();
    h.model.set_failing(true);

    let turn = h.say(KICKOFF).await;

    assert_eq!(turn.routed_to, RoutedTo::Agent);
    assert!(!turn.response.is_empty());
    assert!(turn.error.is_some());
    assert_eq!(h.router.state(), &RouterState::default());
    assert!(h.router.store().list_sessions().await.is_empty());
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn test_agent_failure_uses_fallback_reply() {
    let mut h = harness();
    h.dispatcher.set_mode(DispatcherMode::Fail);

    let turn = h.say("how should I name my sections?").await;

    assert_eq!(turn.response, h.router.policy().agent_fallback);
    assert!(turn.error.is_some());

    h.dispatcher.set_mode(DispatcherMode::Empty);
    let turn = h.say("how should I name my sections?").await;
    assert_eq!(turn.response, h.router.policy().agent_fallback);
    assert!(turn.error.is_some());
}

#[tokio::test]
async fn test_document_grows_across_revisions() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    let mut previous = h.document(&path).await;

    for instruction in [
        "target EUR/USD and GBP/USD",
        "add a risk management section",
        "mention backtesting on five years of data",
    ] {
        let turn = h.say(instruction).await;
        assert_eq!(turn.session_id, Some(id.clone()));
        assert!(turn.error.is_none());

        let current = h.document(&path).await;
        assert!(current.len() > previous.len());
        assert!(current.contains(instruction));
        previous = current;
    }

    assert_eq!(h.model.calls_for(PromptKind::Classify), 3);
    assert_eq!(h.router.store().get_session(&id).await.unwrap().revision, 4);
}

#[tokio::test]
async fn test_route_to_agent_keeps_session_active() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    let before = h.document(&path).await;
    h.model.script(
        PromptKind::Classify,
        r#"{"action": "route_to_agent", "confidence": 0.9, "reason": "side question", "target_agent": "research"}"#,
    );

    let turn = h.say("what data sources do forex desks use?").await;

    assert_eq!(turn.routed_to, RoutedTo::Agent);
    assert_eq!(h.dispatcher.requests()[0].capability, "research");
    assert_eq!(h.router.active_session(), Some(&id));
    assert_eq!(h.document(&path).await, before);

    let next = h.say("add a data sources section").await;
    assert_eq!(next.session_id, Some(id));
}

#[tokio::test]
async fn test_persistence_failure_keeps_session_open() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    let before = h.document(&path).await;
    h.storage.set_fail_writes(true);

    let turn = h.say("add a pricing section").await;

    assert_eq!(turn.response, PERSISTENCE_FALLBACK);
    assert!(turn.should_continue);
    assert!(turn.error.is_some());
    assert_eq!(h.router.active_session(), Some(&id));
    assert!(h.router.store().get_session(&id).await.unwrap().is_active());

    h.storage.set_fail_writes(false);
    assert_eq!(h.document(&path).await, before);
    let retry = h.say("add a pricing section").await;
    assert!(retry.error.is_none());
    assert!(h.document(&path).await.contains("pricing"));
}

#[tokio::test]
async fn test_reset_forgets_pointer_but_keeps_sessions() {
    let mut h = harness();
    let (id, _) = h.kickoff().await;

    h.router.reset();

    assert!(h.router.active_session().is_none());
    assert!(h.router.store().has_session(&id).await);
}

#[tokio::test]
async fn test_review_fix_after_reset_resumes_last_closed() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    h.say("done").await;

    h.router.reset();
    let turn = h.say(REVIEW_FIX).await;

    assert_eq!(turn.routed_to, RoutedTo::Conversation);
    assert_eq!(turn.session_id, Some(id.clone()));
    assert_eq!(turn.document_path, Some(path.clone()));
    assert!(h.document(&path).await.contains(REVIEW_FIX));
    assert_eq!(h.router.active_session(), Some(&id));
    assert!(h.router.store().get_session(&id).await.unwrap().is_active());
    assert_eq!(h.dispatcher.call_count(), 0);
}

#[tokio::test]
async fn test_new_router_over_closed_sessions_resumes_latest() {
    let mut h = harness();
    let (id, _) = h.kickoff().await;
    h.say("done").await;

    let store = Arc::clone(h.router.store());
    h.router = SessionRouter::new(store, h.model.clone(), h.dispatcher.clone());
    assert_eq!(h.router.state(), &RouterState::default());

    let turn = h.say(REVIEW_FIX).await;

    assert_eq!(turn.session_id, Some(id.clone()));
    assert_eq!(h.router.active_session(), Some(&id));
}

#[tokio::test]
async fn test_custom_heuristics_drive_idle_routing() {
    let mut h = harness();
    let store = Arc::clone(h.router.store());
    h.router = SessionRouter::new(store, h.model.clone(), h.dispatcher.clone()).with_heuristics(
        KickoffHeuristic::new().with_min_words(2),
        RevisionDetector::new().with_min_words(20),
    );

    let start = h.say("new prd").await;
    assert_eq!(start.routed_to, RoutedTo::Conversation);
    let id = start.session_id.unwrap();
    assert_eq!(h.router.active_session(), Some(&id));

    h.say("done").await;
    let turn = h.say(REVIEW_FIX).await;

    assert_eq!(turn.routed_to, RoutedTo::Agent);
    assert!(h.router.active_session().is_none());
    assert!(!h.router.store().get_session(&id).await.unwrap().is_active());
}

#[tokio::test]
async fn test_default_heuristics_ignore_short_kickoff() {
    let mut h = harness();

    let turn = h.say("new prd").await;

    assert_eq!(turn.routed_to, RoutedTo::Agent);
    assert!(h.router.store().list_sessions().await.is_empty());
}

#[tokio::test]
async fn test_dropped_turn_leaves_router_unchanged() {
    let mut h = harness();
    let (id, path) = h.kickoff().await;
    let before = h.router.store().get_session(&id).await.unwrap();
    let document = h.document(&path).await;
    h.model.stall_kind(PromptKind::Revise);

    let turn = tokio::time::timeout(
        Duration::from_millis(50),
        h.router.route_user_input("add a risk management section", &h.ctx),
    )
    .await;
    assert!(turn.is_err());

    assert_eq!(h.router.state(), &RouterState::Active(id.clone()));
    let after = h.router.store().get_session(&id).await.unwrap();
    assert!(after.is_active());
    assert_eq!(after.revision, before.revision);
    assert_eq!(after.turn_history.len(), before.turn_history.len());
    assert_eq!(h.document(&path).await, document);
    assert_eq!(h.storage.len().await, 1);

    h.model.release_kind(PromptKind::Revise);
    let retry = h.say("add a risk management section").await;
    assert!(retry.error.is_none());
    assert_eq!(
        h.router.store().get_session(&id).await.unwrap().revision,
        before.revision + 1
    );
}

#[tokio::test]
async fn test_dropped_kickoff_creates_nothing() {
    let mut h = harness();
    h.model.stall_kind(PromptKind::Draft);

    let turn = tokio::time::timeout(
        Duration::from_millis(50),
        h.router.route_user_input(KICKOFF, &h.ctx),
    )
    .await;
    assert!(turn.is_err());

    assert_eq!(h.router.state(), &RouterState::default());
    assert!(h.router.store().list_sessions().await.is_empty());
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn test_router_over_state_dir_remembers_last_closed() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let docs = dir.path().join("docs");

    let id = {
        let mut router =
            SessionRouter::with_state_dir(dir.path(), &docs, model.clone(), dispatcher.clone())
                .await
                .unwrap();
        let ctx = TurnContext::default();
        let turn = router.route_user_input(KICKOFF, &ctx).await;
        router.route_user_input("done", &ctx).await;
        turn.session_id.unwrap()
    };

    let mut router = SessionRouter::with_state_dir(dir.path(), &docs, model, dispatcher)
        .await
        .unwrap();
    assert_eq!(
        router.state(),
        &RouterState::Idle {
            last_closed: Some(id.clone())
        }
    );

    let turn = router
        .route_user_input(REVIEW_FIX, &TurnContext::default())
        .await;
    assert_eq!(turn.session_id, Some(id));
    assert!(turn.document_path.unwrap().starts_with(&docs));
}
