//! Routing decision types produced by the intent classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::DocType;

/// What the router should do with an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    /// Answer with a stateless capability agent.
    RouteToAgent,
    /// Keep revising the active document.
    ContinueDoc,
    /// Start a brand-new document session.
    StartNewDoc,
}

impl std::fmt::Display for RoutingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RouteToAgent => write!(f, "route_to_agent"),
            Self::ContinueDoc => write!(f, "continue_doc"),
            Self::StartNewDoc => write!(f, "start_new_doc"),
        }
    }
}

/// Structured routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Proposed action.
    pub action: RoutingAction,

    /// Confidence in `[0, 1]`.
    pub confidence: f32,

    /// Human-readable justification.
    pub reason: String,

    /// Whether the user must confirm before the action is taken.
    #[serde(default)]
    pub requires_confirmation: bool,

    /// Document type to create when switching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_doc_type: Option<DocType>,

    /// Agent to hand off to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent: Option<String>,
}

impl RoutingDecision {
    /// Creates a decision with the given action and confidence (clamped).
    pub fn new(action: RoutingAction, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            action,
            confidence: clamp_confidence(confidence),
            reason: reason.into(),
            requires_confirmation: false,
            target_doc_type: None,
            target_agent: None,
        }
    }

    /// Decision used when the classifier output cannot be understood.
    ///
    /// Routes to the agent and never asks to switch documents.
    pub fn safe_default(reason: impl Into<String>) -> Self {
        Self::new(RoutingAction::RouteToAgent, 0.0, reason)
    }

    /// Set whether confirmation is required.
    pub fn with_confirmation(mut self, requires_confirmation: bool) -> Self {
        self.requires_confirmation = requires_confirmation;
        self
    }

    /// Set the target document type.
    pub fn with_target_doc_type(mut self, doc_type: DocType) -> Self {
        self.target_doc_type = Some(doc_type);
        self
    }

    /// Set the target agent.
    pub fn with_target_agent(mut self, agent: impl Into<String>) -> Self {
        self.target_agent = Some(agent.into());
        self
    }
}

fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// A routing decision parked until the user confirms or declines it.
///
/// Held by the router, never by the session store. It is moved out of the
/// router state on the next turn, so it can be consumed at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRoutingDecision {
    /// The decision awaiting confirmation.
    pub decision: RoutingDecision,

    /// The utterance that produced the decision.
    pub utterance: String,

    /// When the decision was parked.
    pub created_at: DateTime<Utc>,
}

impl PendingRoutingDecision {
    /// Parks `decision` for the utterance that produced it.
    pub fn new(decision: RoutingDecision, utterance: impl Into<String>) -> Self {
        Self {
            decision,
            utterance: utterance.into(),
            created_at: Utc::now(),
        }
    }

    /// Proposed action.
    pub fn action(&self) -> RoutingAction {
        self.decision.action
    }

    /// Proposed document type, if any.
    pub fn target_doc_type(&self) -> Option<DocType> {
        self.decision.target_doc_type
    }
}
