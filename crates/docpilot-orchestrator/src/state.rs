//! Router state.

use docpilot_models::{PendingRoutingDecision, SessionId};

/// Where the router stands between turns.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterState {
    /// No document session is active.
    Idle {
        /// Most recently closed session, a resume candidate.
        last_closed: Option<SessionId>,
    },
    /// Utterances go to this session unless the classifier says otherwise.
    Active(SessionId),
    /// A document switch awaits a yes/no answer.
    PendingConfirmation {
        decision: PendingRoutingDecision,
        /// Session that was active when the switch was proposed.
        previous: Option<SessionId>,
    },
}

impl Default for RouterState {
    fn default() -> Self {
        Self::Idle { last_closed: None }
    }
}

impl RouterState {
    /// The session utterances currently go to, if any.
    pub fn active_session(&self) -> Option<&SessionId> {
        match self {
            Self::Active(id) => Some(id),
            Self::Idle { .. } | Self::PendingConfirmation { .. } => None,
        }
    }

    /// Returns true if a confirmation is pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingConfirmation { .. })
    }
}

impl std::fmt::Display for RouterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle { last_closed: None } => write!(f, "idle"),
            Self::Idle {
                last_closed: Some(id),
            } => write!(f, "idle (last closed {})", id),
            Self::Active(id) => write!(f, "active {}", id),
            Self::PendingConfirmation { decision, .. } => {
                write!(f, "awaiting confirmation ({})", decision.action())
            }
        }
    }
}
