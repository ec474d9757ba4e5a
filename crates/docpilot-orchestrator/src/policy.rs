//! Tunable routing policy.

use docpilot_agent::DEFAULT_AGENT;
use serde::{Deserialize, Serialize};

/// Default confidence below which a document switch needs confirmation.
pub const DEFAULT_CONFIRMATION_THRESHOLD: f32 = 0.8;

/// Thresholds and canned replies used by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingPolicy {
    /// A `start_new_doc` decision below this confidence is parked for
    /// confirmation even if the classifier did not ask for it.
    pub confirmation_threshold: f32,

    /// Capability used when the turn context names none.
    pub default_agent: String,

    /// Reply when the agent layer fails or answers with nothing.
    pub agent_fallback: String,

    /// Reply when routing fails while a document session is active.
    pub continue_anyway: String,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            confirmation_threshold: DEFAULT_CONFIRMATION_THRESHOLD,
            default_agent: DEFAULT_AGENT.to_string(),
            agent_fallback: "Sorry, I couldn't come up with an answer to that. Could you rephrase it?"
                .to_string(),
            continue_anyway: "I had trouble understanding that, so let's keep going with the current document. What would you like to change?"
                .to_string(),
        }
    }
}

impl RoutingPolicy {
    /// Set the confirmation threshold (clamped to `[0, 1]`).
    pub fn with_confirmation_threshold(mut self, threshold: f32) -> Self {
        self.confirmation_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the default agent capability.
    pub fn with_default_agent(mut self, agent: impl Into<String>) -> Self {
        self.default_agent = agent.into();
        self
    }

    /// Returns true if a switch at `confidence` must be confirmed.
    pub fn needs_confirmation(&self, requested: bool, confidence: f32) -> bool {
        requested || confidence < self.confirmation_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RoutingPolicy::default();
        assert_eq!(policy.confirmation_threshold, DEFAULT_CONFIRMATION_THRESHOLD);
        assert_eq!(policy.default_agent, "general");
        assert!(!policy.agent_fallback.is_empty());
        assert!(!policy.continue_anyway.is_empty());
    }

    #[test]
    fn test_needs_confirmation() {
        let policy = RoutingPolicy::default();
        assert!(policy.needs_confirmation(true, 0.99));
        assert!(policy.needs_confirmation(false, 0.5));
        assert!(!policy.needs_confirmation(false, 0.95));

        let permissive = policy.with_confirmation_threshold(-1.0);
        assert!(!permissive.needs_confirmation(false, 0.0));
    }
}
