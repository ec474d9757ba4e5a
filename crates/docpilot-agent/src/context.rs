//! Per-turn context passed through the router, the store and the dispatcher.

use serde::{Deserialize, Serialize};

/// Capability used when nothing else is configured.
pub const DEFAULT_AGENT: &str = "general";

/// Default number of prior turns included in prompts.
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

/// Caller-supplied settings for a single turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    /// Capability that answers utterances routed to the agent layer.
    pub agent: String,

    /// How many prior turns to show the model.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

impl Default for TurnContext {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl TurnContext {
    /// Context using the given agent capability.
    pub fn with_agent(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            ..Default::default()
        }
    }

    /// Set the history window.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = TurnContext::default();
        assert_eq!(ctx.agent, "general");
        assert_eq!(ctx.history_window, DEFAULT_HISTORY_WINDOW);
    }

    #[test]
    fn test_builder() {
        let ctx = TurnContext::with_agent("research").with_history_window(0);
        assert_eq!(ctx.agent, "research");
        assert_eq!(ctx.history_window, 0);
    }
}
