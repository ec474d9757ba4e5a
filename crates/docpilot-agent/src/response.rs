//! Agent response types.

use serde::{Deserialize, Serialize};

/// Response from a capability agent for a one-shot request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Capability that produced the response.
    pub capability: String,

    /// Text content of the response.
    pub content: String,
}

impl AgentResponse {
    /// Create a response with text content.
    pub fn text(capability: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            content: content.into(),
        }
    }

    /// Returns true if there is nothing to show the user.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl std::fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let response = AgentResponse::text("general", "Hello!");
        assert_eq!(response.capability, "general");
        assert_eq!(response.to_string(), "Hello!");
        assert!(!response.is_empty());
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(AgentResponse::text("general", " \n ").is_empty());
        assert!(AgentResponse::default().is_empty());
    }
}
