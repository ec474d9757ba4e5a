//! Error types for the orchestrator.

use thiserror::Error;

/// Orchestrator-specific errors.
///
/// Routing itself never fails; these only arise while wiring a router up.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Agent or session store error.
    #[error("Agent error: {0}")]
    Agent(#[from] docpilot_agent::AgentError),

    /// Persistence error.
    #[error("Persistence error: {0}")]
    Persistence(#[from] docpilot_persistence::PersistenceError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
