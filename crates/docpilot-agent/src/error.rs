//! Error types for the agent crate.

use docpilot_models::SessionId;
use docpilot_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur in model, drafting and session operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model invocation failed (transport, HTTP status, provider error).
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// Model output could not be understood.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Model returned nothing usable.
    #[error("model returned an empty {0}")]
    EmptyResponse(&'static str),

    /// No session with this id exists.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// The session exists but is closed.
    #[error("session is closed: {0}")]
    SessionClosed(SessionId),

    /// Document or record persistence failed.
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
