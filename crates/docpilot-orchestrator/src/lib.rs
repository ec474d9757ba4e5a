//! Conversation routing for Docpilot.
//!
//! This crate provides the [`SessionRouter`], which sits between a chat
//! surface and the document session store. Every user utterance goes through
//! [`SessionRouter::route_user_input`] and comes back as a [`TurnResult`].
//!
//! # Overview
//!
//! The router decides between:
//! - continuing the active document session
//! - starting a new document from a kickoff request
//! - resuming the most recently closed document on a revision request
//! - answering with a one-shot capability agent
//! - asking the user to confirm a document switch
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docpilot_orchestrator::{ModelAgentDispatcher, OpenRouterClient, SessionRouter, TurnContext};
//!
//! # async fn example() -> docpilot_orchestrator::Result<()> {
//! let model = Arc::new(OpenRouterClient::from_env()?);
//! let dispatcher = Arc::new(ModelAgentDispatcher::new(model.clone()));
//! let mut router = SessionRouter::from_default_dirs(model, dispatcher).await?;
//!
//! let ctx = TurnContext::default();
//! let turn = router
//!     .route_user_input("I want to write a PRD for a habit tracking app", &ctx)
//!     .await;
//! println!("{}", turn.response);
//! # Ok(())
//! # }
//! ```

mod error;
mod policy;
mod router;
mod state;

pub use error::{OrchestratorError, Result};
pub use policy::{RoutingPolicy, DEFAULT_CONFIRMATION_THRESHOLD};
pub use router::{confirmation_prompt, SessionRouter};
pub use state::RouterState;

// Re-export commonly used types from the lower layers
pub use docpilot_agent::{
    AgentDispatcher, AgentResponse, DocumentSessionStore, ModelAgentDispatcher, ModelClient,
    OpenRouterClient, TurnContext,
};
pub use docpilot_core::{KickoffHeuristic, RevisionDetector};
pub use docpilot_models::{DocType, DocumentSession, RoutedTo, SessionId, TurnResult};
