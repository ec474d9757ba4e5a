//! Model access, intent classification and document sessions for Docpilot.
//!
//! # Overview
//!
//! - [`ModelClient`]: prompt in, text out. [`OpenRouterClient`] is the
//!   production implementation; [`testing::ScriptedModel`] is deterministic.
//! - [`IntentClassifier`]: decides how to route an utterance while a
//!   document session is active.
//! - [`DraftingPipeline`]: drafts, asks follow-up questions and revises.
//! - [`DocumentSessionStore`]: owns document sessions and persists drafts.
//! - [`AgentDispatcher`]: one-shot capability agents for everything else.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docpilot_agent::{DocumentSessionStore, OpenRouterClient, TurnContext};
//! use docpilot_persistence::FsDocumentStorage;
//!
//! # async fn run() -> docpilot_agent::Result<()> {
//! let model = Arc::new(OpenRouterClient::from_env()?);
//! let store = DocumentSessionStore::new(model, Arc::new(FsDocumentStorage::new()), "/tmp/docs");
//!
//! let outcome = store
//!     .start_new_session("I want to create a PRD for our mobile app", None, &TurnContext::default())
//!     .await?;
//! println!("{}", outcome.response);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod client;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod drafting;
pub mod error;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod response;
pub mod session_store;
pub mod testing;

// Re-export commonly used items
pub use classifier::{decode_routing_decision, parse_routing_decision, IntentClassifier};
pub use client::OpenRouterClient;
pub use config::{ModelConfig, Provider};
pub use context::{TurnContext, DEFAULT_AGENT};
pub use dispatcher::{AgentDispatcher, ModelAgentDispatcher};
pub use drafting::{DocumentProfile, DraftingPipeline, Revision};
pub use error::{AgentError, Result};
pub use model::{ModelClient, ModelPrompt, PromptKind};
pub use response::AgentResponse;
pub use session_store::{DocumentSessionStore, SessionOutcome};
