//! Core data models for Docpilot.
//!
//! This crate provides the fundamental data types shared by the session
//! store, the intent classifier and the session router: document sessions,
//! routing decisions and the per-turn result handed back to callers.

pub mod decision;
pub mod ids;
pub mod session;
pub mod turn;

// Re-export main types
pub use decision::{PendingRoutingDecision, RoutingAction, RoutingDecision};
pub use ids::SessionId;
pub use session::{DocType, DocumentSession, SessionStatus, TurnRecord, UnknownDocType};
pub use turn::{RoutedTo, TurnResult};
