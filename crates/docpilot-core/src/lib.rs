//! Docpilot Core - configuration and deterministic utterance signals.
//!
//! - **config**: State/docs/session directory locations and env overrides
//! - **signals**: Kickoff, revision, completion and confirmation detection
//!   without any model call

pub mod config;
pub mod signals;

pub use config::{
    api_key, config_dir, docs_dir, ensure_all_dirs, env_file, logs_dir, sessions_dir, state_dir,
};
pub use signals::{
    is_completion_signal, looks_like_kickoff, looks_like_revision, parse_confirmation,
    Confirmation, KickoffHeuristic, RevisionDetector,
};
