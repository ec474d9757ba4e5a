//! Persistence layer for Docpilot.
//!
//! This crate provides crash-safe persistence for authored documents and
//! session records using atomic file operations (write to temp file, then
//! rename).
//!
//! # Example
//!
//! ```no_run
//! use docpilot_models::{DocType, DocumentSession};
//! use docpilot_persistence::SessionRecordStore;
//!
//! let records = SessionRecordStore::new("/home/user/.docpilot");
//!
//! let session = DocumentSession::new("/home/user/.docpilot/docs/prd/app.md", DocType::Prd, "App");
//! records.save_session(&session).unwrap();
//!
//! let loaded = records.load_session(&session.id).unwrap();
//! ```

pub mod atomic;
pub mod error;
pub mod session_records;
pub mod storage;

pub use error::{PersistenceError, Result};
pub use session_records::SessionRecordStore;
pub use storage::{DocumentStorage, FsDocumentStorage, MemoryDocumentStorage};
