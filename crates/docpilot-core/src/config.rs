//! Shared configuration paths for Docpilot.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.docpilot/`:
//!
//! ```text
//! ~/.docpilot/
//! ├── docs/         # Authored documents, one subdirectory per doc type
//! │   ├── prd/
//! │   └── design/
//! ├── sessions/     # Session records (JSON, one per session)
//! ├── logs/         # Application logs
//! └── config/       # .env.local and user settings
//! ```
//!
//! # Environment Variables
//!
//! - `DOCPILOT_STATE_DIR`: Override the base state directory
//! - `DOCPILOT_DOCS_DIR`: Override the documents directory
//! - `DOCPILOT_LOG_DIR`: Override the log directory

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "DOCPILOT_STATE_DIR";

/// Environment variable for custom documents directory.
pub const DOCS_DIR_ENV: &str = "DOCPILOT_DOCS_DIR";

/// Environment variable for custom log directory.
pub const LOG_DIR_ENV: &str = "DOCPILOT_LOG_DIR";

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".docpilot";

const DOCS_SUBDIR: &str = "docs";
const SESSIONS_SUBDIR: &str = "sessions";
const LOGS_SUBDIR: &str = "logs";
const CONFIG_SUBDIR: &str = "config";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the Docpilot state directory.
///
/// The state directory is determined by:
/// 1. `DOCPILOT_STATE_DIR` environment variable if set
/// 2. `~/.docpilot` if home directory is available
/// 3. `.docpilot` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the documents directory.
///
/// Defaults to `~/.docpilot/docs/` or `DOCPILOT_DOCS_DIR` env var.
pub fn docs_dir() -> PathBuf {
    std::env::var(DOCS_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(DOCS_SUBDIR))
}

/// Get the session records directory.
pub fn sessions_dir() -> PathBuf {
    state_dir().join(SESSIONS_SUBDIR)
}

/// Get the logs directory.
///
/// Defaults to `~/.docpilot/logs/` or `DOCPILOT_LOG_DIR` env var.
pub fn logs_dir() -> PathBuf {
    std::env::var(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(LOGS_SUBDIR))
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the .env.local file path.
///
/// Environment file for secrets (API keys).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Returns the OpenRouter API key if one is configured and non-empty.
pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Ensure the state directory and all subdirectories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(docs_dir())?;
    std::fs::create_dir_all(sessions_dir())?;
    std::fs::create_dir_all(logs_dir())?;
    std::fs::create_dir_all(config_dir())?;
    Ok(())
}
