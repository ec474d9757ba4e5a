//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docpilot_core::config::{DOCS_DIR_ENV, STATE_DIR_ENV};

/// Docpilot - conversational document authoring
#[derive(Parser, Debug)]
#[command(name = "docpilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = STATE_DIR_ENV)]
    pub state_dir: Option<PathBuf>,

    /// Directory new documents are written to
    #[arg(short, long, env = DOCS_DIR_ENV)]
    pub docs_dir: Option<PathBuf>,

    /// Capability agent for turns that are not about a document
    #[arg(short, long, default_value = docpilot_agent::DEFAULT_AGENT)]
    pub agent: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive authoring session (default)
    Chat,

    /// Route a single message and print the reply
    Ask {
        /// Message to route
        #[arg(required = true)]
        message: String,
    },

    /// List document sessions
    Sessions {
        /// Show only sessions that are still open
        #[arg(short, long)]
        active: bool,

        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the document of a session
    Show {
        /// Session ID (full or 8-char prefix)
        #[arg(required = true)]
        session: String,
    },

    /// Forget all session records (documents are kept)
    Clear {
        /// Skip the confirmation check
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Brief,
}

impl Cli {
    /// Returns the state directory path, using default if not specified.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(docpilot_core::state_dir)
    }

    /// Returns the documents directory, `<state>/docs` unless overridden.
    pub fn docs_dir(&self) -> PathBuf {
        self.docs_dir
            .clone()
            .unwrap_or_else(|| self.state_dir().join("docs"))
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
