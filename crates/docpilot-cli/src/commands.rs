//! Command handlers for CLI subcommands.

use std::sync::Arc;

use docpilot_models::DocumentSession;
use docpilot_orchestrator::{
    ModelAgentDispatcher, OpenRouterClient, SessionRouter, TurnContext, TurnResult,
};
use docpilot_persistence::atomic::read_text_optional;
use docpilot_persistence::SessionRecordStore;
use tracing::info;

use crate::cli::{Cli, Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command. `Chat` is handled by the REPL.
pub fn execute(command: Commands, cli: &Cli) -> Result<()> {
    let state_dir = cli.state_dir();
    let records = SessionRecordStore::new(&state_dir);

    match command {
        Commands::Chat => Ok(()),
        Commands::Ask { message } => cmd_ask(cli, &message),
        Commands::Sessions { active, format } => cmd_sessions(&records, active, format),
        Commands::Show { session } => cmd_show(&records, &session),
        Commands::Clear { yes } => cmd_clear(&records, yes),
    }
}

/// Build a router over the directories named on the command line.
pub async fn build_router(cli: &Cli) -> Result<SessionRouter> {
    let state_dir = cli.state_dir();
    let docs_dir = cli.docs_dir();
    std::fs::create_dir_all(&docs_dir)?;

    let model = Arc::new(OpenRouterClient::from_env()?);
    let dispatcher = Arc::new(ModelAgentDispatcher::new(model.clone()));
    let router = SessionRouter::with_state_dir(&state_dir, &docs_dir, model, dispatcher).await?;
    Ok(router)
}

fn cmd_ask(cli: &Cli, message: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let ctx = TurnContext::with_agent(cli.agent.clone());

    let turn = runtime.block_on(async {
        let mut router = build_router(cli).await?;
        Ok::<_, Box<dyn std::error::Error>>(router.route_user_input(message, &ctx).await)
    })?;

    print_turn(&turn);
    Ok(())
}

fn cmd_sessions(records: &SessionRecordStore, active_only: bool, format: OutputFormat) -> Result<()> {
    let mut sessions = records.list_sessions()?;
    if active_only {
        sessions.retain(DocumentSession::is_active);
    }

    if sessions.is_empty() {
        println!("No document sessions yet.");
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        OutputFormat::Brief => {
            for session in &sessions {
                println!("{} {}", session.id.short(), session.title);
            }
        }
        OutputFormat::Table => print_session_table(&sessions),
    }

    Ok(())
}

/// Print sessions as an aligned table.
pub fn print_session_table(sessions: &[DocumentSession]) {
    println!(
        "{:<10} {:<8} {:<13} {:<4} {}",
        "ID", "STATUS", "TYPE", "REV", "TITLE"
    );
    println!("{}", "-".repeat(72));
    for session in sessions {
        let status = if session.is_active() { "active" } else { "closed" };
        println!(
            "{:<10} {:<8} {:<13} {:<4} {}",
            session.id.short(),
            status,
            session.doc_type.as_str(),
            session.revision,
            session.title
        );
        println!("{:<10} {}", "", session.document_path.display());
    }
}

fn cmd_show(records: &SessionRecordStore, id_or_prefix: &str) -> Result<()> {
    let session = find_session(records, id_or_prefix)?;

    match read_text_optional(&session.document_path)? {
        Some(text) => println!("{}", text),
        None => println!(
            "Document for '{}' is missing: {}",
            session.title,
            session.document_path.display()
        ),
    }
    Ok(())
}

fn cmd_clear(records: &SessionRecordStore, yes: bool) -> Result<()> {
    if !yes {
        return Err("refusing to clear session records without --yes".into());
    }

    let count = records.list_sessions()?.len();
    records.clear()?;
    info!(sessions = count, "Cleared session records");
    println!("Cleared {} session record(s). Documents were left in place.", count);
    Ok(())
}

/// Find a session by full id or unique id prefix.
pub fn find_session(records: &SessionRecordStore, id_or_prefix: &str) -> Result<DocumentSession> {
    let needle = id_or_prefix.trim();
    if needle.is_empty() {
        return Err("session id is empty".into());
    }

    let mut matches: Vec<DocumentSession> = records
        .list_sessions()?
        .into_iter()
        .filter(|s| s.id.as_str() == needle || s.id.as_str().starts_with(needle))
        .collect();

    match matches.len() {
        0 => Err(format!("No session matches '{}'", needle).into()),
        1 => Ok(matches.remove(0)),
        n => Err(format!("'{}' is ambiguous ({} sessions match)", needle, n).into()),
    }
}

/// Print a turn result the way both `ask` and the REPL show it.
pub fn print_turn(turn: &TurnResult) {
    println!("{}", turn.response);
    if let Some(path) = &turn.document_path {
        println!();
        println!("  document: {}", path.display());
    }
    if let Some(error) = &turn.error {
        println!("  (degraded: {})", error);
    }
    if turn.is_conversation() && !turn.should_continue {
        println!("  (session closed)");
    }
}
