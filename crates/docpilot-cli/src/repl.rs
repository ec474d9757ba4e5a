//! Interactive REPL (Read-Eval-Print Loop) for Docpilot.

use std::path::PathBuf;

use docpilot_orchestrator::{RouterState, SessionRouter, TurnContext};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::debug;

use crate::cli::Cli;
use crate::commands::{self, print_session_table, print_turn};

/// Tab completion for slash commands.
pub struct CommandCompleter;

impl CommandCompleter {
    const COMMANDS: &'static [&'static str] =
        &["/help", "/quit", "/reset", "/sessions", "/status"];
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let prefix = &line[..pos];
        let matches: Vec<Pair> = Self::COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Input accepted by the REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Show the router state and active document
    Status,
    /// List document sessions
    Sessions,
    /// Drop the active document pointer
    Reset,
    /// Show help
    Help,
    /// Quit the REPL
    Quit,
    /// Unknown slash command
    Unknown(String),
    /// An utterance to route
    Text(String),
}

impl ReplCommand {
    /// Parses input into a REPL command.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        let Some(stripped) = input.strip_prefix('/') else {
            return ReplCommand::Text(input.to_string());
        };

        let cmd = stripped
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match cmd.as_str() {
            "status" | "s" => ReplCommand::Status,
            "sessions" | "ls" => ReplCommand::Sessions,
            "reset" => ReplCommand::Reset,
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "q" | "exit" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(cmd),
        }
    }
}

/// REPL state
pub struct Repl {
    editor: Editor<CommandCompleter, DefaultHistory>,
    router: SessionRouter,
    ctx: TurnContext,
    history_path: PathBuf,
    runtime: tokio::runtime::Runtime,
}

impl Repl {
    /// Creates a new REPL over the directories named on the command line.
    pub fn new(cli: &Cli) -> commands::Result<Self> {
        let config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandCompleter));

        let runtime = tokio::runtime::Runtime::new()?;
        let router = runtime.block_on(commands::build_router(cli))?;

        let history_path = cli.state_dir().join("repl_history.txt");
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        Ok(Self {
            editor,
            router,
            ctx: TurnContext::with_agent(cli.agent.clone()),
            history_path,
            runtime,
        })
    }

    /// Runs the REPL loop.
    pub fn run(&mut self) -> commands::Result<()> {
        println!("Docpilot v{}", env!("CARGO_PKG_VERSION"));
        println!("Describe a document to start drafting, or ask anything.");
        println!("Type /help for commands, /quit to exit");
        println!();

        loop {
            let prompt = self.prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(&line)?;

                    let cmd = ReplCommand::parse(&line);
                    debug!(?cmd, "Parsed command");

                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        let _ = self.editor.save_history(&self.history_path);

        println!("Goodbye!");
        Ok(())
    }

    fn prompt(&self) -> String {
        match self.router.state() {
            RouterState::Active(id) => format!("docpilot [{}]> ", id.short()),
            RouterState::PendingConfirmation { .. } => "docpilot [yes/no]> ".to_string(),
            RouterState::Idle { .. } => "docpilot> ".to_string(),
        }
    }

    /// Handles one command. Returns true if the REPL should quit.
    fn handle_command(&mut self, cmd: ReplCommand) -> bool {
        match cmd {
            ReplCommand::Quit => return true,
            ReplCommand::Help => print_help(),
            ReplCommand::Status => self.print_status(),
            ReplCommand::Sessions => {
                let sessions = self.runtime.block_on(self.router.store().list_sessions());
                if sessions.is_empty() {
                    println!("No document sessions yet.");
                } else {
                    print_session_table(&sessions);
                }
            }
            ReplCommand::Reset => {
                self.router.reset();
                println!("Active document cleared. Sessions are kept.");
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: /{}. Type /help for available commands.", cmd);
            }
            ReplCommand::Text(text) => {
                let turn = self
                    .runtime
                    .block_on(self.router.route_user_input(&text, &self.ctx));
                print_turn(&turn);
                println!();
            }
        }
        false
    }

    fn print_status(&self) {
        println!("State: {}", self.router.state());
        if let Some(id) = self.router.active_session() {
            if let Some(session) = self.runtime.block_on(self.router.store().get_session(id)) {
                println!("Title: {}", session.title);
                println!("Type: {}", session.doc_type.label());
                println!("Revision: {}", session.revision);
                println!("Document: {}", session.document_path.display());
            }
        }
        println!("Docs dir: {}", self.router.store().docs_dir().display());
    }
}

fn print_help() {
    println!("Docpilot REPL");
    println!();
    println!("Just type to talk. A request like \"I want to write a PRD for ...\"");
    println!("starts a new document; follow-up messages revise it; \"done\" closes it.");
    println!();
    println!("COMMANDS:");
    println!("  /status      Show router state and the active document");
    println!("  /sessions    List document sessions");
    println!("  /reset       Stop routing to the active document");
    println!("  /help        Show this help");
    println!("  /quit        Exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        assert_eq!(
            ReplCommand::parse("  add a risk section "),
            ReplCommand::Text("add a risk section".to_string())
        );
    }

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(ReplCommand::parse("/quit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/EXIT"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/status"), ReplCommand::Status);
        assert_eq!(ReplCommand::parse("/sessions"), ReplCommand::Sessions);
        assert_eq!(ReplCommand::parse("/ls"), ReplCommand::Sessions);
        assert_eq!(ReplCommand::parse("/reset"), ReplCommand::Reset);
        assert_eq!(ReplCommand::parse("/?"), ReplCommand::Help);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            ReplCommand::parse("/connect foo"),
            ReplCommand::Unknown("connect".to_string())
        );
        assert_eq!(ReplCommand::parse("/"), ReplCommand::Unknown(String::new()));
    }

    #[test]
    fn test_completer_matches_prefix() {
        let completer = CommandCompleter;
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (_, matches) = completer.complete("/se", 3, &ctx).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].replacement, "/sessions");
    }

    #[test]
    fn test_completer_non_slash_ignored() {
        let completer = CommandCompleter;
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (_, matches) = completer.complete("status", 6, &ctx).unwrap();
        assert!(matches.is_empty());
    }
}
