//! Prompt text and prompt builders for every model call.

use docpilot_models::{DocType, DocumentSession};

use crate::model::{ModelPrompt, PromptKind};

const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You route messages in a document-authoring assistant.
A document session is active. Decide what the user's latest message is asking for.

Actions:
- "continue_doc": the message adds to, answers questions about, or revises the active document.
- "route_to_agent": a one-off question or task unrelated to editing the active document.
- "start_new_doc": the user wants a different, brand-new document.

Respond with a single JSON object and nothing else:
{"action": "...", "confidence": 0.0-1.0, "reason": "...", "requires_confirmation": true|false,
 "target_doc_type": "prd|requirements|design|spec|general" (start_new_doc only),
 "target_agent": "..." (route_to_agent only)}

Set requires_confirmation to true whenever switching documents is not clearly intended."#;

const PROFILE_SYSTEM_PROMPT: &str = r#"You classify a request for a new document.
Respond with a single JSON object and nothing else:
{"doc_type": "prd|requirements|design|spec|general", "title": "short descriptive title"}"#;

const DRAFT_SYSTEM_PROMPT: &str = r#"You are a senior technical writer drafting a new document in Markdown.
Write a complete first draft with clear section headings. Where information is missing,
add a short placeholder noting what is needed. Output only the Markdown document."#;

const FOLLOW_UP_SYSTEM_PROMPT: &str = r#"You are helping a user refine a document draft.
Ask exactly one concise question that would most improve the draft. Output only the question."#;

const REVISION_SYSTEM_PROMPT: &str = r#"You are revising a Markdown document with the user.
Apply the user's message to the document. Always return the full updated document.
Respond in exactly this format:
<document>
...full updated Markdown document...
</document>
<question>one concise follow-up question</question>"#;

/// Prompt asking the classifier how to route `utterance` while `session` is active.
pub fn classifier_prompt(utterance: &str, session: &DocumentSession, history_window: usize) -> ModelPrompt {
    let mut user = format!(
        "Active document: \"{}\" ({})\n",
        session.title,
        session.doc_type.label()
    );
    push_history(&mut user, session, history_window);
    user.push_str(&format!("\nLatest message:\n{}", utterance));
    ModelPrompt::new(PromptKind::Classify, CLASSIFIER_SYSTEM_PROMPT, user)
}

/// Prompt asking for the document type and title of a kickoff.
pub fn profile_prompt(utterance: &str, doc_type_hint: Option<DocType>) -> ModelPrompt {
    let mut user = format!("Request:\n{}", utterance);
    if let Some(hint) = doc_type_hint {
        user.push_str(&format!("\n\nThe document type is already known: {}", hint));
    }
    ModelPrompt::new(PromptKind::Profile, PROFILE_SYSTEM_PROMPT, user)
}

/// Prompt for the initial draft.
pub fn draft_prompt(utterance: &str, doc_type: DocType, title: &str) -> ModelPrompt {
    let user = format!(
        "Document type: {}\nTitle: {}\n\nRequest:\n{}",
        doc_type.label(),
        title,
        utterance
    );
    ModelPrompt::new(PromptKind::Draft, DRAFT_SYSTEM_PROMPT, user)
}

/// Prompt for the first follow-up question about a fresh draft.
pub fn follow_up_prompt(title: &str, content: &str) -> ModelPrompt {
    let user = format!("Draft of \"{}\":\n\n{}", title, content);
    ModelPrompt::new(PromptKind::FollowUp, FOLLOW_UP_SYSTEM_PROMPT, user)
}

/// Combined prompt for a revision and the next question.
pub fn revision_prompt(
    session: &DocumentSession,
    current: &str,
    utterance: &str,
    history_window: usize,
) -> ModelPrompt {
    let mut user = format!(
        "Document: \"{}\" ({})\n",
        session.title,
        session.doc_type.label()
    );
    push_history(&mut user, session, history_window);
    user.push_str(&format!(
        "\nCurrent document:\n<current>\n{}\n</current>\n\nUser message:\n{}",
        current, utterance
    ));
    ModelPrompt::new(PromptKind::Revise, REVISION_SYSTEM_PROMPT, user)
}

/// Prompt for a capability agent.
pub fn agent_prompt(system: &str, request: &str) -> ModelPrompt {
    ModelPrompt::new(PromptKind::Agent, system, request)
}

fn push_history(out: &mut String, session: &DocumentSession, window: usize) {
    let turns = session.recent_turns(window);
    if turns.is_empty() {
        return;
    }
    out.push_str("\nRecent conversation:\n");
    for turn in turns {
        out.push_str(&format!("User: {}\nAssistant: {}\n", turn.utterance, turn.response));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DocumentSession {
        let mut session = DocumentSession::new("/docs/prd/fx.md", DocType::Prd, "Forex Trainer");
        session.record_turn("first", "Which markets?");
        session.record_turn("second", "Which brokers?");
        session
    }

    #[test]
    fn test_classifier_prompt_includes_context() {
        let prompt = classifier_prompt("add a risk section", &session(), 1);
        assert_eq!(prompt.kind, PromptKind::Classify);
        assert!(prompt.user.contains("Forex Trainer"));
        assert!(prompt.user.contains("Which brokers?"));
        assert!(!prompt.user.contains("Which markets?"));
        assert!(prompt.user.ends_with("add a risk section"));
        assert!(prompt.system.contains("start_new_doc"));
    }

    #[test]
    fn test_profile_prompt_hint() {
        let prompt = profile_prompt("new design doc", Some(DocType::Design));
        assert!(prompt.user.contains("already known: design"));
        assert!(!profile_prompt("x", None).user.contains("already known"));
    }

    #[test]
    fn test_revision_prompt_embeds_current_document() {
        let prompt = revision_prompt(&session(), "# Forex", "add goals", 0);
        assert_eq!(prompt.kind, PromptKind::Revise);
        assert!(prompt.user.contains("<current>\n# Forex\n</current>"));
        assert!(!prompt.user.contains("Recent conversation"));
    }
}
