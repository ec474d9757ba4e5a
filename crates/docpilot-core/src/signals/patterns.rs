//! Pattern definitions for utterance signal detection.

use regex::Regex;

/// Phrases that on their own announce a new project or deliverable.
///
/// "this will be a project that ...", "we're building a new app", "new PRD".
pub fn default_project_statement_patterns() -> Vec<Regex> {
    vec![
        Regex::new(
            r"\b(this|it)\s+(will|would|is going to|is gonna)\s+be\s+an?\s+(new\s+)?(project|app|application|product|system|platform|tool|service)\b",
        )
        .expect("valid project statement pattern"),
        Regex::new(
            r"\b(i'm|im|i am|we're|were|we are)\s+(building|creating|starting|launching|developing|designing)\s+an?\s+(new\s+)?\w+",
        )
        .expect("valid project statement pattern"),
        Regex::new(
            r"\b(new|start a|starting a|kick off a|kickoff for a)\s+(project|prd|product requirements|requirements doc(ument)?|design doc(ument)?|spec|specification)\b",
        )
        .expect("valid project statement pattern"),
    ]
}

/// Verbs that express intent to produce something.
pub fn default_creation_pattern() -> Regex {
    Regex::new(
        r"\b(create|build|make|write|draft|start|develop|design|launch|plan|spec out|put together|kick off|set up)\b",
    )
    .expect("valid creation pattern")
}

/// Nouns naming a deliverable worth a document.
pub fn default_deliverable_pattern() -> Regex {
    Regex::new(
        r"\b(prds?|product requirements?|requirements|specs?|specifications?|design docs?|design documents?|documents?|docs?|projects?|apps?|applications?|products?|systems?|platforms?|services?|tools?|apis?|websites?|features?|models?|bots?|pipelines?|roadmaps?)\b",
    )
    .expect("valid deliverable pattern")
}

/// Questions about the assistant or general knowledge, not requests.
pub fn default_inquiry_pattern() -> Regex {
    Regex::new(
        r"^(what|why|how|who|when|where|which|can you explain|could you explain|do you|does|did|is|are)\b.*\?$",
    )
    .expect("valid inquiry pattern")
}

/// Verbs that ask for changes to existing output.
pub fn default_revision_verb_pattern() -> Regex {
    Regex::new(
        r"\b(fix|fixes|fixing|revise|revisit|update|amend|edit|address|apply|incorporate|correct|rework|rewrite|change|improve|polish|resolve|tweak|adjust)\b",
    )
    .expect("valid revision verb pattern")
}

/// References to previously produced output.
pub fn default_revision_reference_pattern() -> Regex {
    Regex::new(
        r"\b(document|doc|draft|spec|specification|prd|requirements|design|review|feedback|issues?|comments?|findings|suggestions|section|sections)\b",
    )
    .expect("valid revision reference pattern")
}

/// Whole-utterance completion phrases (already normalized).
pub const COMPLETION_PHRASES: &[&str] = &[
    "done",
    "/done",
    "all done",
    "i'm done",
    "im done",
    "i am done",
    "we're done",
    "we are done",
    "done for now",
    "finished",
    "i'm finished",
    "that's all",
    "thats all",
    "that is all",
    "finish",
    "complete",
];

/// Whole-utterance affirmative replies (already normalized).
pub const AFFIRMATIVE_PHRASES: &[&str] = &[
    "yes",
    "y",
    "yeah",
    "yep",
    "yup",
    "sure",
    "ok",
    "okay",
    "confirm",
    "confirmed",
    "do it",
    "go ahead",
    "please do",
    "absolutely",
    "correct",
    "yes please",
    "sounds good",
    "start it",
    "switch",
];

/// Whole-utterance negative replies (already normalized).
pub const NEGATIVE_PHRASES: &[&str] = &[
    "no",
    "n",
    "nope",
    "nah",
    "cancel",
    "don't",
    "dont",
    "do not",
    "stop",
    "never mind",
    "nevermind",
    "no thanks",
    "keep going",
    "stay",
];

/// Leading words that mark a reply as yes/no even with trailing text.
pub const AFFIRMATIVE_PREFIXES: &[&str] = &["yes", "yeah", "yep", "sure", "ok", "okay"];

/// Leading words that mark a reply as no even with trailing text.
pub const NEGATIVE_PREFIXES: &[&str] = &["no", "nope", "nah", "cancel"];

/// Words that turn a leading "yes"/"ok" into a hedge ("ok, but first ...").
pub const HEDGE_WORDS: &[&str] = &[
    "but",
    "first",
    "wait",
    "not",
    "later",
    "hold",
    "before",
    "actually",
    "although",
    "however",
    "maybe",
    "unless",
];

/// Lowercase, trim, collapse whitespace and strip trailing punctuation.
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | ',' | ';' | ':'))
        .trim()
        .to_string()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// First word with surrounding punctuation removed.
pub fn first_word(text: &str) -> &str {
    text.split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
        .unwrap_or("")
}

/// Words after the first, with surrounding punctuation removed.
pub fn trailing_words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .skip(1)
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
}
