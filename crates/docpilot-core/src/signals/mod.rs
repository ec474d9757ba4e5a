//! Deterministic utterance signal detection.
//!
//! Everything here is pure and synchronous: no model call is ever made. The
//! router uses these checks to decide whether an utterance is worth an
//! (expensive) classifier or drafting call at all.
//!
//! # Detectors
//!
//! 1. **Kickoff** - does the utterance ask for a brand-new document/project?
//! 2. **Revision** - does it ask to change previously produced output?
//! 3. **Completion** - is it a "done" signal?
//! 4. **Confirmation** - how does it read as a yes/no reply?
//!
//! Vocabularies and thresholds are policy. [`KickoffHeuristic`] and
//! [`RevisionDetector`] can be built with custom patterns; the free
//! functions use the defaults.

mod patterns;
#[cfg(test)]
mod tests;
mod types;

use std::sync::OnceLock;

use regex::Regex;

pub use self::patterns::normalize;
use self::patterns::{
    default_creation_pattern, default_deliverable_pattern, default_inquiry_pattern,
    default_project_statement_patterns, default_revision_reference_pattern,
    default_revision_verb_pattern, first_word, trailing_words, word_count, AFFIRMATIVE_PHRASES,
    AFFIRMATIVE_PREFIXES, COMPLETION_PHRASES, HEDGE_WORDS, NEGATIVE_PHRASES, NEGATIVE_PREFIXES,
};
pub use self::types::Confirmation;

/// Default minimum word count for a kickoff.
pub const DEFAULT_KICKOFF_MIN_WORDS: usize = 5;

/// Default minimum word count for a revision request.
pub const DEFAULT_REVISION_MIN_WORDS: usize = 3;

static DEFAULT_KICKOFF: OnceLock<KickoffHeuristic> = OnceLock::new();
static DEFAULT_REVISION: OnceLock<RevisionDetector> = OnceLock::new();

/// Classifies utterances as "new document request" vs. ordinary talk.
#[derive(Debug, Clone)]
pub struct KickoffHeuristic {
    /// Utterances with fewer words never count as a kickoff.
    min_words: usize,
    /// Statements that announce a project on their own.
    project_statements: Vec<Regex>,
    /// Intent-to-produce verbs.
    creation: Regex,
    /// Deliverable nouns; must co-occur with a creation verb.
    deliverable: Regex,
    /// Questions, which are never kickoffs unless they state a project.
    inquiry: Regex,
}

impl Default for KickoffHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl KickoffHeuristic {
    /// Create a heuristic with the default patterns.
    pub fn new() -> Self {
        Self {
            min_words: DEFAULT_KICKOFF_MIN_WORDS,
            project_statements: default_project_statement_patterns(),
            creation: default_creation_pattern(),
            deliverable: default_deliverable_pattern(),
            inquiry: default_inquiry_pattern(),
        }
    }

    /// Set the minimum informational threshold in words.
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words.max(1);
        self
    }

    /// Add a custom project-statement pattern.
    pub fn add_project_statement(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.project_statements.push(Regex::new(pattern)?);
        Ok(())
    }

    /// Returns true if `text` reads like a request to create a new deliverable.
    pub fn looks_like_kickoff(&self, text: &str) -> bool {
        let normalized = normalize(text);
        if word_count(&normalized) < self.min_words {
            return false;
        }

        if self
            .project_statements
            .iter()
            .any(|p| p.is_match(&normalized))
        {
            return true;
        }

        if self.inquiry.is_match(&normalized) {
            return false;
        }

        self.creation.is_match(&normalized) && self.deliverable.is_match(&normalized)
    }
}

/// Recognises requests to revise previously produced output.
#[derive(Debug, Clone)]
pub struct RevisionDetector {
    min_words: usize,
    verbs: Regex,
    references: Regex,
}

impl Default for RevisionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionDetector {
    /// Create a detector with the default vocabulary.
    pub fn new() -> Self {
        Self {
            min_words: DEFAULT_REVISION_MIN_WORDS,
            verbs: default_revision_verb_pattern(),
            references: default_revision_reference_pattern(),
        }
    }

    /// Set the minimum word count.
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words.max(1);
        self
    }

    /// Returns true if `text` asks to change earlier output.
    ///
    /// Needs both a revision verb and a reference to prior output
    /// ("fix the issues found in the document from the review").
    pub fn looks_like_revision(&self, text: &str) -> bool {
        let normalized = normalize(text);
        word_count(&normalized) >= self.min_words
            && self.verbs.is_match(&normalized)
            && self.references.is_match(&normalized)
    }
}

/// Kickoff check with the default heuristic.
pub fn looks_like_kickoff(text: &str) -> bool {
    DEFAULT_KICKOFF
        .get_or_init(KickoffHeuristic::new)
        .looks_like_kickoff(text)
}

/// Revision check with the default detector.
pub fn looks_like_revision(text: &str) -> bool {
    DEFAULT_REVISION
        .get_or_init(RevisionDetector::new)
        .looks_like_revision(text)
}

/// Returns true if `text` is a completion signal such as "done".
pub fn is_completion_signal(text: &str) -> bool {
    let normalized = normalize(text);
    COMPLETION_PHRASES.contains(&normalized.as_str())
}

/// Reads `text` as a reply to a yes/no prompt.
///
/// A leading "yes" or "ok" only counts when nothing after it hedges
/// ("ok, but first tell me what is missing" is not a yes).
pub fn parse_confirmation(text: &str) -> Confirmation {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Confirmation::Other;
    }

    if AFFIRMATIVE_PHRASES.contains(&normalized.as_str()) {
        return Confirmation::Affirmative;
    }
    if NEGATIVE_PHRASES.contains(&normalized.as_str()) {
        return Confirmation::Negative;
    }

    let lead = first_word(&normalized);
    if AFFIRMATIVE_PREFIXES.contains(&lead) {
        if trailing_words(&normalized).any(|w| HEDGE_WORDS.contains(&w)) {
            Confirmation::Other
        } else {
            Confirmation::Affirmative
        }
    } else if NEGATIVE_PREFIXES.contains(&lead) {
        Confirmation::Negative
    } else {
        Confirmation::Other
    }
}
