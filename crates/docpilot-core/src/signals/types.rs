//! Type definitions for utterance signals.

/// How a reply to a yes/no confirmation prompt reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Confirmation {
    /// Explicit yes.
    Affirmative,
    /// Explicit no.
    Negative,
    /// Neither; treat as a fresh utterance.
    #[default]
    Other,
}

impl Confirmation {
    /// Returns true for an explicit yes.
    pub fn is_affirmative(&self) -> bool {
        matches!(self, Self::Affirmative)
    }
}
