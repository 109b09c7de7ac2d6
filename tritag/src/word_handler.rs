//! Estimators of P(word | tag).

mod known;
mod suffix;
mod suffix_tree;

use crate::ngram::TagId;

pub use known::KnownWordHandler;
pub use suffix::{SuffixConfig, SuffixWordHandler, WordClass};

/// Candidate tags of a word with their log-probabilities, ordered by tag id.
pub type TagProbs = Vec<(TagId, f64)>;

/// Estimator of P(word | tag).
pub enum WordHandler {
    /// Lexicon lookup, optionally falling back to another handler.
    Known(KnownWordHandler),

    /// Suffix-based estimation for unknown words.
    Suffix(SuffixWordHandler),
}

impl WordHandler {
    /// Returns the candidate tags of a word with their log-probabilities, ordered by tag id.
    ///
    /// An empty result means that the word cannot be tagged.
    pub fn tag_probs(&self, word: &str) -> TagProbs {
        match self {
            Self::Known(handler) => handler.tag_probs(word),
            Self::Suffix(handler) => handler.tag_probs(word),
        }
    }
}

impl From<KnownWordHandler> for WordHandler {
    fn from(handler: KnownWordHandler) -> Self {
        Self::Known(handler)
    }
}

impl From<SuffixWordHandler> for WordHandler {
    fn from(handler: SuffixWordHandler) -> Self {
        Self::Suffix(handler)
    }
}
