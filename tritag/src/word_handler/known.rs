use crate::model::Model;
use crate::ngram::UniGram;
use crate::utils::{self, FastMap};
use crate::word_handler::{TagProbs, WordHandler};

/// Looks up P(word | tag) of words in the lexicon.
pub struct KnownWordHandler {
    word_tag_probs: FastMap<String, TagProbs>,
    fallback: Option<Box<WordHandler>>,
}

impl KnownWordHandler {
    /// Creates a new handler.
    ///
    /// # Arguments
    ///
    /// * `model` - A model.
    /// * `fallback` - A handler used for words that are not in the lexicon.
    pub fn new(model: &Model, fallback: Option<WordHandler>) -> Self {
        let word_tag_probs = model
            .lexicon()
            .iter()
            .map(|(word, tag_freqs)| {
                let probs = tag_freqs
                    .iter()
                    .map(|(&tag, &freq)| {
                        // Model validation guarantees a positive unigram frequency.
                        let tag_freq = model.unigrams().get(&UniGram(tag)).map_or(1, |&f| f);
                        (tag, (f64::from(freq) / f64::from(tag_freq)).ln())
                    })
                    .collect();
                (word.clone(), probs)
            })
            .collect();
        Self {
            word_tag_probs,
            fallback: fallback.map(Box::new),
        }
    }

    /// Returns the log-probabilities of the tags seen with the word, ordered by tag id.
    ///
    /// A capitalized word that is not in the lexicon is looked up in lowercase. If it is still
    /// not found, the fallback handler is used, or an empty result is returned without one.
    pub fn tag_probs(&self, word: &str) -> TagProbs {
        if let Some(probs) = self.word_tag_probs.get(word) {
            return probs.clone();
        }
        if utils::starts_with_uppercase(word) {
            if let Some(probs) = self.word_tag_probs.get(&word.to_lowercase()) {
                return probs.clone();
            }
        }
        self.fallback
            .as_ref()
            .map_or_else(TagProbs::new, |fallback| fallback.tag_probs(word))
    }
}
