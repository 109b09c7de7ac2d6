use std::cmp::Ordering;

use regex::Regex;

use crate::corpus::{END_TOKEN, START_TOKEN};
use crate::errors::{Result, TritagError};
use crate::model::Model;
use crate::ngram::TagId;
use crate::utils;
use crate::word_handler::suffix_tree::{self, WordSuffixTree};
use crate::word_handler::TagProbs;

const CARDINAL_PATTERN: &str = r"^(?:[0-9]+|[0-9]+\.|[0-9.,:-]+[0-9]+|[0-9]+[a-zA-Z]{1,3})$";

/// Settings of the unknown word estimator.
#[derive(Clone, Debug, PartialEq)]
pub struct SuffixConfig {
    /// The maximum number of trailing characters used for estimation.
    pub max_suffix_len: usize,

    /// Capitalized words with a frequency up to this value are used for estimation.
    pub upper_max_freq: u32,

    /// Lowercase words with a frequency up to this value are used for estimation.
    pub lower_max_freq: u32,

    /// Words containing a hyphen with a frequency up to this value are used for estimation.
    pub hyphen_max_freq: u32,

    /// Numbers with a frequency up to this value are used for estimation.
    pub cardinal_max_freq: u32,

    /// The maximum number of candidate tags returned for an unknown word.
    pub max_tags: usize,
}

impl Default for SuffixConfig {
    fn default() -> Self {
        Self {
            max_suffix_len: 2,
            upper_max_freq: 2,
            lower_max_freq: 8,
            hyphen_max_freq: 8,
            cardinal_max_freq: 4,
            max_tags: 10,
        }
    }
}

/// Class of a word. Each class has its own suffix tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WordClass {
    Cardinal = 0,
    Upper = 1,
    Hyphen = 2,
    Lower = 3,
}

/// Estimates tag probabilities of unknown words from their suffixes.
pub struct SuffixWordHandler {
    cardinal_pattern: Regex,
    trees: [WordSuffixTree; 4],
    max_freqs: [u32; 4],
    max_tags: usize,
    marker_tags: Vec<TagId>,
}

impl SuffixWordHandler {
    /// Creates a new handler.
    ///
    /// # Arguments
    ///
    /// * `model` - A model. Rare words of its lexicon are used for estimation.
    /// * `config` - Settings.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidArgument`] is returned if the word class pattern cannot be built.
    pub fn new(model: &Model, config: &SuffixConfig) -> Result<Self> {
        let cardinal_pattern = Regex::new(CARDINAL_PATTERN)
            .map_err(|e| TritagError::invalid_argument("cardinal_pattern", e.to_string()))?;
        let theta = suffix_tree::theta(model.unigrams());
        log::debug!("theta: {theta}");

        let new_tree = || WordSuffixTree::new(model.unigrams(), theta, config.max_suffix_len);
        let mut handler = Self {
            cardinal_pattern,
            trees: [new_tree(), new_tree(), new_tree(), new_tree()],
            max_freqs: [
                config.cardinal_max_freq,
                config.upper_max_freq,
                config.hyphen_max_freq,
                config.lower_max_freq,
            ],
            max_tags: config.max_tags,
            marker_tags: [START_TOKEN, END_TOKEN]
                .iter()
                .filter_map(|name| model.tag_id(name))
                .collect(),
        };

        for (word, tag_freqs) in model.lexicon() {
            if word.is_empty() {
                log::warn!("skipped an empty word in the lexicon");
                continue;
            }
            let class = handler.word_class(word) as usize;
            let freq = tag_freqs.values().map(|&f| u64::from(f)).sum::<u64>();
            if freq <= u64::from(handler.max_freqs[class]) {
                handler.trees[class].add_word(word, tag_freqs);
            }
        }
        log::debug!(
            "# of suffix tree nodes: cardinal={} upper={} hyphen={} lower={}",
            handler.trees[0].n_nodes(),
            handler.trees[1].n_nodes(),
            handler.trees[2].n_nodes(),
            handler.trees[3].n_nodes(),
        );

        Ok(handler)
    }

    /// Gets the class of a word.
    pub fn word_class(&self, word: &str) -> WordClass {
        if self.cardinal_pattern.is_match(word) {
            WordClass::Cardinal
        } else if utils::starts_with_uppercase(word) {
            WordClass::Upper
        } else if word.contains('-') {
            WordClass::Hyphen
        } else {
            WordClass::Lower
        }
    }

    /// Estimates values proportional to P(suffix | tag) for every tag, ordered by tag id.
    pub fn suffix_tag_probs(&self, word: &str) -> Vec<(TagId, f64)> {
        self.trees[self.word_class(word) as usize].suffix_tag_probs(word)
    }

    /// Returns the log-probabilities of the most likely tags, ordered by tag id.
    ///
    /// The sentence marker tags are never candidates.
    pub fn tag_probs(&self, word: &str) -> TagProbs {
        let mut probs = self.suffix_tag_probs(word);
        probs.retain(|(tag, _)| !self.marker_tags.contains(tag));
        probs.sort_unstable_by(|(tag_a, p_a), (tag_b, p_b)| {
            p_b.partial_cmp(p_a)
                .unwrap_or(Ordering::Equal)
                .then(tag_a.cmp(tag_b))
        });
        probs.truncate(self.max_tags);
        let mut result: TagProbs = probs.into_iter().map(|(tag, p)| (tag, p.ln())).collect();
        result.sort_unstable_by_key(|&(tag, _)| tag);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::collector::FrequencyCollector;
    use crate::corpus::{wrap_sentence, TaggedToken};

    fn train(sentences: &[&[(&str, &str)]]) -> Model {
        let mut collector = FrequencyCollector::new(false);
        for items in sentences {
            collector.add_sentence(&wrap_sentence(
                items.iter().map(|&(w, t)| TaggedToken::new(w, t)),
            ));
        }
        collector.into_model().unwrap()
    }

    fn build_handler(config: &SuffixConfig) -> (Model, SuffixWordHandler) {
        let model = train(&[
            &[("walking", "VBG"), ("dogs", "NNS")],
            &[("talking", "VBG"), ("dog", "NN")],
            &[("the", "DT"), ("dog", "NN")],
            &[("1984", "CD"), ("Kim", "NNP")],
        ]);
        let handler = SuffixWordHandler::new(&model, config).unwrap();
        (model, handler)
    }

    #[test]
    fn test_word_class() {
        let (_, handler) = build_handler(&SuffixConfig::default());
        assert_eq!(WordClass::Cardinal, handler.word_class("1984"));
        assert_eq!(WordClass::Cardinal, handler.word_class("12."));
        assert_eq!(WordClass::Cardinal, handler.word_class("3,000.50"));
        assert_eq!(WordClass::Cardinal, handler.word_class("12-13"));
        assert_eq!(WordClass::Cardinal, handler.word_class("70s"));
        assert_eq!(WordClass::Lower, handler.word_class("1984abcd"));
        assert_eq!(WordClass::Upper, handler.word_class("Anti-war"));
        assert_eq!(WordClass::Hyphen, handler.word_class("anti-war"));
        assert_eq!(WordClass::Lower, handler.word_class("dog"));
        assert_eq!(WordClass::Lower, handler.word_class(""));
    }

    #[test]
    fn test_shared_suffix() {
        let (model, handler) = build_handler(&SuffixConfig::default());
        let vbg = model.tag_id("VBG").unwrap();
        let probs = handler.tag_probs("jumping");
        let (_, vbg_prob) = probs.iter().find(|&&(tag, _)| tag == vbg).unwrap();
        for &(tag, p) in &probs {
            if tag != vbg {
                assert!(*vbg_prob > p);
            }
        }
    }

    #[test]
    fn test_never_empty() {
        let (model, handler) = build_handler(&SuffixConfig::default());
        for word in ["", "xyz", "Xyz", "x-y", "42", "ü"] {
            let probs = handler.tag_probs(word);
            assert!(!probs.is_empty());
            assert!(probs.len() <= model.n_tags());
            assert!(probs.windows(2).all(|w| w[0].0 < w[1].0));
        }
    }

    #[test]
    fn test_max_tags() {
        let config = SuffixConfig {
            max_tags: 2,
            ..SuffixConfig::default()
        };
        let (model, handler) = build_handler(&config);
        let all = handler.suffix_tag_probs("jumping");
        let probs = handler.tag_probs("jumping");
        assert_eq!(2, probs.len());

        let mut sorted: Vec<_> = all
            .into_iter()
            .filter(|&(t, _)| {
                t != model.tag_id(START_TOKEN).unwrap() && t != model.tag_id(END_TOKEN).unwrap()
            })
            .collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        let mut expected: Vec<_> = sorted[..2].iter().map(|&(t, p)| (t, p.ln())).collect();
        expected.sort_by_key(|&(t, _)| t);
        assert_eq!(expected, probs);

        let config = SuffixConfig {
            max_tags: 0,
            ..SuffixConfig::default()
        };
        let (_, handler) = build_handler(&config);
        assert!(handler.tag_probs("jumping").is_empty());
    }

    #[test]
    fn test_markers_are_not_candidates() {
        let (model, handler) = build_handler(&SuffixConfig::default());
        let start = model.tag_id(START_TOKEN).unwrap();
        let end = model.tag_id(END_TOKEN).unwrap();
        // No suffix matches, so every tag ties and the markers would sort first.
        for word in ["", "Lee", "12-13", "qqq"] {
            let probs = handler.tag_probs(word);
            assert!(!probs.is_empty());
            assert!(probs.iter().all(|&(tag, _)| tag != start && tag != end));
            assert_eq!(model.n_tags() - 2, probs.len());
        }
    }

    #[test]
    fn test_frequent_words_are_excluded() {
        let config = SuffixConfig {
            lower_max_freq: 0,
            ..SuffixConfig::default()
        };
        let (_, handler) = build_handler(&config);
        // Only the root remains, so every tag gets P(t) / P(t).
        for (_, p) in handler.suffix_tag_probs("jumping") {
            assert!((p - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_suffix_len() {
        let config = SuffixConfig {
            max_suffix_len: 0,
            ..SuffixConfig::default()
        };
        let (_, handler) = build_handler(&config);
        for (_, p) in handler.suffix_tag_probs("jumping") {
            assert!((p - 1.0).abs() < 1e-9);
        }
    }
}
