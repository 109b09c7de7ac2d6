use std::fmt;

use crate::corpus::TaggedToken;
use crate::errors::Result;
use crate::model::Model;
use crate::tagger::Tagger;

fn percentage(good: usize, bad: usize) -> Option<f64> {
    let total = good + bad;
    if total == 0 {
        None
    } else {
        Some(good as f64 / total as f64 * 100.0)
    }
}

/// Counts correct and incorrect tags against a gold-standard corpus.
///
/// A token is known if the word or its lowercase form is in the lexicon of the model. This is
/// looser than the tagger, which only retries the lowercase form of words starting with an
/// uppercase letter. A word such as `tEST` is therefore counted as known when `test` is in the
/// lexicon, although the tagger estimates its tags from the suffix.
///
/// # Examples
///
/// ```
/// use tritag::{train, wrap_sentence, Evaluator, TaggedToken, Tagger, TaggerConfig};
///
/// let sentence = wrap_sentence([TaggedToken::new("dogs", "NNS"), TaggedToken::new("bark", "VBP")]);
/// let model = train([Ok(sentence.clone())]).unwrap();
/// let tagger = Tagger::new(&model, &TaggerConfig::default()).unwrap();
///
/// let mut evaluator = Evaluator::new(&model);
/// evaluator.process(&tagger, &sentence).unwrap();
/// assert_eq!(Some(100.0), evaluator.overall_accuracy());
/// assert_eq!(None, evaluator.unknown_accuracy());
/// ```
pub struct Evaluator<'a> {
    model: &'a Model,
    n_known_good: usize,
    n_known_bad: usize,
    n_unknown_good: usize,
    n_unknown_bad: usize,
    n_untaggable: usize,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator with zero counts.
    pub const fn new(model: &'a Model) -> Self {
        Self {
            model,
            n_known_good: 0,
            n_known_bad: 0,
            n_unknown_good: 0,
            n_unknown_bad: 0,
            n_untaggable: 0,
        }
    }

    /// Tags a gold sentence and compares the result with its tags.
    ///
    /// # Arguments
    ///
    /// * `tagger` - A tagger.
    /// * `sentence` - A gold sentence wrapped with two start markers and one end marker, as
    ///                produced by the corpus readers.
    ///
    /// # Errors
    ///
    /// An untaggable sentence is only counted and does not produce an error. Other tagging
    /// errors are returned as is.
    pub fn process(&mut self, tagger: &Tagger, sentence: &[TaggedToken]) -> Result<()> {
        let gold = sentence
            .get(2..sentence.len().saturating_sub(1))
            .unwrap_or_default();
        let words: Vec<&str> = gold.iter().map(|token| token.word.as_str()).collect();
        let tagged = match tagger.tag(&words) {
            Ok(tagged) => tagged,
            Err(e) if e.is_untaggable() => {
                log::debug!("{e}");
                self.n_untaggable += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        for (token, tag) in gold.iter().zip(tagged.tags()) {
            let good = token.tag == *tag;
            match (self.model.is_known(&token.word), good) {
                (true, true) => self.n_known_good += 1,
                (true, false) => self.n_known_bad += 1,
                (false, true) => self.n_unknown_good += 1,
                (false, false) => self.n_unknown_bad += 1,
            }
        }
        Ok(())
    }

    /// Gets the number of correctly tagged known tokens.
    pub const fn n_known_good(&self) -> usize {
        self.n_known_good
    }

    /// Gets the number of incorrectly tagged known tokens.
    pub const fn n_known_bad(&self) -> usize {
        self.n_known_bad
    }

    /// Gets the number of correctly tagged unknown tokens.
    pub const fn n_unknown_good(&self) -> usize {
        self.n_unknown_good
    }

    /// Gets the number of incorrectly tagged unknown tokens.
    pub const fn n_unknown_bad(&self) -> usize {
        self.n_unknown_bad
    }

    /// Gets the number of sentences that could not be tagged.
    pub const fn n_untaggable(&self) -> usize {
        self.n_untaggable
    }

    /// Gets the accuracy on known tokens as a percentage.
    pub fn known_accuracy(&self) -> Option<f64> {
        percentage(self.n_known_good, self.n_known_bad)
    }

    /// Gets the accuracy on unknown tokens as a percentage.
    pub fn unknown_accuracy(&self) -> Option<f64> {
        percentage(self.n_unknown_good, self.n_unknown_bad)
    }

    /// Gets the accuracy on all tokens as a percentage.
    pub fn overall_accuracy(&self) -> Option<f64> {
        percentage(
            self.n_known_good + self.n_unknown_good,
            self.n_known_bad + self.n_unknown_bad,
        )
    }
}

fn write_accuracy(f: &mut fmt::Formatter, name: &str, accuracy: Option<f64>) -> fmt::Result {
    match accuracy {
        Some(accuracy) => writeln!(f, "{name} accuracy: {accuracy:.2}"),
        None => writeln!(f, "{name} accuracy: -"),
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_accuracy(f, "Known", self.known_accuracy())?;
        write_accuracy(f, "Unknown", self.unknown_accuracy())?;
        write_accuracy(f, "Overall", self.overall_accuracy())?;
        write!(f, "Untaggable sentences: {}", self.n_untaggable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::collector::FrequencyCollector;
    use crate::corpus::wrap_sentence;
    use crate::tagger::TaggerConfig;
    use crate::word_handler::SuffixConfig;

    fn sentence(items: &[(&str, &str)]) -> Vec<TaggedToken> {
        wrap_sentence(items.iter().map(|&(w, t)| TaggedToken::new(w, t)))
    }

    fn model() -> Model {
        let mut collector = FrequencyCollector::new(true);
        collector.add_sentence(&sentence(&[("the", "DT"), ("dog", "NN"), ("barks", "VBZ")]));
        collector.add_sentence(&sentence(&[("a", "DT"), ("cat", "NN"), ("meows", "VBZ")]));
        collector.into_model().unwrap()
    }

    #[test]
    fn test_empty() {
        let model = model();
        let evaluator = Evaluator::new(&model);
        assert_eq!(None, evaluator.known_accuracy());
        assert_eq!(None, evaluator.unknown_accuracy());
        assert_eq!(None, evaluator.overall_accuracy());
    }

    #[test]
    fn test_known_counts() {
        let model = model();
        let tagger = Tagger::new(&model, &TaggerConfig::default()).unwrap();
        let mut evaluator = Evaluator::new(&model);
        evaluator
            .process(&tagger, &sentence(&[("The", "DT"), ("cat", "NN"), ("barks", "VBZ")]))
            .unwrap();
        evaluator
            .process(&tagger, &sentence(&[("the", "DT"), ("dog", "VBZ")]))
            .unwrap();
        assert_eq!(4, evaluator.n_known_good());
        assert_eq!(1, evaluator.n_known_bad());
        assert_eq!(0, evaluator.n_unknown_good() + evaluator.n_unknown_bad());
        assert_eq!(Some(80.0), evaluator.known_accuracy());
        assert_eq!(Some(80.0), evaluator.overall_accuracy());
    }

    #[test]
    fn test_unknown_counts() {
        let model = model();
        let tagger = Tagger::new(&model, &TaggerConfig::default()).unwrap();
        let mut evaluator = Evaluator::new(&model);
        evaluator
            .process(&tagger, &sentence(&[("the", "DT"), ("xyz", "NN"), ("barks", "VBZ")]))
            .unwrap();
        assert_eq!(2, evaluator.n_known_good() + evaluator.n_known_bad());
        assert_eq!(1, evaluator.n_unknown_good() + evaluator.n_unknown_bad());
    }

    #[test]
    fn test_lowercase_form_is_known() {
        let model = model();
        let tagger = Tagger::new(&model, &TaggerConfig::default()).unwrap();
        let mut evaluator = Evaluator::new(&model);
        evaluator
            .process(&tagger, &sentence(&[("the", "DT"), ("dOG", "NN")]))
            .unwrap();
        assert_eq!(2, evaluator.n_known_good() + evaluator.n_known_bad());
        assert_eq!(0, evaluator.n_unknown_good() + evaluator.n_unknown_bad());
        // The tagger itself does not find the lowercase form.
        assert_ne!(
            tagger.word_handler().tag_probs("dog"),
            tagger.word_handler().tag_probs("dOG")
        );
    }

    #[test]
    fn test_untaggable_is_counted() {
        let model = model();
        let config = TaggerConfig {
            suffix: SuffixConfig {
                max_tags: 0,
                ..SuffixConfig::default()
            },
            ..TaggerConfig::default()
        };
        let tagger = Tagger::new(&model, &config).unwrap();
        let mut evaluator = Evaluator::new(&model);
        evaluator
            .process(&tagger, &sentence(&[("the", "DT"), ("xyz", "NN")]))
            .unwrap();
        evaluator
            .process(&tagger, &sentence(&[("a", "DT"), ("dog", "NN")]))
            .unwrap();
        assert_eq!(1, evaluator.n_untaggable());
        assert_eq!(Some(100.0), evaluator.overall_accuracy());
    }

    #[test]
    fn test_display() {
        let model = model();
        let evaluator = Evaluator::new(&model);
        assert_eq!(
            "Known accuracy: -\nUnknown accuracy: -\nOverall accuracy: -\nUntaggable sentences: 0",
            evaluator.to_string(),
        );
    }
}
