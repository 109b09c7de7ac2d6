use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::hash::Hash;

use hashbrown::HashMap;

use crate::corpus::{TaggedToken, END_TOKEN, START_TOKEN};
use crate::errors::Result;
use crate::model::{Model, TagFreqs, CAPITALIZED_PREFIX, NOT_CAPITALIZED_PREFIX};
use crate::ngram::{BiGram, TagId, TriGram, UniGram};
use crate::utils;

/// Assigns dense ids to keys in order of first appearance.
pub struct Indexer<K> {
    ids: HashMap<K, TagId>,
    keys: Vec<K>,
}

impl<K> Indexer<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            keys: vec![],
        }
    }

    pub fn get_id<Q>(&mut self, key: &Q) -> TagId
    where
        K: Borrow<Q>,
        Q: ?Sized + ToOwned<Owned = K> + Eq + Hash,
    {
        if let Some(&id) = self.ids.get(key) {
            id
        } else {
            let id = self.keys.len() as TagId;
            self.keys.push(key.to_owned());
            self.ids.insert(key.to_owned(), id);
            id
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn into_keys(self) -> Vec<K> {
        self.keys
    }
}

impl<K> Default for Indexer<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Collects tag and word frequencies from tagged sentences.
///
/// # Examples
///
/// ```
/// use tritag::{wrap_sentence, FrequencyCollector, TaggedToken};
///
/// let mut collector = FrequencyCollector::new(false);
/// collector.add_sentence(&wrap_sentence([
///     TaggedToken::new("the", "DT"),
///     TaggedToken::new("dog", "NN"),
/// ]));
/// let model = collector.into_model().unwrap();
///
/// assert_eq!(Some(1), model.tag_id("DT"));
/// assert_eq!(5, model.corpus_size());
/// ```
pub struct FrequencyCollector {
    capitalization: bool,
    tag_ids: Indexer<String>,
    lexicon: BTreeMap<String, TagFreqs>,
    unigrams: BTreeMap<UniGram, u32>,
    bigrams: BTreeMap<BiGram, u32>,
    trigrams: BTreeMap<TriGram, u32>,
    n_sentences: usize,
}

impl FrequencyCollector {
    /// Creates a new collector.
    ///
    /// # Arguments
    ///
    /// * `capitalization` - Splits every tag into a capitalized and a non-capitalized variant.
    ///   Sentence markers are never split.
    pub fn new(capitalization: bool) -> Self {
        Self {
            capitalization,
            tag_ids: Indexer::new(),
            lexicon: BTreeMap::new(),
            unigrams: BTreeMap::new(),
            bigrams: BTreeMap::new(),
            trigrams: BTreeMap::new(),
            n_sentences: 0,
        }
    }

    fn tag_id(&mut self, sentence: &[TaggedToken], i: usize) -> TagId {
        let token = &sentence[i];
        let interior = i >= 2 && i + 1 < sentence.len();
        if self.capitalization
            && interior
            && token.tag != START_TOKEN
            && token.tag != END_TOKEN
        {
            let prefix = if utils::starts_with_uppercase(&token.word) {
                CAPITALIZED_PREFIX
            } else {
                NOT_CAPITALIZED_PREFIX
            };
            self.tag_ids.get_id(format!("{prefix}{}", token.tag).as_str())
        } else {
            self.tag_ids.get_id(token.tag.as_str())
        }
    }

    /// Adds a sentence wrapped with two start markers and one end marker.
    pub fn add_sentence(&mut self, sentence: &[TaggedToken]) {
        let tags: Vec<TagId> = (0..sentence.len())
            .map(|i| self.tag_id(sentence, i))
            .collect();
        for (i, (token, &tag)) in sentence.iter().zip(&tags).enumerate() {
            *self
                .lexicon
                .entry(token.word.clone())
                .or_default()
                .entry(tag)
                .or_insert(0) += 1;
            *self.unigrams.entry(UniGram(tag)).or_insert(0) += 1;
            if i >= 1 {
                *self.bigrams.entry(BiGram(tags[i - 1], tag)).or_insert(0) += 1;
            }
            if i >= 2 {
                *self
                    .trigrams
                    .entry(TriGram(tags[i - 2], tags[i - 1], tag))
                    .or_insert(0) += 1;
            }
        }
        self.n_sentences += 1;
    }

    /// Adds all sentences of a corpus.
    ///
    /// # Errors
    ///
    /// The first error produced by `corpus` is returned as is. Sentences read before the error
    /// remain counted.
    pub fn process<I>(&mut self, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<Vec<TaggedToken>>>,
    {
        for sentence in corpus {
            self.add_sentence(&sentence?);
        }
        Ok(())
    }

    /// Gets the number of sentences added so far.
    pub const fn n_sentences(&self) -> usize {
        self.n_sentences
    }

    /// Creates a model from the collected frequencies.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidModel`](crate::errors::TritagError::InvalidModel) is returned if
    /// the collected tables are inconsistent, which should not happen.
    pub fn into_model(self) -> Result<Model> {
        log::debug!(
            "collected {} sentences, {} tags, {} words",
            self.n_sentences,
            self.tag_ids.len(),
            self.lexicon.len(),
        );
        Model::new(
            self.tag_ids.into_keys(),
            self.lexicon,
            self.unigrams,
            self.bigrams,
            self.trigrams,
            self.capitalization,
        )
    }
}

/// Trains a model from a corpus, splitting tags by capitalization.
///
/// # Arguments
///
/// * `corpus` - Sentences wrapped with two start markers and one end marker.
///
/// # Errors
///
/// The first error produced by `corpus` is returned as is.
pub fn train<I>(corpus: I) -> Result<Model>
where
    I: IntoIterator<Item = Result<Vec<TaggedToken>>>,
{
    let mut collector = FrequencyCollector::new(true);
    collector.process(corpus)?;
    collector.into_model()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::corpus::wrap_sentence;
    use crate::errors::TritagError;

    fn sentence(items: &[(&str, &str)]) -> Vec<TaggedToken> {
        wrap_sentence(items.iter().map(|&(w, t)| TaggedToken::new(w, t)))
    }

    #[test]
    fn test_indexer() {
        let mut indexer = Indexer::<String>::new();
        assert_eq!(0, indexer.get_id("a"));
        assert_eq!(1, indexer.get_id("b"));
        assert_eq!(0, indexer.get_id("a"));
        assert_eq!(2, indexer.len());
        assert_eq!(vec!["a".to_string(), "b".to_string()], indexer.into_keys());
    }

    #[test]
    fn test_collect_frequencies() {
        let mut collector = FrequencyCollector::new(false);
        collector.add_sentence(&sentence(&[("the", "DT"), ("dog", "NN"), ("barks", "VBZ")]));
        collector.add_sentence(&sentence(&[("the", "DT"), ("cat", "NN")]));
        assert_eq!(2, collector.n_sentences());
        let model = collector.into_model().unwrap();

        assert_eq!(
            vec!["<START>", "DT", "NN", "VBZ", "<END>"],
            model.tags().iter().map(String::as_str).collect::<Vec<_>>()
        );
        assert!(!model.capitalization());

        assert_eq!(Some(&4), model.unigrams().get(&UniGram(0)));
        assert_eq!(Some(&2), model.unigrams().get(&UniGram(1)));
        assert_eq!(Some(&2), model.unigrams().get(&UniGram(2)));
        assert_eq!(Some(&1), model.unigrams().get(&UniGram(3)));
        assert_eq!(Some(&2), model.unigrams().get(&UniGram(4)));
        assert_eq!(11, model.corpus_size());

        assert_eq!(Some(&2), model.bigrams().get(&BiGram(0, 0)));
        assert_eq!(Some(&2), model.bigrams().get(&BiGram(0, 1)));
        assert_eq!(Some(&1), model.bigrams().get(&BiGram(2, 4)));
        assert_eq!(Some(&1), model.bigrams().get(&BiGram(3, 4)));

        assert_eq!(Some(&2), model.trigrams().get(&TriGram(0, 0, 1)));
        assert_eq!(Some(&2), model.trigrams().get(&TriGram(0, 1, 2)));
        assert_eq!(Some(&1), model.trigrams().get(&TriGram(1, 2, 4)));
        assert_eq!(None, model.trigrams().get(&TriGram(0, 0, 0)));

        assert_eq!(Some(&2), model.lexicon()["the"].get(&1));
        assert_eq!(Some(&4), model.lexicon()["<START>"].get(&0));
        assert_eq!(Some(&2), model.lexicon()["<END>"].get(&4));
    }

    #[test]
    fn test_capitalization() {
        let mut collector = FrequencyCollector::new(true);
        collector.add_sentence(&sentence(&[("The", "DT"), ("Kim", "NNP"), ("the", "DT")]));
        let model = collector.into_model().unwrap();

        assert_eq!(
            vec!["<START>", "c-DT", "c-NNP", "n-DT", "<END>"],
            model.tags().iter().map(String::as_str).collect::<Vec<_>>()
        );
        assert!(model.capitalization());
        assert_eq!(Some("DT"), model.base_tag_name(3));
        assert_eq!(Some(&1), model.lexicon()["The"].get(&1));
        assert_eq!(Some(&1), model.lexicon()["the"].get(&3));
    }

    #[test]
    fn test_process_stops_at_error() {
        let corpus = vec![
            Ok(sentence(&[("a", "DT")])),
            Err(TritagError::invalid_corpus(2, "tag is missing")),
            Ok(sentence(&[("b", "DT")])),
        ];
        let mut collector = FrequencyCollector::new(false);
        assert!(matches!(
            collector.process(corpus),
            Err(TritagError::InvalidCorpus(_))
        ));
        assert_eq!(1, collector.n_sentences());
    }

    #[test]
    fn test_train_is_deterministic() {
        let corpus = || {
            vec![
                Ok(sentence(&[("the", "DT"), ("dog", "NN"), ("barks", "VBZ")])),
                Ok(sentence(&[("A", "DT"), ("cat", "NN"), ("meows", "VBZ")])),
            ]
        };
        let mut buf1 = vec![];
        train(corpus()).unwrap().write(&mut buf1).unwrap();
        let mut buf2 = vec![];
        train(corpus()).unwrap().write(&mut buf2).unwrap();
        assert_eq!(buf1, buf2);
    }
}
