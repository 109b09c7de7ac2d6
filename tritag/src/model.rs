use std::collections::BTreeMap;
use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, TritagError};
use crate::ngram::{BiGram, TagId, TriGram, UniGram};

/// Prefix of tags assigned to capitalized tokens.
pub const CAPITALIZED_PREFIX: &str = "c-";

/// Prefix of tags assigned to non-capitalized tokens.
pub const NOT_CAPITALIZED_PREFIX: &str = "n-";

/// Tag frequencies of a single word.
pub type TagFreqs = BTreeMap<TagId, u32>;

/// Model data.
///
/// The model holds raw frequencies only. Smoothed probabilities are computed once when a
/// [`Tagger`](crate::Tagger) is constructed.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub struct Model {
    pub(crate) tags: Vec<String>,

    // Ordered maps keep the encoded model deterministic.
    pub(crate) lexicon: BTreeMap<String, TagFreqs>,
    pub(crate) unigrams: BTreeMap<UniGram, u32>,
    pub(crate) bigrams: BTreeMap<BiGram, u32>,
    pub(crate) trigrams: BTreeMap<TriGram, u32>,

    pub(crate) capitalization: bool,
}

impl Model {
    pub(crate) fn new(
        tags: Vec<String>,
        lexicon: BTreeMap<String, TagFreqs>,
        unigrams: BTreeMap<UniGram, u32>,
        bigrams: BTreeMap<BiGram, u32>,
        trigrams: BTreeMap<TriGram, u32>,
        capitalization: bool,
    ) -> Result<Self> {
        let model = Self {
            tags,
            lexicon,
            unigrams,
            bigrams,
            trigrams,
            capitalization,
        };
        model.validate()?;
        Ok(model)
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is.
    /// [`TritagError::InvalidModel`] will be returned if the tables refer to undefined tags.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n_tags = self.tags.len();
        let check = |tag: TagId| {
            if (tag as usize) < n_tags {
                Ok(())
            } else {
                Err(TritagError::invalid_model(format!(
                    "tag id {tag} is out of range (# of tags: {n_tags})"
                )))
            }
        };
        for (i, name) in self.tags.iter().enumerate() {
            if self.tags[..i].contains(name) {
                return Err(TritagError::invalid_model(format!(
                    "tag {name:?} is defined twice"
                )));
            }
        }
        for (word, tag_freqs) in &self.lexicon {
            for &tag in tag_freqs.keys() {
                check(tag)?;
                if self.unigrams.get(&UniGram(tag)).map_or(true, |&f| f == 0) {
                    return Err(TritagError::invalid_model(format!(
                        "word {word:?} has tag id {tag} that has no unigram frequency"
                    )));
                }
            }
        }
        for UniGram(t) in self.unigrams.keys() {
            check(*t)?;
        }
        for BiGram(t1, t2) in self.bigrams.keys() {
            check(*t1)?;
            check(*t2)?;
        }
        for TriGram(t1, t2, t3) in self.trigrams.keys() {
            check(*t1)?;
            check(*t2)?;
            check(*t3)?;
        }
        Ok(())
    }

    /// Gets the number of tags.
    pub fn n_tags(&self) -> usize {
        self.tags.len()
    }

    /// Gets the tag names indexed by tag id.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Gets the name of a tag as it was recorded during training.
    pub fn tag_name(&self, tag: TagId) -> Option<&str> {
        self.tags.get(tag as usize).map(String::as_str)
    }

    /// Gets the name of a tag with the capitalization marker removed.
    pub fn base_tag_name(&self, tag: TagId) -> Option<&str> {
        let name = self.tag_name(tag)?;
        if !self.capitalization {
            return Some(name);
        }
        Some(
            name.strip_prefix(CAPITALIZED_PREFIX)
                .or_else(|| name.strip_prefix(NOT_CAPITALIZED_PREFIX))
                .unwrap_or(name),
        )
    }

    /// Gets the id of a tag name.
    pub fn tag_id(&self, name: &str) -> Option<TagId> {
        self.tags
            .iter()
            .position(|t| t == name)
            .map(|id| id as TagId)
    }

    /// Returns `true` if tags were split by capitalization during training.
    pub const fn capitalization(&self) -> bool {
        self.capitalization
    }

    /// Gets the lexicon, mapping each word to the frequencies of its tags.
    pub fn lexicon(&self) -> &BTreeMap<String, TagFreqs> {
        &self.lexicon
    }

    /// Gets the unigram frequencies.
    pub fn unigrams(&self) -> &BTreeMap<UniGram, u32> {
        &self.unigrams
    }

    /// Gets the bigram frequencies.
    pub fn bigrams(&self) -> &BTreeMap<BiGram, u32> {
        &self.bigrams
    }

    /// Gets the trigram frequencies.
    pub fn trigrams(&self) -> &BTreeMap<TriGram, u32> {
        &self.trigrams
    }

    /// Gets the sum of all unigram frequencies.
    pub fn corpus_size(&self) -> u64 {
        self.unigrams.values().map(|&f| u64::from(f)).sum()
    }

    /// Returns `true` if the word or its lowercase form appears in the lexicon.
    pub fn is_known(&self, word: &str) -> bool {
        self.lexicon.contains_key(word) || self.lexicon.contains_key(&word.to_lowercase())
    }

    /// Replaces the lexicon.
    ///
    /// # Arguments
    ///
    /// * `lexicon` - Tuples of words, tag names, and frequencies.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidModel`] will be returned if a tag name is not defined in the model.
    pub fn replace_lexicon<I, S, T>(&mut self, lexicon: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, T, u32)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let mut new_lexicon: BTreeMap<String, TagFreqs> = BTreeMap::new();
        for (word, tag, freq) in lexicon {
            let tag_name = tag.as_ref();
            let tag = self.tag_id(tag_name).ok_or_else(|| {
                TritagError::invalid_model(format!("undefined tag: {tag_name}"))
            })?;
            *new_lexicon
                .entry(word.into())
                .or_default()
                .entry(tag)
                .or_insert(0) += freq;
        }
        let old_lexicon = std::mem::replace(&mut self.lexicon, new_lexicon);
        if let Err(e) = self.validate() {
            self.lexicon = old_lexicon;
            return Err(e);
        }
        Ok(())
    }
}
