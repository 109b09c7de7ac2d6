use crate::corpus::{END_TOKEN, START_TOKEN};
use crate::errors::{Result, TritagError};
use crate::language_model::{LanguageModel, LinearInterpolationLm};
use crate::model::Model;
use crate::ngram::{TagId, TriGram};
use crate::word_handler::{KnownWordHandler, SuffixConfig, SuffixWordHandler, WordHandler};

/// Settings of the tagger.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggerConfig {
    /// Settings of the unknown word estimator.
    pub suffix: SuffixConfig,

    /// Hypotheses whose log-probability is lower than the best one in the same column by more
    /// than this value are not extended.
    pub beam_factor: f64,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            suffix: SuffixConfig::default(),
            beam_factor: 1000.0,
        }
    }
}

impl TaggerConfig {
    /// Sets the beam from a plain probability ratio.
    ///
    /// Hypotheses that are less probable than the best one divided by `ratio` are pruned.
    pub fn beam_ratio(mut self, ratio: f64) -> Self {
        self.beam_factor = ratio.ln();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.beam_factor.is_nan() || self.beam_factor < 0.0 {
            return Err(TritagError::invalid_argument(
                "beam_factor",
                format!("must be a non-negative number, got {}", self.beam_factor),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct TrellisEntry {
    // Index of the preceding state in the previous column.
    prev: usize,
    log_prob: f64,
    // Index of the best state two columns back.
    back: Option<usize>,
}

#[derive(Clone, Debug)]
struct TrellisState {
    tag: TagId,
    entries: Vec<TrellisEntry>,
}

/// Hypotheses of a sentence built by the Viterbi algorithm.
///
/// Column `i` holds the hypotheses for the `i`-th token of the sentence wrapped with two start
/// markers and one end marker.
#[derive(Clone, Debug)]
pub struct Trellis {
    columns: Vec<Vec<TrellisState>>,
}

impl Trellis {
    /// Gets the number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Gets the number of hypotheses in each column.
    pub fn n_hypotheses(&self) -> Vec<usize> {
        self.columns
            .iter()
            .map(|column| column.iter().map(|state| state.entries.len()).sum())
            .collect()
    }

    /// Returns the most probable tag sequence, including the markers, and its log-probability.
    ///
    /// Returns [`None`] if the last column is empty.
    pub fn best_path(&self) -> Option<(Vec<TagId>, f64)> {
        let last_col = self.columns.len().checked_sub(1)?;
        let mut best: Option<(usize, TrellisEntry)> = None;
        for (state_idx, state) in self.columns[last_col].iter().enumerate() {
            for entry in &state.entries {
                if best.map_or(true, |(_, e)| entry.log_prob > e.log_prob) {
                    best = Some((state_idx, *entry));
                }
            }
        }
        let (mut state_idx, entry) = best?;

        let mut tags = Vec::with_capacity(self.columns.len());
        let mut col = last_col;
        let mut key = Some(entry.prev);
        loop {
            let state = &self.columns[col][state_idx];
            tags.push(state.tag);
            let Some(prev) = key else {
                break;
            };
            key = state
                .entries
                .iter()
                .find(|e| e.prev == prev)
                .and_then(|e| e.back);
            col -= 1;
            state_idx = prev;
        }
        tags.reverse();
        Some((tags, entry.log_prob))
    }
}

/// Tags and log-probability of a tagged sentence.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedSequence {
    tags: Vec<String>,
    log_prob: f64,
}

impl TaggedSequence {
    /// Gets the tags, one per token.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Gets the log-probability of the whole sequence, including the markers.
    pub const fn log_prob(&self) -> f64 {
        self.log_prob
    }

    /// Consumes the sequence and returns the tags.
    pub fn into_tags(self) -> Vec<String> {
        self.tags
    }
}

/// Trigram HMM tagger.
///
/// The tagger only holds read-only tables, so it can be shared between threads.
///
/// # Examples
///
/// ```
/// use tritag::{train, wrap_sentence, TaggedToken, Tagger, TaggerConfig};
///
/// let corpus = [
///     [("the", "DT"), ("dog", "NN"), ("barks", "VBZ")],
///     [("a", "DT"), ("cat", "NN"), ("meows", "VBZ")],
/// ]
/// .map(|s| Ok(wrap_sentence(s.map(|(w, t)| TaggedToken::new(w, t)))));
/// let model = train(corpus).unwrap();
///
/// let tagger = Tagger::new(&model, &TaggerConfig::default()).unwrap();
/// let tagged = tagger.tag(&["the", "cat", "barks"]).unwrap();
/// assert_eq!(&["DT", "NN", "VBZ"], tagged.tags());
/// ```
pub struct Tagger {
    tag_names: Vec<String>,
    start_tag: TagId,
    language_model: LinearInterpolationLm,
    word_handler: WordHandler,
    beam_factor: f64,
}

impl Tagger {
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `model` - A model data.
    /// * `config` - Settings.
    ///
    /// # Returns
    ///
    /// A new tagger.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidArgument`] will be returned if the beam factor is negative or NaN.
    /// [`TritagError::InvalidModel`] will be returned if the model has no start marker tag.
    pub fn new(model: &Model, config: &TaggerConfig) -> Result<Self> {
        config.validate()?;
        let start_tag = model
            .tag_id(START_TOKEN)
            .ok_or_else(|| TritagError::invalid_model("the start marker tag is undefined"))?;
        let tag_names = (0..model.n_tags() as TagId)
            .map(|tag| model.base_tag_name(tag).unwrap_or_default().to_string())
            .collect();
        let suffix_handler = SuffixWordHandler::new(model, &config.suffix)?;
        let word_handler = WordHandler::Known(KnownWordHandler::new(
            model,
            Some(WordHandler::Suffix(suffix_handler)),
        ));
        Ok(Self {
            tag_names,
            start_tag,
            language_model: LinearInterpolationLm::from_model(model),
            word_handler,
            beam_factor: config.beam_factor,
        })
    }

    /// Gets the word handler.
    pub const fn word_handler(&self) -> &WordHandler {
        &self.word_handler
    }

    /// Gets the language model.
    pub const fn language_model(&self) -> &LinearInterpolationLm {
        &self.language_model
    }

    /// Builds the trellis of a sentence.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Tokens of a sentence without markers.
    ///
    /// # Errors
    ///
    /// [`TritagError::Untaggable`] will be returned if a token has no candidate tags or every
    /// hypothesis is pruned. [`TritagError::UnknownTag`] will be returned if the model is
    /// inconsistent.
    pub fn viterbi<S>(&self, tokens: &[S]) -> Result<Trellis>
    where
        S: AsRef<str>,
    {
        let words = tokens
            .iter()
            .map(|token| token.as_ref())
            .chain(std::iter::once(END_TOKEN));

        let mut columns = Vec::with_capacity(tokens.len() + 3);
        columns.push(vec![TrellisState {
            tag: self.start_tag,
            entries: vec![],
        }]);
        columns.push(vec![TrellisState {
            tag: self.start_tag,
            entries: vec![TrellisEntry {
                prev: 0,
                log_prob: 0.0,
                back: None,
            }],
        }]);

        let mut beam = f64::NEG_INFINITY;
        for (position, word) in words.enumerate() {
            let candidates = self.word_handler.tag_probs(word);
            if candidates.is_empty() {
                return Err(TritagError::untaggable(position, word));
            }
            let t1_column = &columns[columns.len() - 2];
            let t2_column = &columns[columns.len() - 1];

            let mut column = Vec::with_capacity(candidates.len());
            let mut column_max = f64::NEG_INFINITY;
            for (tag, emission) in candidates {
                let mut entries = vec![];
                for (t2_idx, t2) in t2_column.iter().enumerate() {
                    let mut best: Option<(f64, usize)> = None;
                    for t1_entry in &t2.entries {
                        if t1_entry.log_prob < beam {
                            continue;
                        }
                        let t1 = &t1_column[t1_entry.prev];
                        let trigram = TriGram(t1.tag, t2.tag, tag);
                        let log_prob = self.language_model.trigram_log_prob(trigram)?
                            + emission
                            + t1_entry.log_prob;
                        if best.map_or(true, |(p, _)| log_prob > p) {
                            best = Some((log_prob, t1_entry.prev));
                        }
                    }
                    if let Some((log_prob, t1_idx)) = best {
                        entries.push(TrellisEntry {
                            prev: t2_idx,
                            log_prob,
                            back: Some(t1_idx),
                        });
                        if log_prob > column_max {
                            column_max = log_prob;
                        }
                    }
                }
                if !entries.is_empty() {
                    column.push(TrellisState { tag, entries });
                }
            }
            if column.is_empty() {
                return Err(TritagError::untaggable(position, word));
            }
            columns.push(column);
            beam = column_max - self.beam_factor;
        }

        Ok(Trellis { columns })
    }

    /// Tags a sentence.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Tokens of a sentence without markers.
    ///
    /// # Returns
    ///
    /// One tag per token and the log-probability of the sequence.
    ///
    /// # Errors
    ///
    /// See [`Tagger::viterbi()`].
    pub fn tag<S>(&self, tokens: &[S]) -> Result<TaggedSequence>
    where
        S: AsRef<str>,
    {
        let trellis = self.viterbi(tokens)?;
        let (path, log_prob) = trellis
            .best_path()
            .ok_or_else(|| TritagError::untaggable(tokens.len(), END_TOKEN))?;
        let tags = path[2..path.len() - 1]
            .iter()
            .map(|&tag| self.tag_names[tag as usize].clone())
            .collect();
        Ok(TaggedSequence { tags, log_prob })
    }
}
