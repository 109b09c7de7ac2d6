#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Tritag
//!
//! Tritag is a part-of-speech tagger based on a trigram hidden Markov model.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, stdin, BufReader};
//!
//! use tritag::{Model, Tagger, TaggerConfig};
//!
//! let mut f = BufReader::new(File::open("model.bin").unwrap());
//! let model = Model::read(&mut f).unwrap();
//! let tagger = Tagger::new(&model, &TaggerConfig::default()).unwrap();
//!
//! for line in stdin().lock().lines() {
//!     let line = line.unwrap();
//!     let tokens: Vec<&str> = line.split_whitespace().collect();
//!     let tagged = tagger.tag(&tokens).unwrap();
//!     println!("{}", tagged.tags().join(" "));
//! }
//! ```
//!
//! Models are trained from tagged corpora with [`train()`] or [`FrequencyCollector`]. Reading
//! and writing the plain-text model format requires **crate feature** `text-model`.

mod utils;

mod collector;
mod corpus;
mod evaluator;
mod language_model;
mod model;
mod ngram;
mod tagger;
mod word_handler;

#[cfg(feature = "text-model")]
mod text_model;

pub mod errors;

pub use collector::{train, FrequencyCollector};
pub use corpus::{
    corpus_reader, wrap_sentence, BrownCorpusReader, ConllCorpusReader, ConllSentence,
    ConllSentenceReader, CorpusFormat, FoldFilter, TaggedToken, END_TOKEN, START_TOKEN,
};
pub use evaluator::Evaluator;
pub use language_model::{LanguageModel, LinearInterpolationLm};
pub use model::{Model, TagFreqs, CAPITALIZED_PREFIX, NOT_CAPITALIZED_PREFIX};
pub use ngram::{BiGram, TagId, TriGram, UniGram};
pub use tagger::{TaggedSequence, Tagger, TaggerConfig, Trellis};
pub use word_handler::{
    KnownWordHandler, SuffixConfig, SuffixWordHandler, TagProbs, WordClass, WordHandler,
};
