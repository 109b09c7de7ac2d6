use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::errors::{Result, TritagError};
use crate::model::{Model, TagFreqs, CAPITALIZED_PREFIX, NOT_CAPITALIZED_PREFIX};
use crate::ngram::{BiGram, TagId, TriGram, UniGram};

fn lookup(tag_ids: &BTreeMap<String, TagId>, name: &str, line_no: usize) -> Result<TagId> {
    tag_ids.get(name).copied().ok_or_else(|| {
        TritagError::invalid_model(format!(
            "line {line_no}: tag {name:?} is not declared as a unigram"
        ))
    })
}

impl Model {
    /// Creates a model from the plain-text lexicon and n-gram files.
    ///
    /// The n-gram file holds one entry per line: `tag freq` for unigrams, `t1 t2 freq` for
    /// bigrams, and `t1 t2 t3 freq` for trigrams. Tag ids are assigned in the order of the
    /// unigram lines, and entries of different orders may be mixed freely. Each line of the
    /// lexicon file holds a word followed by pairs of a tag and its frequency:
    ///
    /// ```text
    /// advised VBN 13 VBD 11
    /// ```
    ///
    /// Tags are treated as split by capitalization if every tag other than the sentence markers
    /// carries a capitalization prefix.
    ///
    /// # Arguments
    ///
    /// * `lexicon_rdr` - A data source of the lexicon.
    /// * `ngram_rdr` - A data source of the n-gram frequencies.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidModel`] will be returned if a line is malformed or refers to an
    /// undeclared tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::Model;
    ///
    /// let ngrams = "<START> 2\nDT 1\n<END> 1\n<START> <START> 1\n<START> DT 1\nDT <END> 1\n";
    /// let lexicon = "the DT 1\n";
    /// let model = Model::read_text(lexicon.as_bytes(), ngrams.as_bytes()).unwrap();
    /// assert_eq!(Some(1), model.tag_id("DT"));
    /// assert!(model.is_known("The"));
    /// ```
    pub fn read_text<L, N>(lexicon_rdr: L, ngram_rdr: N) -> Result<Self>
    where
        L: BufRead,
        N: BufRead,
    {
        let mut lines = vec![];
        for line in ngram_rdr.lines() {
            lines.push(line?);
        }

        let mut tags = vec![];
        let mut tag_ids = BTreeMap::new();
        let mut unigrams = BTreeMap::new();
        for (i, line) in lines.iter().enumerate() {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if let [name, freq] = cols[..] {
                let tag = tags.len() as TagId;
                if tag_ids.insert(name.to_string(), tag).is_some() {
                    return Err(TritagError::invalid_model(format!(
                        "line {}: unigram {name:?} is declared twice",
                        i + 1
                    )));
                }
                tags.push(name.to_string());
                unigrams.insert(UniGram(tag), freq.parse::<u32>()?);
            }
        }

        let mut bigrams = BTreeMap::new();
        let mut trigrams = BTreeMap::new();
        for (i, line) in lines.iter().enumerate() {
            let line_no = i + 1;
            let cols: Vec<&str> = line.split_whitespace().collect();
            match cols[..] {
                [] | [_, _] => {}
                [t1, t2, freq] => {
                    let bigram = BiGram(
                        lookup(&tag_ids, t1, line_no)?,
                        lookup(&tag_ids, t2, line_no)?,
                    );
                    bigrams.insert(bigram, freq.parse::<u32>()?);
                }
                [t1, t2, t3, freq] => {
                    let trigram = TriGram(
                        lookup(&tag_ids, t1, line_no)?,
                        lookup(&tag_ids, t2, line_no)?,
                        lookup(&tag_ids, t3, line_no)?,
                    );
                    trigrams.insert(trigram, freq.parse::<u32>()?);
                }
                _ => {
                    return Err(TritagError::invalid_model(format!(
                        "line {line_no}: an n-gram entry must have 2 to 4 columns"
                    )));
                }
            }
        }

        let mut lexicon = BTreeMap::new();
        for (i, line) in lexicon_rdr.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let mut cols = line.split_whitespace();
            let Some(word) = cols.next() else {
                continue;
            };
            let cols: Vec<&str> = cols.collect();
            if cols.is_empty() || cols.len() % 2 != 0 {
                return Err(TritagError::invalid_model(format!(
                    "line {line_no}: a lexicon entry must have pairs of a tag and its frequency"
                )));
            }
            let mut tag_freqs = TagFreqs::new();
            for pair in cols.chunks_exact(2) {
                let tag = lookup(&tag_ids, pair[0], line_no)?;
                *tag_freqs.entry(tag).or_insert(0) += pair[1].parse::<u32>()?;
            }
            lexicon.insert(word.to_string(), tag_freqs);
        }

        let mut has_prefix = false;
        let mut all_prefixed = true;
        for name in &tags {
            if name.starts_with(CAPITALIZED_PREFIX) || name.starts_with(NOT_CAPITALIZED_PREFIX) {
                has_prefix = true;
            } else if !name.starts_with('<') {
                all_prefixed = false;
            }
        }
        let capitalization = has_prefix && all_prefixed;
        log::debug!("capitalization: {capitalization}");

        Self::new(tags, lexicon, unigrams, bigrams, trigrams, capitalization)
    }

    /// Exports the model as plain-text lexicon and n-gram files.
    ///
    /// See [`Model::read_text()`] for the format.
    ///
    /// # Arguments
    ///
    /// * `lexicon_wtr` - Byte-oriented sink object of the lexicon.
    /// * `ngram_wtr` - Byte-oriented sink object of the n-gram frequencies.
    ///
    /// # Errors
    ///
    /// When a writer generates an error, it will be returned as is.
    pub fn write_text<L, N>(&self, mut lexicon_wtr: L, mut ngram_wtr: N) -> Result<()>
    where
        L: Write,
        N: Write,
    {
        let name = |tag: TagId| self.tags[tag as usize].as_str();
        for (tag, tag_name) in self.tags.iter().enumerate() {
            let freq = self
                .unigrams
                .get(&UniGram(tag as TagId))
                .copied()
                .unwrap_or(0);
            writeln!(ngram_wtr, "{tag_name} {freq}")?;
        }
        for (&BiGram(t1, t2), freq) in &self.bigrams {
            writeln!(ngram_wtr, "{} {} {freq}", name(t1), name(t2))?;
        }
        for (&TriGram(t1, t2, t3), freq) in &self.trigrams {
            writeln!(ngram_wtr, "{} {} {} {freq}", name(t1), name(t2), name(t3))?;
        }
        for (word, tag_freqs) in &self.lexicon {
            write!(lexicon_wtr, "{word}")?;
            for (&tag, freq) in tag_freqs {
                write!(lexicon_wtr, " {} {freq}", name(tag))?;
            }
            writeln!(lexicon_wtr)?;
        }
        Ok(())
    }
}
