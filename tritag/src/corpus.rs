//! Readers of tagged corpora.
//!
//! The corpus readers yield sentences that are already wrapped with two start markers and one
//! end marker, as expected by [`FrequencyCollector`](crate::FrequencyCollector) and
//! [`Evaluator`](crate::Evaluator). [`ConllSentenceReader`] keeps every column instead, so that
//! tagged sentences can be written back.

use std::collections::BTreeSet;
use std::io::{BufRead, Lines, Write};
use std::str::FromStr;

use crate::errors::{Result, TritagError};
use crate::utils;

/// Word and tag of the sentence start marker.
pub const START_TOKEN: &str = "<START>";

/// Word and tag of the sentence end marker.
pub const END_TOKEN: &str = "<END>";

/// A word with its tag.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TaggedToken {
    /// Surface form.
    pub word: String,

    /// Tag name.
    pub tag: String,
}

impl TaggedToken {
    /// Creates a new tagged token.
    pub fn new<S, T>(word: S, tag: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }

    /// Creates a sentence start marker.
    pub fn start() -> Self {
        Self::new(START_TOKEN, START_TOKEN)
    }

    /// Creates a sentence end marker.
    pub fn end() -> Self {
        Self::new(END_TOKEN, END_TOKEN)
    }
}

/// Wraps tagged tokens with two start markers and one end marker.
pub fn wrap_sentence<I>(tokens: I) -> Vec<TaggedToken>
where
    I: IntoIterator<Item = TaggedToken>,
{
    let mut sentence = vec![TaggedToken::start(), TaggedToken::start()];
    sentence.extend(tokens);
    sentence.push(TaggedToken::end());
    sentence
}

/// Reader of the Brown corpus format.
///
/// Each non-empty line is a sentence of whitespace-separated `word/tag` items. The item is split
/// at the last slash, so words may contain slashes.
pub struct BrownCorpusReader<R> {
    lines: Lines<R>,
    line_no: usize,
    decapitalize_first_word: bool,
}

impl<R> BrownCorpusReader<R>
where
    R: BufRead,
{
    /// Creates a new reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    /// * `decapitalize_first_word` - Lowercases the first character of each sentence.
    pub fn new(rdr: R, decapitalize_first_word: bool) -> Self {
        Self {
            lines: rdr.lines(),
            line_no: 0,
            decapitalize_first_word,
        }
    }
}

fn parse_brown_line(
    line: &str,
    line_no: usize,
    decapitalize_first_word: bool,
) -> Result<Vec<TaggedToken>> {
    let mut sentence = vec![TaggedToken::start(), TaggedToken::start()];
    for (i, item) in line.split_whitespace().enumerate() {
        let (word, tag) = item.rsplit_once('/').ok_or_else(|| {
            TritagError::invalid_corpus(line_no, format!("tag is missing in {item:?}"))
        })?;
        if word.is_empty() {
            return Err(TritagError::invalid_corpus(
                line_no,
                format!("zero-length word in {item:?}"),
            ));
        }
        if tag.is_empty() {
            return Err(TritagError::invalid_corpus(
                line_no,
                format!("zero-length tag in {item:?}"),
            ));
        }
        let word = if decapitalize_first_word && i == 0 {
            utils::decapitalize(word)
        } else {
            word.to_string()
        };
        sentence.push(TaggedToken::new(word, tag));
    }
    sentence.push(TaggedToken::end());
    Ok(sentence)
}

impl<R> Iterator for BrownCorpusReader<R>
where
    R: BufRead,
{
    type Item = Result<Vec<TaggedToken>>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(parse_brown_line(
                line,
                self.line_no,
                self.decapitalize_first_word,
            ));
        }
        None
    }
}

/// A sentence of the CoNLL tabular format with all of its columns.
///
/// The word is in the second column and the tag in the fifth.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConllSentence {
    rows: Vec<Vec<String>>,
}

impl ConllSentence {
    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gets the words.
    pub fn words(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row[1].as_str()).collect()
    }

    /// Gets the tags.
    pub fn tags(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row[4].as_str()).collect()
    }

    /// Replaces the tags, leaving the other columns untouched.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidArgument`] will be returned if the number of tags differs from the
    /// number of tokens.
    pub fn set_tags<S>(&mut self, tags: &[S]) -> Result<()>
    where
        S: AsRef<str>,
    {
        if tags.len() != self.rows.len() {
            return Err(TritagError::invalid_argument(
                "tags",
                format!("expected {} tags, got {}", self.rows.len(), tags.len()),
            ));
        }
        for (row, tag) in self.rows.iter_mut().zip(tags) {
            row[4] = tag.as_ref().to_string();
        }
        Ok(())
    }

    /// Writes the sentence as tab-separated lines followed by a blank line.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        for row in &self.rows {
            writeln!(wtr, "{}", row.join("\t"))?;
        }
        writeln!(wtr)?;
        Ok(())
    }
}

/// Reader of the CoNLL tabular format that keeps every column.
///
/// Each line is a token with at least five tab-separated columns. Sentences are separated by
/// blank lines.
///
/// # Examples
///
/// ```
/// use tritag::ConllSentenceReader;
///
/// let text = "1\tThe\tthe\tDT\t_\t_\n2\tdog\tdog\tNN\t_\t_\n";
/// let mut sentence = ConllSentenceReader::new(text.as_bytes()).next().unwrap().unwrap();
/// assert_eq!(vec!["The", "dog"], sentence.words());
///
/// sentence.set_tags(&["DT", "NN"]).unwrap();
/// let mut out = vec![];
/// sentence.write(&mut out).unwrap();
/// assert_eq!(
///     "1\tThe\tthe\tDT\tDT\t_\n2\tdog\tdog\tNN\tNN\t_\n\n",
///     String::from_utf8(out).unwrap(),
/// );
/// ```
pub struct ConllSentenceReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R> ConllSentenceReader<R>
where
    R: BufRead,
{
    /// Creates a new reader.
    pub fn new(rdr: R) -> Self {
        Self {
            lines: rdr.lines(),
            line_no: 0,
        }
    }
}

impl<R> Iterator for ConllSentenceReader<R>
where
    R: BufRead,
{
    type Item = Result<ConllSentence>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rows = vec![];
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let line = line.trim();
            if line.is_empty() {
                if rows.is_empty() {
                    continue;
                }
                return Some(Ok(ConllSentence { rows }));
            }
            let cols: Vec<String> = line.split('\t').map(str::to_string).collect();
            if cols.len() < 5 {
                return Some(Err(TritagError::invalid_corpus(
                    self.line_no,
                    format!("line has fewer than five columns: {line:?}"),
                )));
            }
            rows.push(cols);
        }
        if rows.is_empty() {
            None
        } else {
            Some(Ok(ConllSentence { rows }))
        }
    }
}

/// Reader of the CoNLL tabular format.
///
/// Each line is a token with tab-separated columns, the word in the second column and the tag in
/// the fifth. Sentences are separated by blank lines.
pub struct ConllCorpusReader<R> {
    inner: ConllSentenceReader<R>,
    decapitalize_first_word: bool,
}

impl<R> ConllCorpusReader<R>
where
    R: BufRead,
{
    /// Creates a new reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    /// * `decapitalize_first_word` - Lowercases the first character of each sentence.
    pub fn new(rdr: R, decapitalize_first_word: bool) -> Self {
        Self {
            inner: ConllSentenceReader::new(rdr),
            decapitalize_first_word,
        }
    }
}

impl<R> Iterator for ConllCorpusReader<R>
where
    R: BufRead,
{
    type Item = Result<Vec<TaggedToken>>;

    fn next(&mut self) -> Option<Self::Item> {
        let sentence = match self.inner.next()? {
            Ok(sentence) => sentence,
            Err(e) => return Some(Err(e)),
        };
        let tokens = sentence.rows.into_iter().enumerate().map(|(i, mut row)| {
            let tag = std::mem::take(&mut row[4]);
            let word = if self.decapitalize_first_word && i == 0 {
                utils::decapitalize(&row[1])
            } else {
                std::mem::take(&mut row[1])
            };
            TaggedToken::new(word, tag)
        });
        Some(Ok(wrap_sentence(tokens)))
    }
}

/// Corpus format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CorpusFormat {
    /// `word/tag` items, one sentence per line.
    Brown,

    /// Tab-separated columns, one token per line.
    Conll,
}

impl FromStr for CorpusFormat {
    type Err = &'static str;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "brown" => Ok(Self::Brown),
            "conll" => Ok(Self::Conll),
            _ => Err("Could not parse a corpus format"),
        }
    }
}

/// Creates a boxed sentence iterator for the given format.
///
/// # Examples
///
/// ```
/// use tritag::{corpus_reader, CorpusFormat};
///
/// let text = "The/AT dog/NN barks/VBZ\n";
/// let sentences: Vec<_> = corpus_reader(CorpusFormat::Brown, text.as_bytes(), true)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(1, sentences.len());
/// assert_eq!("the", sentences[0][2].word);
/// ```
pub fn corpus_reader<'a, R>(
    format: CorpusFormat,
    rdr: R,
    decapitalize_first_word: bool,
) -> Box<dyn Iterator<Item = Result<Vec<TaggedToken>>> + 'a>
where
    R: BufRead + 'a,
{
    match format {
        CorpusFormat::Brown => Box::new(BrownCorpusReader::new(rdr, decapitalize_first_word)),
        CorpusFormat::Conll => Box::new(ConllCorpusReader::new(rdr, decapitalize_first_word)),
    }
}

/// Keeps only the sentences that belong to the given folds.
///
/// The n-th sentence belongs to fold `n % n_folds`.
pub struct FoldFilter<I> {
    inner: I,
    n_folds: usize,
    folds: BTreeSet<usize>,
    count: usize,
}

impl<I> FoldFilter<I> {
    /// Creates a new filter.
    ///
    /// # Arguments
    ///
    /// * `inner` - A sentence iterator.
    /// * `n_folds` - The number of folds.
    /// * `folds` - Folds to keep.
    ///
    /// # Errors
    ///
    /// [`TritagError::InvalidArgument`] will be returned if `n_folds` is zero.
    pub fn new<F>(inner: I, n_folds: usize, folds: F) -> Result<Self>
    where
        F: IntoIterator<Item = usize>,
    {
        if n_folds == 0 {
            return Err(TritagError::invalid_argument(
                "n_folds",
                "must be at least 1",
            ));
        }
        Ok(Self {
            inner,
            n_folds,
            folds: folds.into_iter().collect(),
            count: 0,
        })
    }
}

impl<I> Iterator for FoldFilter<I>
where
    I: Iterator<Item = Result<Vec<TaggedToken>>>,
{
    type Item = Result<Vec<TaggedToken>>;

    fn next(&mut self) -> Option<Self::Item> {
        for sentence in self.inner.by_ref() {
            if sentence.is_err() {
                return Some(sentence);
            }
            let fold = self.count;
            self.count = (self.count + 1) % self.n_folds;
            if self.folds.contains(&fold) {
                return Some(sentence);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(sentence: &[TaggedToken]) -> Vec<&str> {
        sentence.iter().map(|t| t.word.as_str()).collect()
    }

    fn tags(sentence: &[TaggedToken]) -> Vec<&str> {
        sentence.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_brown_reader() {
        let text = "The/AT dog/NN barks/VBZ\n\n  A/a/AT cat/NN  \n";
        let sentences: Vec<_> = BrownCorpusReader::new(text.as_bytes(), false)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(2, sentences.len());
        assert_eq!(
            vec!["<START>", "<START>", "The", "dog", "barks", "<END>"],
            words(&sentences[0])
        );
        assert_eq!(
            vec!["<START>", "<START>", "AT", "NN", "VBZ", "<END>"],
            tags(&sentences[0])
        );
        assert_eq!(
            vec!["<START>", "<START>", "A/a", "cat", "<END>"],
            words(&sentences[1])
        );
    }

    #[test]
    fn test_brown_reader_decapitalize() {
        let text = "A/a/AT Cat/NN\n";
        let sentences: Vec<_> = BrownCorpusReader::new(text.as_bytes(), true)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            vec!["<START>", "<START>", "a/a", "Cat", "<END>"],
            words(&sentences[0])
        );
    }

    #[test]
    fn test_brown_reader_missing_tag() {
        let mut reader = BrownCorpusReader::new("the/AT dog\n".as_bytes(), false);
        assert!(matches!(
            reader.next(),
            Some(Err(TritagError::InvalidCorpus(_)))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_brown_reader_empty_word_and_tag() {
        let mut reader = BrownCorpusReader::new("/AT\nthe/\n".as_bytes(), false);
        match reader.next() {
            Some(Err(TritagError::InvalidCorpus(e))) => assert_eq!(1, e.line),
            _ => panic!("expected a corpus error"),
        }
        match reader.next() {
            Some(Err(TritagError::InvalidCorpus(e))) => assert_eq!(2, e.line),
            _ => panic!("expected a corpus error"),
        }
    }

    #[test]
    fn test_conll_reader() {
        let text = "1\tThe\tthe\tDT\tDT\t_\n\
                    2\tdog\tdog\tNN\tNN\t_\n\
                    \n\
                    \n\
                    1\tBarks\tbark\tVBZ\tVBZ\t_\n";
        let sentences: Vec<_> = ConllCorpusReader::new(text.as_bytes(), true)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(2, sentences.len());
        assert_eq!(
            vec!["<START>", "<START>", "the", "dog", "<END>"],
            words(&sentences[0])
        );
        assert_eq!(
            vec!["<START>", "<START>", "DT", "NN", "<END>"],
            tags(&sentences[0])
        );
        assert_eq!(
            vec!["<START>", "<START>", "barks", "<END>"],
            words(&sentences[1])
        );
    }

    #[test]
    fn test_conll_reader_too_few_columns() {
        let text = "1\tThe\tthe\tDT\n";
        let mut reader = ConllCorpusReader::new(text.as_bytes(), false);
        assert!(matches!(
            reader.next(),
            Some(Err(TritagError::InvalidCorpus(_)))
        ));
    }

    #[test]
    fn test_conll_sentence_reader() {
        let text = "1\tThe\tthe\tDT\t_\t_\t2\tdet\t_\t_\n\
                    2\tdog\tdog\tNN\t_\t_\t0\tROOT\t_\t_\n\
                    \n\
                    1\tBarks\tbark\tVBZ\tVBZ\n";
        let sentences: Vec<_> = ConllSentenceReader::new(text.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(2, sentences.len());
        assert_eq!(2, sentences[0].len());
        assert_eq!(vec!["The", "dog"], sentences[0].words());
        assert_eq!(vec!["_", "_"], sentences[0].tags());
        assert_eq!(vec!["Barks"], sentences[1].words());
        assert_eq!(vec!["VBZ"], sentences[1].tags());
    }

    #[test]
    fn test_conll_sentence_set_tags_and_write() {
        let text = "1\tThe\tthe\tDT\t_\t_\t2\tdet\t_\t_\n\
                    2\tdog\tdog\tNN\t_\t_\t0\tROOT\t_\t_\n";
        let mut sentence = ConllSentenceReader::new(text.as_bytes())
            .next()
            .unwrap()
            .unwrap();
        assert!(matches!(
            sentence.set_tags(&["DT"]),
            Err(TritagError::InvalidArgument(_))
        ));
        sentence.set_tags(&["DT", "NN"]).unwrap();
        let mut out = vec![];
        sentence.write(&mut out).unwrap();
        assert_eq!(
            "1\tThe\tthe\tDT\tDT\t_\t2\tdet\t_\t_\n\
             2\tdog\tdog\tNN\tNN\t_\t0\tROOT\t_\t_\n\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn test_conll_sentence_reader_too_few_columns() {
        let text = "1\tThe\tthe\tDT\t_\n2\tdog\n\n1\ta\ta\tDT\t_\n";
        let mut reader = ConllSentenceReader::new(text.as_bytes());
        match reader.next() {
            Some(Err(TritagError::InvalidCorpus(e))) => assert_eq!(2, e.line),
            _ => panic!("expected a corpus error"),
        }
        let sentence = reader.next().unwrap().unwrap();
        assert_eq!(vec!["a"], sentence.words());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_corpus_format_from_str() {
        assert_eq!(Ok(CorpusFormat::Brown), "brown".parse::<CorpusFormat>());
        assert_eq!(Ok(CorpusFormat::Conll), "conll".parse::<CorpusFormat>());
        assert!("xml".parse::<CorpusFormat>().is_err());
    }

    #[test]
    fn test_fold_filter() {
        let text = "a/X\nb/X\nc/X\nd/X\ne/X\n";
        let reader = BrownCorpusReader::new(text.as_bytes(), false);
        let sentences: Vec<_> = FoldFilter::new(reader, 3, [0, 2])
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let firsts: Vec<&str> = sentences.iter().map(|s| s[2].word.as_str()).collect();
        assert_eq!(vec!["a", "c", "d"], firsts);
    }

    #[test]
    fn test_fold_filter_zero_folds() {
        let reader = BrownCorpusReader::new("".as_bytes(), false);
        assert!(matches!(
            FoldFilter::new(reader, 0, [0]),
            Err(TritagError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fold_filter_passes_errors() {
        let text = "a/X\nb\nc/X\n";
        let reader = BrownCorpusReader::new(text.as_bytes(), false);
        let mut filter = FoldFilter::new(reader, 2, [1]).unwrap();
        assert!(matches!(
            filter.next(),
            Some(Err(TritagError::InvalidCorpus(_)))
        ));
        let sentence = filter.next().unwrap().unwrap();
        assert_eq!("c", sentence[2].word);
        assert!(filter.next().is_none());
    }
}
