use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use clap::Parser;
use rayon::prelude::*;
use tritag::errors::Result;
use tritag::{ConllSentence, ConllSentenceReader, Model, SuffixConfig, Tagger, TaggerConfig};

#[derive(Clone, Copy, Debug)]
enum InputFormat {
    Text,
    Conll,
}

impl FromStr for InputFormat {
    type Err = &'static str;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "text" => Ok(Self::Text),
            "conll" => Ok(Self::Conll),
            _ => Err("Could not parse an input format"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// The format of the input: {text, conll}. Text is one whitespace-tokenized sentence per
    /// line. CoNLL is written back with the tags in the fifth column.
    #[arg(long, default_value = "text")]
    format: InputFormat,

    /// Print each token followed by a slash and its tag instead of the tags only (text input).
    #[arg(long)]
    with_words: bool,

    /// Hypotheses less probable than the best one divided by this ratio are pruned
    #[arg(long, default_value = "1000")]
    beam_ratio: f64,

    /// The maximum suffix length used for unknown words
    #[arg(long, default_value = "2")]
    max_suffix_len: usize,

    /// Capitalized words with a frequency up to this value are used for unknown words
    #[arg(long, default_value = "2")]
    upper_max_freq: u32,

    /// Lowercase words with a frequency up to this value are used for unknown words
    #[arg(long, default_value = "8")]
    lower_max_freq: u32,

    /// Hyphenated words with a frequency up to this value are used for unknown words
    #[arg(long, default_value = "8")]
    hyphen_max_freq: u32,

    /// Numbers with a frequency up to this value are used for unknown words
    #[arg(long, default_value = "4")]
    cardinal_max_freq: u32,

    /// The maximum number of candidate tags for an unknown word
    #[arg(long, default_value = "10")]
    max_tags: usize,

    /// Number of threads (0 means the input is tagged sequentially)
    #[arg(long, default_value = "0")]
    n_threads: usize,

    /// Chunk size of each thread
    #[arg(long, default_value = "100")]
    mt_chunk_size: usize,
}

fn tag_line(tagger: &Tagger, line: &str, with_words: bool) -> Result<Vec<u8>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let tagged = match tagger.tag(&tokens) {
        Ok(tagged) => tagged,
        Err(e) if e.is_untaggable() => {
            log::warn!("{e}");
            return Ok(b"\n".to_vec());
        }
        Err(e) => return Err(e),
    };
    let mut result = if with_words {
        tokens
            .iter()
            .zip(tagged.tags())
            .map(|(token, tag)| format!("{token}/{tag}"))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        tagged.tags().join(" ")
    };
    result.push('\n');
    Ok(result.into_bytes())
}

fn tag_conll(tagger: &Tagger, sentence: &ConllSentence) -> Result<Vec<u8>> {
    let mut sentence = sentence.clone();
    let tagged = tagger.tag(&sentence.words());
    match tagged {
        Ok(tagged) => sentence.set_tags(tagged.tags())?,
        Err(e) if e.is_untaggable() => log::warn!("{e}"),
        Err(e) => return Err(e),
    }
    let mut buf = vec![];
    sentence.write(&mut buf)?;
    Ok(buf)
}

/// Tags the items one by one, or chunk by chunk on a thread pool, and writes the results in
/// the input order. Returns the number of tokens.
fn tag_all<I, T, W, F, C>(
    items: I,
    pool: Option<&rayon::ThreadPool>,
    chunk_size: usize,
    out: &mut W,
    tag: F,
    n_tokens: C,
) -> Result<usize>
where
    I: Iterator<Item = Result<T>>,
    T: Sync,
    W: Write,
    F: Fn(&T) -> Result<Vec<u8>> + Sync,
    C: Fn(&T) -> usize,
{
    let mut total = 0;
    let Some(pool) = pool else {
        for item in items {
            let item = item?;
            total += n_tokens(&item);
            out.write_all(&tag(&item)?)?;
        }
        return Ok(total);
    };
    let mut items = items;
    loop {
        let mut chunk = Vec::with_capacity(chunk_size);
        for item in items.by_ref().take(chunk_size) {
            chunk.push(item?);
        }
        if chunk.is_empty() {
            break;
        }
        total += chunk.iter().map(&n_tokens).sum::<usize>();
        let results = pool.install(|| chunk.par_iter().map(&tag).collect::<Result<Vec<_>>>())?;
        for result in results {
            out.write_all(&result)?;
        }
    }
    Ok(total)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let config = TaggerConfig {
        suffix: SuffixConfig {
            max_suffix_len: args.max_suffix_len,
            upper_max_freq: args.upper_max_freq,
            lower_max_freq: args.lower_max_freq,
            hyphen_max_freq: args.hyphen_max_freq,
            cardinal_max_freq: args.cardinal_max_freq,
            max_tags: args.max_tags,
        },
        ..TaggerConfig::default()
    }
    .beam_ratio(args.beam_ratio);
    let tagger = Tagger::new(&model, &config)?;

    let pool = if args.n_threads == 0 {
        None
    } else {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(args.n_threads)
                .build()?,
        )
    };
    let chunk_size = args.n_threads.max(1) * args.mt_chunk_size.max(1);

    eprintln!("Start tagging");
    let mut out = BufWriter::new(stdout().lock());
    let start = Instant::now();
    let n_tokens = match args.format {
        InputFormat::Text => tag_all(
            stdin().lock().lines().map(|line| line.map_err(Into::into)),
            pool.as_ref(),
            chunk_size,
            &mut out,
            |line: &String| tag_line(&tagger, line, args.with_words),
            |line: &String| line.split_whitespace().count(),
        )?,
        InputFormat::Conll => tag_all(
            ConllSentenceReader::new(stdin().lock()),
            pool.as_ref(),
            chunk_size,
            &mut out,
            |sentence: &ConllSentence| tag_conll(&tagger, sentence),
            ConllSentence::len,
        )?,
    };
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [tokens/sec]",
        n_tokens as f64 / duration.as_secs_f64()
    );

    Ok(())
}
