use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tritag::{corpus_reader, CorpusFormat, Evaluator, Model, SuffixConfig, Tagger, TaggerConfig};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of Tritag.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// A gold-standard tagged corpus
    #[arg(long)]
    corpus: PathBuf,

    /// The format of the corpus: {brown, conll}
    #[arg(long, default_value = "brown")]
    format: CorpusFormat,

    /// Keep the first word of each sentence as is instead of lowercasing its first character.
    #[arg(long)]
    keep_first_word: bool,

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
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
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

    eprintln!("Start evaluation");
    let f = BufReader::new(File::open(args.corpus)?);
    let mut evaluator = Evaluator::new(&model);
    for (i, sentence) in corpus_reader(args.format, f, !args.keep_first_word).enumerate() {
        if i % 1000 == 0 {
            eprint!("# of sentences: {i}\r");
            stderr().flush()?;
        }
        evaluator.process(&tagger, &sentence?)?;
    }
    eprintln!();

    println!("{evaluator}");

    Ok(())
}
