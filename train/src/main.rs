use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tritag::{corpus_reader, CorpusFormat, FrequencyCollector};

#[derive(Parser, Debug)]
#[command(about = "A program to train models of Tritag.")]
struct Args {
    /// A tagged training corpus
    #[arg(long, required = true)]
    corpus: Vec<PathBuf>,

    /// The format of the corpus: {brown, conll}
    #[arg(long, default_value = "brown")]
    format: CorpusFormat,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// Do not split tags by the capitalization of words.
    #[arg(long)]
    no_capitalization: bool,

    /// Keep the first word of each sentence as is instead of lowercasing its first character.
    #[arg(long)]
    keep_first_word: bool,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut collector = FrequencyCollector::new(!args.no_capitalization);
    for path in args.corpus {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for sentence in corpus_reader(args.format, f, !args.keep_first_word) {
            if collector.n_sentences() % 10000 == 0 {
                eprint!("# of sentences: {}\r", collector.n_sentences());
                stderr().flush()?;
            }
            collector.add_sentence(&sentence?);
        }
        eprintln!("# of sentences: {}", collector.n_sentences());
    }

    let model = collector.into_model()?;
    eprintln!("# of tags: {}", model.n_tags());
    eprintln!("# of words: {}", model.lexicon().len());

    eprintln!("Saving model file...");
    let mut f = zstd::Encoder::new(File::create(args.model)?, 19)?;
    f.multithread(args.zstd_workers)?;
    model.write(&mut f)?;
    f.finish()?;

    Ok(())
}
