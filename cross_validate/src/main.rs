use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use tritag::errors::Result;
use tritag::{
    corpus_reader, CorpusFormat, Evaluator, FoldFilter, FrequencyCollector, SuffixConfig,
    TaggedToken, Tagger, TaggerConfig,
};

#[derive(Parser, Debug)]
#[command(about = "A program to estimate the accuracy of Tritag by cross-validation.")]
struct Args {
    /// A tagged corpus
    #[arg(long)]
    corpus: PathBuf,

    /// The format of the corpus: {brown, conll}
    #[arg(long, default_value = "brown")]
    format: CorpusFormat,

    /// The number of folds
    #[arg(long, default_value = "10")]
    n_folds: usize,

    /// Do not split tags by the capitalization of words.
    #[arg(long)]
    no_capitalization: bool,

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

type SentenceReader = Box<dyn Iterator<Item = Result<Vec<TaggedToken>>>>;

fn read_folds<F>(args: &Args, folds: F) -> Result<FoldFilter<SentenceReader>>
where
    F: IntoIterator<Item = usize>,
{
    let f = BufReader::new(File::open(&args.corpus)?);
    FoldFilter::new(corpus_reader(args.format, f, true), args.n_folds, folds)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    if args.n_folds == 0 {
        return Err("--n-folds must be at least 1".into());
    }
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

    let mut accuracies = vec![];
    for eval_fold in 0..args.n_folds {
        let training_folds = (0..args.n_folds).filter(|&fold| fold != eval_fold);
        let mut collector = FrequencyCollector::new(!args.no_capitalization);
        collector.process(read_folds(&args, training_folds)?)?;
        let model = collector.into_model()?;
        let tagger = Tagger::new(&model, &config)?;

        let mut evaluator = Evaluator::new(&model);
        for sentence in read_folds(&args, [eval_fold])? {
            evaluator.process(&tagger, &sentence?)?;
        }
        let overall = evaluator.overall_accuracy().unwrap_or(0.0);
        let unknown = evaluator.unknown_accuracy().unwrap_or(0.0);
        println!("Fold {eval_fold} accuracy: {overall:.2} (unknown: {unknown:.2})");
        if evaluator.n_untaggable() != 0 {
            println!("Fold {eval_fold} untaggable sentences: {}", evaluator.n_untaggable());
        }
        accuracies.push(overall);
    }

    let mean = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
    println!();
    println!("Overall accuracy: {mean:.2}");

    Ok(())
}
