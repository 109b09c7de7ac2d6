use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tritag::Model;

#[derive(Parser, Debug)]
#[command(about = "A program to convert plain-text models from and to Tritag models.")]
struct Args {
    /// Lexicon file in plain text
    #[arg(long)]
    lexicon: PathBuf,

    /// N-gram frequency file in plain text
    #[arg(long)]
    ngrams: PathBuf,

    /// Tritag model file
    #[arg(long)]
    model: PathBuf,

    /// Write the plain-text files from the Tritag model instead.
    #[arg(long)]
    reverse: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.reverse {
        eprintln!("Loading model file...");
        let mut f = zstd::Decoder::new(fs::File::open(args.model)?)?;
        let model = Model::read(&mut f)?;

        eprintln!("Saving plain-text files...");
        let mut lexicon = BufWriter::new(fs::File::create(args.lexicon)?);
        let mut ngrams = BufWriter::new(fs::File::create(args.ngrams)?);
        model.write_text(&mut lexicon, &mut ngrams)?;
        lexicon.flush()?;
        ngrams.flush()?;
    } else {
        eprintln!("Loading plain-text files...");
        let lexicon = BufReader::new(fs::File::open(args.lexicon)?);
        let ngrams = BufReader::new(fs::File::open(args.ngrams)?);
        let model = Model::read_text(lexicon, ngrams)?;
        eprintln!("# of tags: {}", model.n_tags());
        eprintln!("# of words: {}", model.lexicon().len());

        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(fs::File::create(args.model)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
