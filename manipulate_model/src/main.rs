use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tritag::{BiGram, Model, TriGram, UniGram};

#[derive(Parser, Debug)]
#[command(about = "A program to manipulate trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output the lexicon contained in the model.
    #[arg(long)]
    dump_lexicon: Option<PathBuf>,

    /// Output the n-gram frequencies contained in the model.
    #[arg(long)]
    dump_ngrams: Option<PathBuf>,

    /// Replace the lexicon if the argument is specified.
    #[arg(long)]
    replace_lexicon: Option<PathBuf>,
}

#[derive(Deserialize, Serialize)]
struct LexiconRecord {
    word: String,
    tag: String,
    freq: u32,
}

#[derive(Serialize)]
struct NGramRecord<'a> {
    tag1: &'a str,
    tag2: &'a str,
    tag3: &'a str,
    freq: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let mut model = Model::read(&mut f)?;
    let tag_name = |tag| model.tag_name(tag).unwrap_or_default();

    if let Some(path) = args.dump_lexicon {
        eprintln!("Saving lexicon file...");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for (word, tag_freqs) in model.lexicon() {
            for (&tag, &freq) in tag_freqs {
                wtr.serialize(LexiconRecord {
                    word: word.clone(),
                    tag: tag_name(tag).to_string(),
                    freq,
                })?;
            }
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_ngrams {
        eprintln!("Saving n-gram file...");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for (&UniGram(t1), &freq) in model.unigrams() {
            wtr.serialize(NGramRecord {
                tag1: tag_name(t1),
                tag2: "",
                tag3: "",
                freq,
            })?;
        }
        for (&BiGram(t1, t2), &freq) in model.bigrams() {
            wtr.serialize(NGramRecord {
                tag1: tag_name(t1),
                tag2: tag_name(t2),
                tag3: "",
                freq,
            })?;
        }
        for (&TriGram(t1, t2, t3), &freq) in model.trigrams() {
            wtr.serialize(NGramRecord {
                tag1: tag_name(t1),
                tag2: tag_name(t2),
                tag3: tag_name(t3),
                freq,
            })?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.replace_lexicon {
        eprintln!("Loading lexicon file...");
        let file = fs::File::open(path)?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut lexicon = vec![];
        for result in rdr.deserialize() {
            let record: LexiconRecord = result?;
            lexicon.push((record.word, record.tag, record.freq));
        }
        model.replace_lexicon(lexicon)?;
    }

    if let Some(path) = args.model_out {
        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(fs::File::create(path)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
