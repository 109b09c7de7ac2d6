use std::collections::BTreeMap;

use crate::errors::{Result, TritagError};
use crate::model::Model;
use crate::ngram::{BiGram, TriGram, UniGram};
use crate::utils::FastMap;

/// Tag sequence model.
pub trait LanguageModel {
    /// Returns log P(t3 | t1, t2).
    ///
    /// # Errors
    ///
    /// [`TritagError::UnknownTag`] is returned if t3 never appeared in the training data.
    fn trigram_log_prob(&self, trigram: TriGram) -> Result<f64>;
}

/// Trigram model smoothed by deleted interpolation of unigram, bigram, and trigram relative
/// frequencies.
///
/// Log-probabilities of all n-grams seen in the training data are computed on construction, so
/// the model is never mutated afterwards.
pub struct LinearInterpolationLm {
    lambdas: [f64; 3],
    trigram_log_probs: FastMap<TriGram, f64>,
    bigram_log_probs: FastMap<BiGram, f64>,
    unigram_log_probs: FastMap<UniGram, f64>,
}

#[inline(always)]
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl LinearInterpolationLm {
    /// Creates a language model from n-gram frequencies.
    pub fn new(
        unigrams: &BTreeMap<UniGram, u32>,
        bigrams: &BTreeMap<BiGram, u32>,
        trigrams: &BTreeMap<TriGram, u32>,
    ) -> Self {
        let corpus_size = unigrams.values().map(|&f| f64::from(f)).sum::<f64>();
        let lambdas = Self::estimate_lambdas(corpus_size, unigrams, bigrams, trigrams);
        let [l1, l2, l3] = lambdas;
        log::debug!("corpus size: {corpus_size}, lambdas: {l1} {l2} {l3}");

        let unigram_prob = |t: UniGram| {
            ratio(
                unigrams.get(&t).map_or(0.0, |&f| f64::from(f)),
                corpus_size,
            )
        };
        let bigram_prob = |bigram: BiGram| {
            bigrams.get(&bigram).map_or(0.0, |&f| {
                ratio(
                    f64::from(f),
                    unigrams.get(&bigram.first()).map_or(0.0, |&f| f64::from(f)),
                )
            })
        };
        let trigram_prob = |trigram: TriGram| {
            trigrams.get(&trigram).map_or(0.0, |&f| {
                ratio(
                    f64::from(f),
                    bigrams.get(&trigram.context()).map_or(0.0, |&f| f64::from(f)),
                )
            })
        };

        let unigram_log_probs = unigrams
            .keys()
            .map(|&t| (t, (l1 * unigram_prob(t)).ln()))
            .collect();
        let bigram_log_probs = bigrams
            .keys()
            .map(|&bigram| {
                let p = l1 * unigram_prob(bigram.second()) + l2 * bigram_prob(bigram);
                (bigram, p.ln())
            })
            .collect();
        let trigram_log_probs = trigrams
            .keys()
            .map(|&trigram| {
                let p = l1 * unigram_prob(trigram.last())
                    + l2 * bigram_prob(trigram.suffix())
                    + l3 * trigram_prob(trigram);
                (trigram, p.ln())
            })
            .collect();

        Self {
            lambdas,
            trigram_log_probs,
            bigram_log_probs,
            unigram_log_probs,
        }
    }

    /// Creates a language model from the frequencies of a model.
    pub fn from_model(model: &Model) -> Self {
        Self::new(model.unigrams(), model.bigrams(), model.trigrams())
    }

    fn estimate_lambdas(
        corpus_size: f64,
        unigrams: &BTreeMap<UniGram, u32>,
        bigrams: &BTreeMap<BiGram, u32>,
        trigrams: &BTreeMap<TriGram, u32>,
    ) -> [f64; 3] {
        // Leave-one-out estimate. A context seen at most once gives no evidence.
        let held_out = |freq: Option<&u32>, context_freq: Option<&u32>| {
            match (freq, context_freq) {
                (Some(&f), Some(&c)) if c > 1 => (f64::from(f) - 1.0) / (f64::from(c) - 1.0),
                _ => 0.0,
            }
        };

        let mut counts = [0u64; 3];
        for (&trigram, &freq) in trigrams {
            let l3p = held_out(Some(&freq), bigrams.get(&trigram.context()));
            let l2p = held_out(
                bigrams.get(&trigram.suffix()),
                unigrams.get(&trigram.suffix().first()),
            );
            let l1p = match unigrams.get(&trigram.last()) {
                Some(&f) if corpus_size > 1.0 => (f64::from(f) - 1.0) / (corpus_size - 1.0),
                _ => 0.0,
            };
            let order = if l1p >= l2p && l1p >= l3p {
                0
            } else if l2p >= l3p {
                1
            } else {
                2
            };
            counts[order] += u64::from(freq);
        }

        let total = counts.iter().sum::<u64>();
        if total == 0 {
            return [1.0, 0.0, 0.0];
        }
        let total = total as f64;
        [
            counts[0] as f64 / total,
            counts[1] as f64 / total,
            counts[2] as f64 / total,
        ]
    }

    /// Gets the interpolation weights of unigram, bigram, and trigram probabilities.
    pub const fn lambdas(&self) -> [f64; 3] {
        self.lambdas
    }
}

impl LanguageModel for LinearInterpolationLm {
    fn trigram_log_prob(&self, trigram: TriGram) -> Result<f64> {
        if let Some(&p) = self.trigram_log_probs.get(&trigram) {
            return Ok(p);
        }
        if let Some(&p) = self.bigram_log_probs.get(&trigram.suffix()) {
            return Ok(p);
        }
        self.unigram_log_probs
            .get(&trigram.last())
            .copied()
            .ok_or_else(|| TritagError::unknown_tag(trigram.2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::collector::FrequencyCollector;
    use crate::corpus::{wrap_sentence, TaggedToken};

    fn train(sentences: &[&[(&str, &str)]]) -> Model {
        let mut collector = FrequencyCollector::new(false);
        for items in sentences {
            collector.add_sentence(&wrap_sentence(
                items.iter().map(|&(w, t)| TaggedToken::new(w, t)),
            ));
        }
        collector.into_model().unwrap()
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_lambdas_sum_to_one() {
        let model = train(&[
            &[("the", "DT"), ("dog", "NN"), ("barks", "VBZ")],
            &[("a", "DT"), ("cat", "NN"), ("meows", "VBZ")],
            &[("dogs", "NNS"), ("bark", "VBP")],
            &[("the", "DT"), ("dogs", "NNS"), ("bark", "VBP")],
        ]);
        let lm = LinearInterpolationLm::from_model(&model);
        let [l1, l2, l3] = lm.lambdas();
        assert!(l1 >= 0.0 && l2 >= 0.0 && l3 >= 0.0);
        assert_close(1.0, l1 + l2 + l3);
    }

    #[test]
    fn test_lambdas_hand_computed() {
        // <S> <S> A <E> twice, <S> <S> B <E> once.
        let unigrams = BTreeMap::from([
            (UniGram(0), 6),
            (UniGram(1), 2),
            (UniGram(2), 1),
            (UniGram(3), 3),
        ]);
        let bigrams = BTreeMap::from([
            (BiGram(0, 0), 3),
            (BiGram(0, 1), 2),
            (BiGram(0, 2), 1),
            (BiGram(1, 3), 2),
            (BiGram(2, 3), 1),
        ]);
        let trigrams = BTreeMap::from([
            (TriGram(0, 0, 1), 2),
            (TriGram(0, 0, 2), 1),
            (TriGram(0, 1, 3), 2),
            (TriGram(0, 2, 3), 1),
        ]);
        let lm = LinearInterpolationLm::new(&unigrams, &bigrams, &trigrams);

        // (0,0,1): l3p = 1/2, l2p = 1/5, l1p = 1/11 -> trigram
        // (0,0,2): l3p = 0,   l2p = 0,   l1p = 0    -> unigram (tie)
        // (0,1,3): l3p = 1/1, l2p = 1/1, l1p = 2/11 -> bigram (tie)
        // (0,2,3): l3p = 0,   l2p = 0,   l1p = 2/11 -> unigram
        assert_eq!([2.0 / 6.0, 2.0 / 6.0, 2.0 / 6.0], lm.lambdas());
    }

    #[test]
    fn test_no_trigrams() {
        let unigrams = BTreeMap::from([(UniGram(0), 3), (UniGram(1), 1)]);
        let lm = LinearInterpolationLm::new(&unigrams, &BTreeMap::new(), &BTreeMap::new());
        assert_eq!([1.0, 0.0, 0.0], lm.lambdas());
        assert_close(
            (1.0f64 / 4.0).ln(),
            lm.trigram_log_prob(TriGram(0, 0, 1)).unwrap(),
        );
    }

    #[test]
    fn test_fallback_order() {
        let model = train(&[
            &[("the", "DT"), ("dog", "NN"), ("barks", "VBZ")],
            &[("a", "DT"), ("cat", "NN"), ("meows", "VBZ")],
            &[("dogs", "NNS"), ("bark", "VBP")],
        ]);
        let lm = LinearInterpolationLm::from_model(&model);
        let [l1, l2, l3] = lm.lambdas();
        let n = model.corpus_size() as f64;
        let f = |t: &str| f64::from(model.unigrams()[&UniGram(model.tag_id(t).unwrap())]);
        let dt = model.tag_id("DT").unwrap();
        let nn = model.tag_id("NN").unwrap();
        let vbz = model.tag_id("VBZ").unwrap();
        let nns = model.tag_id("NNS").unwrap();
        let vbp = model.tag_id("VBP").unwrap();

        // Observed trigram.
        let expected = (l1 * f("VBZ") / n + l2 * 2.0 / f("NN") + l3 * 2.0 / 2.0).ln();
        assert_close(expected, lm.trigram_log_prob(TriGram(dt, nn, vbz)).unwrap());

        // Unseen trigram with a seen bigram.
        let expected = (l1 * f("VBZ") / n + l2 * 2.0 / f("NN")).ln();
        assert_close(expected, lm.trigram_log_prob(TriGram(nns, nn, vbz)).unwrap());

        // Unseen bigram.
        let expected = (l1 * f("VBP") / n).ln();
        assert_close(expected, lm.trigram_log_prob(TriGram(dt, nn, vbp)).unwrap());
        assert!(!expected.is_nan());
    }

    #[test]
    fn test_unknown_tag() {
        let model = train(&[&[("the", "DT"), ("dog", "NN")]]);
        let lm = LinearInterpolationLm::from_model(&model);
        match lm.trigram_log_prob(TriGram(0, 1, 99)) {
            Err(TritagError::UnknownTag(e)) => assert_eq!(99, e.tag()),
            _ => panic!("expected an unknown tag error"),
        }
    }
}
