use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::model::TagFreqs;
use crate::ngram::{TagId, UniGram};

struct Node {
    children: HashMap<char, usize>,
    tag_freqs: BTreeMap<TagId, u64>,
    total_freq: u64,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            tag_freqs: BTreeMap::new(),
            total_freq: 0,
        }
    }

    fn tag_prob(&self, tag: TagId) -> f64 {
        if self.total_freq == 0 {
            return 0.0;
        }
        self.tag_freqs
            .get(&tag)
            .map_or(0.0, |&f| f as f64 / self.total_freq as f64)
    }
}

fn reversed_suffix(word: &str, max_len: usize) -> impl Iterator<Item = char> + '_ {
    word.chars().rev().take(max_len)
}

/// Trie over reversed word suffixes.
///
/// Each node keeps the tag frequencies of all words whose reversed suffix passes through it. The
/// root keeps the global tag frequencies instead.
pub struct WordSuffixTree {
    nodes: Vec<Node>,

    // Tags and their global probabilities, ordered by tag id.
    priors: Vec<(TagId, f64)>,

    theta: f64,
    max_suffix_len: usize,
}

impl WordSuffixTree {
    pub fn new(unigrams: &BTreeMap<UniGram, u32>, theta: f64, max_suffix_len: usize) -> Self {
        let mut root = Node::new();
        for (&UniGram(tag), &freq) in unigrams {
            root.tag_freqs.insert(tag, u64::from(freq));
            root.total_freq += u64::from(freq);
        }
        let corpus_size = root.total_freq;
        let priors = unigrams
            .iter()
            .map(|(&UniGram(tag), &freq)| {
                let p = if corpus_size == 0 {
                    0.0
                } else {
                    f64::from(freq) / corpus_size as f64
                };
                (tag, p)
            })
            .collect();
        Self {
            nodes: vec![root],
            priors,
            theta,
            max_suffix_len,
        }
    }

    /// Adds the reversed suffix of a word with its tag frequencies.
    pub fn add_word(&mut self, word: &str, tag_freqs: &TagFreqs) {
        let mut node_idx = 0;
        for c in reversed_suffix(word, self.max_suffix_len) {
            node_idx = match self.nodes[node_idx].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[node_idx].children.insert(c, child);
                    child
                }
            };
            let node = &mut self.nodes[node_idx];
            for (&tag, &freq) in tag_freqs {
                *node.tag_freqs.entry(tag).or_insert(0) += u64::from(freq);
                node.total_freq += u64::from(freq);
            }
        }
    }

    /// Estimates values proportional to P(suffix | tag) for every tag, ordered by tag id.
    pub fn suffix_tag_probs(&self, word: &str) -> Vec<(TagId, f64)> {
        let root = &self.nodes[0];
        let mut probs: Vec<(TagId, f64)> = self
            .priors
            .iter()
            .map(|&(tag, _)| (tag, root.tag_prob(tag)))
            .collect();

        let mut node = root;
        for c in reversed_suffix(word, self.max_suffix_len) {
            let Some(&child) = node.children.get(&c) else {
                break;
            };
            node = &self.nodes[child];
            for (tag, p) in &mut probs {
                *p = (node.tag_prob(*tag) + self.theta * *p) / (self.theta + 1.0);
            }
        }

        // Bayesian inversion: P(tag | suffix) / P(tag) is proportional to P(suffix | tag).
        for ((_, p), &(_, prior)) in probs.iter_mut().zip(&self.priors) {
            *p = if prior > 0.0 { *p / prior } else { 0.0 };
        }
        probs
    }

    /// Gets the number of nodes including the root.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Computes the sample standard deviation of the unigram probabilities.
pub fn theta(unigrams: &BTreeMap<UniGram, u32>) -> f64 {
    let n_tags = unigrams.len();
    if n_tags < 2 {
        return 0.0;
    }
    let corpus_size = unigrams.values().map(|&f| f64::from(f)).sum::<f64>();
    if corpus_size == 0.0 {
        return 0.0;
    }
    let avg = 1.0 / n_tags as f64;
    let sum_sq = unigrams
        .values()
        .map(|&f| {
            let d = f64::from(f) / corpus_size - avg;
            d * d
        })
        .sum::<f64>();
    (sum_sq / (n_tags - 1) as f64).sqrt()
}
